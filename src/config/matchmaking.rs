/// Matchmaking configuration constants.
///
/// This module defines parameters for the per-subject waiting queues
/// and the pairing rule.
pub const MATCH_SIZE: usize = 2; // Players paired into a single match.
