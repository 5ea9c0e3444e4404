use actix::prelude::*;
use uuid::Uuid;

use super::server::MatchSession;
use crate::server::matchmaking::types::{PlayerId, PlayerInfo};
use crate::server::messages::ServerWsMessage;

/// Everything a server-side component needs to reach one connected player.
#[derive(Clone)]
pub struct PlayerLink {
    pub info: PlayerInfo,
    /// Wire messages, relayed to the client socket.
    pub msg: Recipient<ServerWsMessage>,
    /// Lifecycle notifications for the connection actor itself.
    pub ctl: Recipient<SessionEvent>,
}

/// Session lifecycle notifications for a player's connection actor.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub enum SessionEvent {
    /// The player has been placed in a match.
    Assigned {
        session_id: Uuid,
        addr: Addr<MatchSession>,
    },
    /// The match is gone; the session reference is released.
    Closed,
}

/// Message: a player submits an answer for the current round.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SubmitAnswer {
    pub player_id: PlayerId,
    pub question_id: Uuid,
    pub choice_index: usize,
    pub elapsed_ms: u64,
}

/// Message: a player's connection dropped.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PlayerDisconnected {
    pub player_id: PlayerId,
}

/// Message: tear the session down now (registry-driven destruction).
#[derive(Message)]
#[rtype(result = "()")]
pub struct Dispose;
