use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Opaque identifier for a connected player, unique per connection.
pub type PlayerId = Uuid;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub display_name: String,
}
