use crate::monopoly::Snapshot;
use serde::Deserialize;

// Every message is a full roster: a JSON array of player records. There is no
// discriminator, so the initial push and later updates look the same.
pub fn encode_snapshot(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot.players())
}

/// The part of an inbound player record the server acts on. `properties` and
/// `piece` are accepted and ignored.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlayerUpdate {
    pub name: String,
    pub position: i64,
    pub balance: i64,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Inbound {
    Roster(Vec<PlayerUpdate>),
    Single(PlayerUpdate),
}

/// Accepts a bare player record or an array of them.
pub fn decode_updates(msg: &str) -> serde_json::Result<Vec<PlayerUpdate>> {
    Ok(match serde_json::from_str(msg)? {
        Inbound::Roster(updates) => updates,
        Inbound::Single(update) => vec![update],
    })
}
