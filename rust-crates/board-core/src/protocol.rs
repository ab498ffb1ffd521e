//! Wire shapes exchanged with the authoritative game server.
//!
//! Inbound frames are JSON objects tagged by `type`. Only `GAME_STARTED` and
//! `UPDATE_STATE` carry a snapshot the client acts on; every other type is
//! surfaced as [`ServerMessage::Ignored`].

use crate::{
    PlayerId,
    ProtocolError,
    Result,
    snapshot::{
        Player,
        Snapshot,
    },
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

pub const GAME_STARTED: &str = "GAME_STARTED";
pub const UPDATE_STATE: &str = "UPDATE_STATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    GameStarted(Snapshot),
    UpdateState(Snapshot),
    Ignored { kind: String },
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text)?;
        match envelope.kind.as_str() {
            GAME_STARTED | UPDATE_STATE => {
                let state = envelope.state.ok_or_else(|| {
                    ProtocolError::MissingState {
                        kind: envelope.kind.clone(),
                    }
                })?;
                let wire: SnapshotWire = serde_json::from_value(state)?;
                let snapshot = Snapshot::try_from(wire)?;
                if envelope.kind == GAME_STARTED {
                    Ok(ServerMessage::GameStarted(snapshot))
                } else {
                    Ok(ServerMessage::UpdateState(snapshot))
                }
            }
            _ => Ok(ServerMessage::Ignored {
                kind: envelope.kind,
            }),
        }
    }

    /// Both snapshot-bearing message types replace state identically.
    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            ServerMessage::GameStarted(snapshot) | ServerMessage::UpdateState(snapshot) => {
                Some(snapshot)
            }
            ServerMessage::Ignored { .. } => None,
        }
    }
}

/// Outbound requests. Identity rides on the connection, never in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    RollDice,
    BuyProperty,
}

impl Intent {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    state: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotWire {
    #[serde(default)]
    players: Option<BTreeMap<PlayerId, Player>>,
    #[serde(default)]
    ownership: Option<BTreeMap<u8, PlayerId>>,
    #[serde(default)]
    last_roll: Option<[u8; 2]>,
    #[serde(default)]
    game_log: Option<String>,
    #[serde(default)]
    seq: Option<u64>,
    #[serde(default)]
    game_started: Option<bool>,
}

impl TryFrom<SnapshotWire> for Snapshot {
    type Error = ProtocolError;

    fn try_from(wire: SnapshotWire) -> Result<Self> {
        let snapshot = Snapshot::from_parts(
            wire.players.unwrap_or_default(),
            wire.ownership.unwrap_or_default(),
            wire.last_roll,
            wire.game_log,
        )?
        .with_game_started(wire.game_started);
        Ok(match wire.seq {
            Some(seq) => snapshot.with_seq(seq),
            None => snapshot,
        })
    }
}
