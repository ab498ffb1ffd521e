use crate::{
    BOARD_SLOTS,
    PlayerId,
    ProtocolError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

pub const DEFAULT_PLAYER_COLOR: &str = "#FF6B00";

fn default_player_color() -> String {
    DEFAULT_PLAYER_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default = "default_player_color")]
    pub color: String,
    /// Signed so that a server-side overdraft still renders.
    #[serde(default)]
    pub money: i64,
    #[serde(default, rename = "position")]
    pub slot: u8,
    #[serde(default)]
    pub properties: Vec<u8>,
    #[serde(default)]
    pub in_jail: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: default_player_color(),
            money: 0,
            slot: 0,
            properties: Vec::new(),
            in_jail: false,
        }
    }

    pub fn at_slot(mut self, slot: u8) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_money(mut self, money: i64) -> Self {
        self.money = money;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// One complete authoritative description of the game at a point in time.
///
/// Built once from an inbound message and never patched afterwards; the
/// store swaps whole snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    players: BTreeMap<PlayerId, Player>,
    ownership: BTreeMap<u8, PlayerId>,
    last_roll: Option<[u8; 2]>,
    game_log: Option<String>,
    seq: Option<u64>,
    game_started: Option<bool>,
}

impl Snapshot {
    pub fn new(
        players: impl IntoIterator<Item = Player>,
        ownership: impl IntoIterator<Item = (u8, PlayerId)>,
        last_roll: Option<[u8; 2]>,
        game_log: Option<String>,
    ) -> Result<Self> {
        let players = players
            .into_iter()
            .map(|player| (player.id.clone(), player))
            .collect();
        Self::from_parts(
            players,
            ownership.into_iter().collect(),
            last_roll,
            game_log,
        )
    }

    pub(crate) fn from_parts(
        players: BTreeMap<PlayerId, Player>,
        ownership: BTreeMap<u8, PlayerId>,
        last_roll: Option<[u8; 2]>,
        game_log: Option<String>,
    ) -> Result<Self> {
        for (player_id, player) in &players {
            if player.slot >= BOARD_SLOTS {
                return Err(ProtocolError::SlotOutOfRange {
                    player_id: player_id.clone(),
                    slot: player.slot,
                });
            }
        }
        if let Some(&slot) = ownership.keys().find(|slot| **slot >= BOARD_SLOTS) {
            return Err(ProtocolError::OwnershipOutOfRange { slot });
        }
        if let Some(faces) = last_roll
            && let Some(&face) = faces.iter().find(|face| !(1..=6).contains(*face))
        {
            return Err(ProtocolError::DiceOutOfRange { face });
        }
        let game_log = game_log.filter(|line| !line.trim().is_empty());
        Ok(Self {
            players,
            ownership,
            last_roll,
            game_log,
            seq: None,
            game_started: None,
        })
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }

    pub(crate) fn with_game_started(mut self, game_started: Option<bool>) -> Self {
        self.game_started = game_started;
        self
    }

    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn ownership(&self) -> &BTreeMap<u8, PlayerId> {
        &self.ownership
    }

    pub fn owner_of(&self, slot: u8) -> Option<&Player> {
        self.ownership
            .get(&slot)
            .and_then(|owner_id| self.players.get(owner_id))
    }

    pub fn is_owned(&self, slot: u8) -> bool {
        self.ownership.contains_key(&slot)
    }

    pub fn last_roll(&self) -> Option<[u8; 2]> {
        self.last_roll
    }

    pub fn game_log(&self) -> Option<&str> {
        self.game_log.as_deref()
    }

    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    pub fn game_started(&self) -> Option<bool> {
        self.game_started
    }
}
