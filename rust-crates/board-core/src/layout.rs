use crate::{
    BOARD_SLOTS,
    ProtocolError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    #[default]
    Property,
    Station,
    Utility,
    Corner,
    Chest,
    Chance,
    Tax,
    #[serde(other)]
    Special,
}

impl TileKind {
    pub fn is_ordinary_property(self) -> bool {
        matches!(self, TileKind::Property)
    }

    /// Tiles that carry a color band on the board.
    pub fn is_ownable(self) -> bool {
        matches!(self, TileKind::Property | TileKind::Station | TileKind::Utility)
    }
}

fn default_tile_color() -> String {
    "#FFFFFF".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u8,
    pub name: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub rent: u32,
    #[serde(default = "default_tile_color")]
    pub color: String,
    #[serde(rename = "type", default)]
    pub kind: TileKind,
}

impl Tile {
    pub fn new(id: u8, name: impl Into<String>, kind: TileKind, price: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            rent: 0,
            color: default_tile_color(),
            kind,
        }
    }
}

/// The static ring of tiles for one session. Either empty (not fetched, or
/// the fetch failed) or exactly one tile per slot, ordered by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    tiles: Vec<Tile>,
}

impl BoardLayout {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tiles(mut tiles: Vec<Tile>) -> Result<Self> {
        let expected = usize::from(BOARD_SLOTS);
        if tiles.len() != expected {
            return Err(ProtocolError::LayoutLength {
                expected,
                actual: tiles.len(),
            });
        }
        tiles.sort_by_key(|tile| tile.id);
        for (index, tile) in tiles.iter().enumerate() {
            if usize::from(tile.id) != index {
                return Err(ProtocolError::LayoutOrder { index, id: tile.id });
            }
        }
        Ok(Self { tiles })
    }

    pub fn decode(text: &str) -> Result<Self> {
        let tiles: Vec<Tile> = serde_json::from_str(text)?;
        Self::from_tiles(tiles)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, slot: u8) -> Option<&Tile> {
        self.tiles.get(usize::from(slot))
    }
}
