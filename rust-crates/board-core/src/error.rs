use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message {kind} is missing its state payload")]
    MissingState { kind: String },

    #[error("player {player_id} is on slot {slot}, outside the board")]
    SlotOutOfRange { player_id: String, slot: u8 },

    #[error("ownership entry for slot {slot} is outside the board")]
    OwnershipOutOfRange { slot: u8 },

    #[error("dice face {face} is outside 1..=6")]
    DiceOutOfRange { face: u8 },

    #[error("board layout has {actual} tiles, expected {expected}")]
    LayoutLength { expected: usize, actual: usize },

    #[error("board tile at index {index} carries id {id}")]
    LayoutOrder { index: usize, id: u8 },
}
