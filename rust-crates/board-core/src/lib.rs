pub mod dice;
pub mod gatekeeper;
pub mod interpolation;
pub mod layout;
pub mod perimeter;
pub mod protocol;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod store;

mod error;

pub use error::ProtocolError;

pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Number of slots around the board perimeter.
pub const BOARD_SLOTS: u8 = 40;

pub type PlayerId = String;
