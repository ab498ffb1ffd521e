pub mod client;
pub mod config_client;
pub mod transport;
pub mod ui;
