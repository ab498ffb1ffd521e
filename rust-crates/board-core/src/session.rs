use crate::PlayerId;

/// Who is playing and where, fixed for the lifetime of one game view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub room_id: String,
    pub player_id: PlayerId,
    pub player_name: String,
}

impl SessionContext {
    pub fn new(
        room_id: impl Into<String>,
        player_id: impl Into<PlayerId>,
        player_name: impl Into<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            player_id: player_id.into(),
            player_name: player_name.into(),
        }
    }
}
