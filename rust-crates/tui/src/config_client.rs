use std::fmt;

use board_core::layout::BoardLayout;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use reqwest::StatusCode;
use serde::{
    Deserialize,
    Serialize,
};
use session_store::PlayerIdentity;

/// One open room as listed by the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: String,
    pub players: u32,
    pub max_players: u32,
    pub game_started: bool,
}

/// HTTP side of the game server: the static board configuration, player
/// registration and the lobby.
#[derive(Clone)]
pub struct ServerClient {
    base_url: String,
    http: reqwest::Client,
}

impl ServerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .wrap_err("failed to build HTTP client for game server")?;
        Ok(Self { base_url, http })
    }

    pub async fn board_layout(&self) -> Result<BoardLayout> {
        let url = format!("{}/api/game/config", self.base_url);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .wrap_err("board configuration request failed")?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .wrap_err("failed to read board configuration body")?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(eyre!(
                "game server responded with {status} when fetching board configuration: {body}"
            ));
        }
        let text = std::str::from_utf8(&bytes)
            .wrap_err("board configuration is not valid UTF-8")?;
        BoardLayout::decode(text).wrap_err("invalid board configuration payload")
    }

    pub async fn register(&self, name: &str) -> Result<PlayerIdentity> {
        let url = format!("{}/api/auth/join", self.base_url);
        let res = self
            .http
            .post(url)
            .json(&JoinRequestDto { name })
            .send()
            .await
            .wrap_err("registration request failed")?;
        let status = res.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::BAD_REQUEST {
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable body>".to_string());
            return Err(eyre!("game server rejected the name {name:?}: {body}"));
        }
        if !status.is_success() {
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable body>".to_string());
            return Err(eyre!(
                "game server responded with {status} when registering: {body}"
            ));
        }
        let dto: JoinResponseDto = res
            .json()
            .await
            .wrap_err("invalid registration payload")?;
        if dto.player.id.trim().is_empty() {
            return Err(eyre!("game server issued an empty player id"));
        }
        Ok(dto.into())
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>> {
        let url = format!("{}/api/lobby/list", self.base_url);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .wrap_err("room list request failed")?;
        let status = res.status();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable body>".to_string());
            return Err(eyre!(
                "game server responded with {status} when listing rooms: {body}"
            ));
        }
        let dtos: Vec<RoomSummaryDto> = res
            .json()
            .await
            .wrap_err("invalid room list payload")?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    /// Opens a new room hosted by `host_id` and returns its id.
    pub async fn create_room(&self, host_id: &str) -> Result<String> {
        let url = format!("{}/api/lobby/create", self.base_url);
        let res = self
            .http
            .post(url)
            .json(&CreateRoomRequestDto { host_id })
            .send()
            .await
            .wrap_err("room creation request failed")?;
        let status = res.status();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable body>".to_string());
            return Err(eyre!(
                "game server responded with {status} when creating a room: {body}"
            ));
        }
        let dto: CreateRoomResponseDto = res
            .json()
            .await
            .wrap_err("invalid room creation payload")?;
        if dto.room_id.trim().is_empty() {
            return Err(eyre!("game server issued an empty room id"));
        }
        Ok(dto.room_id)
    }
}

#[derive(Serialize)]
struct CreateRoomRequestDto<'a> {
    host_id: &'a str,
}

#[derive(Deserialize)]
struct CreateRoomResponseDto {
    room_id: String,
}

#[derive(Deserialize)]
struct RoomSummaryDto {
    room_id: String,
    #[serde(default)]
    players: u32,
    #[serde(default)]
    max_players: u32,
    #[serde(default)]
    game_started: bool,
}

impl From<RoomSummaryDto> for RoomSummary {
    fn from(dto: RoomSummaryDto) -> Self {
        RoomSummary {
            room_id: dto.room_id,
            players: dto.players,
            max_players: dto.max_players,
            game_started: dto.game_started,
        }
    }
}

#[derive(Serialize)]
struct JoinRequestDto<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct JoinResponseDto {
    player: PlayerDto,
}

#[derive(Deserialize)]
struct PlayerDto {
    id: String,
    name: String,
}

impl From<JoinResponseDto> for PlayerIdentity {
    fn from(dto: JoinResponseDto) -> Self {
        PlayerIdentity::new(dto.player.id, dto.player.name)
    }
}

impl fmt::Display for ServerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
