use anyhow::{
    Context,
    Result,
    anyhow,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEFAULT_SESSION_DIR: &str = "~/.board-client";
const SESSION_FILE: &str = "session.json";

/// Player identity handed out by the registration endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

impl PlayerIdentity {
    pub fn new(player_id: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
            registered_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let path = ensure_store(dir.as_ref())?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<PlayerIdentity>> {
        read_identity(&self.path)
    }

    pub fn save(&self, identity: &PlayerIdentity) -> Result<()> {
        write_identity(&self.path, identity)
    }
}

pub fn resolve_session_dir(dir: Option<&str>) -> PathBuf {
    let raw = dir.unwrap_or(DEFAULT_SESSION_DIR);
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn ensure_store(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| {
            format!("Failed to create session directory {}", dir.display())
        })?;
    }
    Ok(dir.join(SESSION_FILE))
}

fn read_identity(path: &Path) -> Result<Option<PlayerIdentity>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path).context("Failed to read session file")?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let identity: PlayerIdentity = serde_json::from_slice(&data)
        .context("Failed to parse session file; expected a player identity object")?;
    if identity.player_id.trim().is_empty() {
        return Err(anyhow!("Session file at {} has an empty player id", path.display()));
    }
    Ok(Some(identity))
}

fn write_identity(path: &Path, identity: &PlayerIdentity) -> Result<()> {
    let json =
        serde_json::to_vec_pretty(identity).context("Failed to serialize player identity")?;
    fs::write(path, json).context("Failed to write session file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn load__fresh_directory__no_identity() {
        // given
        let dir = TempDir::new("session").unwrap();
        let store = SessionStore::new(dir.path().join("nested")).unwrap();

        // when
        let loaded = store.load().unwrap();

        // then
        assert_eq!(loaded, None);
    }

    #[test]
    fn save__then_load__same_identity() {
        // given
        let dir = TempDir::new("session").unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        let identity = PlayerIdentity::new("7f1c", "Asha");

        // when
        store.save(&identity).unwrap();

        // then
        assert_eq!(store.load().unwrap(), Some(identity));
    }

    #[test]
    fn load__record_without_timestamp__accepted() {
        // given
        let dir = TempDir::new("session").unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        fs::write(store.path(), br#"{"player_id":"p9","player_name":"Ravi"}"#).unwrap();

        // when
        let loaded = store.load().unwrap().unwrap();

        // then
        assert_eq!(loaded.player_id, "p9");
        assert_eq!(loaded.registered_at, None);
    }

    #[test]
    fn save__registration_time__stored_as_rfc3339_timestamp() {
        // given
        let dir = TempDir::new("session").unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        let registered_at = DateTime::parse_from_rfc3339("2026-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let identity = PlayerIdentity {
            registered_at: Some(registered_at),
            ..PlayerIdentity::new("7f1c", "Asha")
        };

        // when
        store.save(&identity).unwrap();

        // then
        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["registered_at"], "2026-03-01T09:30:00Z");
        assert_eq!(
            store.load().unwrap().and_then(|i| i.registered_at),
            Some(registered_at)
        );
    }

    #[test]
    fn load__garbage__error() {
        // given
        let dir = TempDir::new("session").unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        fs::write(store.path(), b"[1, 2").unwrap();

        // then
        assert!(store.load().is_err());
    }

    #[test]
    fn resolve_session_dir__explicit_path__used_verbatim() {
        assert_eq!(
            resolve_session_dir(Some("/tmp/board")),
            PathBuf::from("/tmp/board")
        );
    }
}
