use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3400";

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
}

/// The session saved by `sip login`, replayed as a Bearer token on every
/// authenticated request.
#[derive(Serialize, Deserialize, Clone)]
pub struct SavedSession {
    pub token: String,
    pub user_id: i64,
    pub name: String,
    pub expires_at: String,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "sip").context("could not determine a home directory")
}

pub fn data_dir() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let dir = dirs.data_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data directory {}", dir.display()))?;
    Ok(dir)
}

pub fn database_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("sip.db"))
}

fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("config.json"))
}

fn session_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("session.json"))
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("could not read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

/// Resolution order: SIP_API_URL env var, then config.json, then the default.
pub fn api_url() -> Result<String> {
    if let Ok(url) = std::env::var("SIP_API_URL") {
        let url = url.trim();
        if !url.is_empty() {
            return Ok(url.trim_end_matches('/').to_string());
        }
    }
    let config = load_config()?;
    Ok(config
        .api_url
        .map_or_else(|| DEFAULT_API_URL.to_string(), |u| u.trim_end_matches('/').to_string()))
}

pub fn save_session(session: &SavedSession) -> Result<()> {
    let path = session_path()?;
    let raw = serde_json::to_string_pretty(session)?;
    fs::write(&path, raw).with_context(|| format!("could not write {}", path.display()))?;

    // The token grants full account access; keep it owner-readable only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("could not set permissions on {}", path.display()))?;
    }
    Ok(())
}

pub fn load_session() -> Result<Option<SavedSession>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let session: SavedSession = serde_json::from_str(&raw)
        .with_context(|| format!("invalid session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn require_session() -> Result<SavedSession> {
    match load_session()? {
        Some(session) => Ok(session),
        None => bail!("not logged in; run `sip login` first"),
    }
}

pub fn clear_session() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("could not remove {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_roundtrips_through_json() {
        let session = SavedSession {
            token: "abc123".to_string(),
            user_id: 7,
            name: "Ana".to_string(),
            expires_at: "2026-09-28T00:00:00+00:00".to_string(),
        };
        let raw = serde_json::to_string(&session).unwrap();
        let back: SavedSession = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.token, "abc123");
        assert_eq!(back.user_id, 7);
    }

    #[test]
    fn config_tolerates_missing_fields() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.api_url.is_none());
    }
}
