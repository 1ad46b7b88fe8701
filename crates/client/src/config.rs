use std::path::PathBuf;

use thiserror::Error;

use crate::collection::SyncMode;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Overrides `<config_dir>/stockroom/session.json`.
    pub session_file: Option<PathBuf>,
    pub sync_mode: SyncMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: None,
            sync_mode: SyncMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sync_mode = match lookup("STOCKROOM_SYNC_MODE") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "STOCKROOM_SYNC_MODE",
                reason,
            })?,
            None => SyncMode::default(),
        };

        Ok(Self {
            api_url: lookup("STOCKROOM_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            session_file: lookup("STOCKROOM_SESSION_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            sync_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_backend() {
        assert_eq!(config(&[]).unwrap(), ClientConfig::default());
    }

    #[test]
    fn env_overrides() {
        let cfg = config(&[
            ("STOCKROOM_API_URL", "http://inventory.local:9000"),
            ("STOCKROOM_SESSION_FILE", "/tmp/session.json"),
            ("STOCKROOM_SYNC_MODE", "reload"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "http://inventory.local:9000");
        assert_eq!(cfg.session_file, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(cfg.sync_mode, SyncMode::FullReload);
    }

    #[test]
    fn unknown_sync_mode_is_rejected() {
        let err = config(&[("STOCKROOM_SYNC_MODE", "eventually")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STOCKROOM_SYNC_MODE", .. }));
    }
}
