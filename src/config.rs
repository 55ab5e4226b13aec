//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::event::DEFAULT_EVENT_TITLE;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "AWARDS_LIVE_CONFIG_PATH";
/// Environment variable that overrides the configured persistence backend.
const STORE_BACKEND_ENV: &str = "STORE_BACKEND";
/// Environment variable that overrides the server URL used by sync clients.
const SERVER_URL_ENV: &str = "AWARDS_SERVER_URL";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BROADCAST_CAPACITY: usize = 64;
const DEFAULT_STORE_WRITE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_POLL_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Persistence backend holding the event state document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON file under `<data_dir>/db`.
    #[default]
    File,
    /// Process memory; lost on restart.
    Memory,
    /// CouchDB reached through `COUCH_*` variables.
    Couch,
    /// MongoDB reached through `MONGO_URI`/`MONGO_DB`.
    Mongo,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "couch" | "couchdb" => Ok(Self::Couch),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Root of the `awards.json` catalog and the `db` directory.
    pub data_dir: PathBuf,
    /// Persistence backend selected by `STORE_BACKEND`.
    pub store_backend: StoreBackend,
    /// Title of a freshly initialised event.
    pub default_event_title: String,
    /// Facts buffered per subscriber before a slow one starts skipping.
    pub broadcast_capacity: usize,
    /// Upper bound on a single backend write.
    pub store_write_timeout: Duration,
    /// Delay between snapshot pulls of a polling client.
    pub poll_interval: Duration,
    /// Upper bound on a single snapshot pull.
    pub poll_timeout: Duration,
    /// Base URL sync clients connect to.
    pub server_url: String,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    ///
    /// Missing or unreadable files fall back to the built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        backend = ?app_config.store_backend,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var(STORE_BACKEND_ENV) {
            match value.parse() {
                Ok(backend) => self.store_backend = backend,
                Err(err) => warn!(error = %err, "ignoring {STORE_BACKEND_ENV}"),
            }
        }
        if let Some(url) = env::var(SERVER_URL_ENV).ok().filter(|url| !url.is_empty()) {
            self.server_url = url;
        }
        self
    }

    /// Directory holding `app_state.json`, `guests.json` and `rooms.json`.
    pub fn db_dir(&self) -> PathBuf {
        self.data_dir.join("db")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    data_dir: Option<PathBuf>,
    store_backend: Option<StoreBackend>,
    default_event_title: Option<String>,
    broadcast_capacity: Option<usize>,
    store_write_timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    poll_timeout_ms: Option<u64>,
    server_url: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            data_dir: value
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            store_backend: value.store_backend.unwrap_or_default(),
            default_event_title: value
                .default_event_title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_owned()),
            broadcast_capacity: value
                .broadcast_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_BROADCAST_CAPACITY),
            store_write_timeout: Duration::from_millis(
                value
                    .store_write_timeout_ms
                    .unwrap_or(DEFAULT_STORE_WRITE_TIMEOUT_MS),
            ),
            poll_interval: Duration::from_millis(
                value
                    .poll_interval_ms
                    .filter(|ms| *ms > 0)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            poll_timeout: Duration::from_millis(
                value.poll_timeout_ms.unwrap_or(DEFAULT_POLL_TIMEOUT_MS),
            ),
            server_url: value
                .server_url
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = serde_json::from_str::<RawConfig>("{}").unwrap().into();
        assert_eq!(config.store_backend, StoreBackend::File);
        assert_eq!(config.default_event_title, DEFAULT_EVENT_TITLE);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.db_dir(), PathBuf::from("data/db"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let raw = r#"{
            "data_dir": "/srv/gala",
            "store_backend": "memory",
            "default_event_title": "Gala 2026",
            "broadcast_capacity": 8,
            "store_write_timeout_ms": 250,
            "poll_interval_ms": 1000
        }"#;
        let config: AppConfig = serde_json::from_str::<RawConfig>(raw).unwrap().into();
        assert_eq!(config.data_dir, PathBuf::from("/srv/gala"));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.default_event_title, "Gala 2026");
        assert_eq!(config.broadcast_capacity, 8);
        assert_eq!(config.store_write_timeout, Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn zero_capacity_and_blank_title_are_rejected() {
        let raw = r#"{"broadcast_capacity": 0, "default_event_title": "  "}"#;
        let config: AppConfig = serde_json::from_str::<RawConfig>(raw).unwrap().into();
        assert_eq!(config.broadcast_capacity, DEFAULT_BROADCAST_CAPACITY);
        assert_eq!(config.default_event_title, DEFAULT_EVENT_TITLE);
    }

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("MongoDB".parse::<StoreBackend>(), Ok(StoreBackend::Mongo));
        assert_eq!("couch".parse::<StoreBackend>(), Ok(StoreBackend::Couch));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
