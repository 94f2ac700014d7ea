use std::env;
use std::path::PathBuf;

use crate::models::DataMode;

pub const ENV_DATA_MODE: &str = "GOALSTREAK_DATA_MODE";
pub const ENV_DATA_DIR: &str = "GOALSTREAK_DATA_DIR";
pub const ENV_REMOTE_URL: &str = "GOALSTREAK_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "GOALSTREAK_REMOTE_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub key: String,
}

// Resolved once at startup; the backend choice is never revisited at call
// sites.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_mode: DataMode,
    pub data_dir: PathBuf,
    pub remote: Option<RemoteConfig>,
}

impl Settings {
    pub fn from_env() -> Self {
        let data_mode = parse_mode(env::var(ENV_DATA_MODE).ok().as_deref());
        let data_dir = env::var(ENV_DATA_DIR)
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let remote = remote_from_env();
        if data_mode == DataMode::Remote && remote.is_none() {
            tracing::warn!(
                "remote mode selected but {ENV_REMOTE_URL} and {ENV_REMOTE_KEY} are not both set"
            );
        }
        Self {
            data_mode,
            data_dir,
            remote,
        }
    }

    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("goalstreak.db")
    }
}

// Unknown or absent mode strings fall back to the local backend.
pub(crate) fn parse_mode(raw: Option<&str>) -> DataMode {
    match raw.map(str::trim) {
        None | Some("") | Some("local") => DataMode::Local,
        Some("remote") => DataMode::Remote,
        Some(other) => {
            tracing::warn!(mode = %other, "unknown data mode; falling back to local");
            DataMode::Local
        }
    }
}

fn remote_from_env() -> Option<RemoteConfig> {
    let url = env::var(ENV_REMOTE_URL).ok().filter(|value| !value.is_empty())?;
    let key = env::var(ENV_REMOTE_KEY).ok().filter(|value| !value.is_empty())?;
    Some(RemoteConfig { url, key })
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goalstreak")
}
