//! Configuration for Retaliation.
//!
//! Settings come from the environment, optionally seeded from `.env.local`
//! files (see [`load_env`]).
//!
//! # Storage Structure
//!
//! ```text
//! ~/.retaliation/
//! ├── .env.local     # Environment overrides (server URL, credentials)
//! └── targets.json   # Targeting table (optional, built-in table otherwise)
//! ```
//!
//! # Environment Variables
//!
//! - `RETALIATION_STATE_DIR`: Override the base state directory
//! - `RETALIATION_TEAMCITY_URL`: Base URL of the TeamCity server (required for `stalk`)
//! - `RETALIATION_HTTP_USER` / `RETALIATION_HTTP_PASS`: HTTP basic auth credentials
//! - `RETALIATION_POLL_INTERVAL_SECS`: Seconds between polls (default 60)
//! - `RETALIATION_TARGETS_FILE`: Path to the targets file (`~` is expanded)

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::ConfigError;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "RETALIATION_STATE_DIR";

/// Environment variable for the TeamCity base URL.
pub const SERVER_URL_ENV: &str = "RETALIATION_TEAMCITY_URL";

/// Environment variable for the HTTP basic auth user.
pub const HTTP_USER_ENV: &str = "RETALIATION_HTTP_USER";

/// Environment variable for the HTTP basic auth password.
pub const HTTP_PASS_ENV: &str = "RETALIATION_HTTP_PASS";

/// Environment variable for the poll interval in seconds.
pub const POLL_INTERVAL_ENV: &str = "RETALIATION_POLL_INTERVAL_SECS";

/// Environment variable for the targets file.
pub const TARGETS_FILE_ENV: &str = "RETALIATION_TARGETS_FILE";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".retaliation";

/// Name of the env file read from the working and state directories.
const ENV_FILE: &str = ".env.local";

/// Name of the targets file inside the state directory.
const TARGETS_FILE: &str = "targets.json";

/// Default seconds between status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Longest accepted poll interval (one day).
pub const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Get the Retaliation state directory.
///
/// The state directory is determined by:
/// 1. `RETALIATION_STATE_DIR` environment variable if set
/// 2. `~/.retaliation` if home directory is available
/// 3. `.retaliation` in current directory as fallback
pub fn state_dir() -> PathBuf {
    state_dir_from(|name| std::env::var(name).ok())
}

/// [`state_dir`] with the environment read through `lookup`.
pub fn state_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(STATE_DIR_ENV)
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Load `.env.local` into the environment.
///
/// The working directory is read first, then the state directory. Values
/// already present in the environment are never overwritten.
pub fn load_env() {
    if dotenvy::from_filename(ENV_FILE).is_ok() {
        debug!("loaded {} from working directory", ENV_FILE);
    }

    let env_path = state_dir().join(ENV_FILE);
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
}

/// Path of the targets file to load, if any.
///
/// `RETALIATION_TARGETS_FILE` wins; otherwise `targets.json` in the state
/// directory is used when it exists. `None` means the built-in table.
pub fn targets_file() -> Option<PathBuf> {
    targets_file_from(|name| std::env::var(name).ok(), &state_dir())
}

/// [`targets_file`] with the environment read through `lookup` and the
/// state directory given explicitly.
pub fn targets_file_from<F>(lookup: F, state_dir: &Path) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(TARGETS_FILE_ENV).filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(shellexpand::tilde(path.trim()).into_owned()));
    }

    let default = state_dir.join(TARGETS_FILE);
    default.exists().then_some(default)
}

/// HTTP basic auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Where and how to reach the CI server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server base URL, e.g. `http://teamcity.example.com:8111`.
    pub base_url: Url,
    /// Basic auth, sent only when both user and password are set.
    pub credentials: Option<Credentials>,
    /// Time between polls.
    pub poll_interval: Duration,
}

impl ServerConfig {
    /// Reads the server settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or invalid, or the poll
    /// interval is not a number of seconds in `1..=86400`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the server settings through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_url = get(SERVER_URL_ENV).ok_or(ConfigError::Missing(SERVER_URL_ENV))?;
        let base_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            name: SERVER_URL_ENV,
            value: raw_url.clone(),
            source,
        })?;

        let credentials = match (get(HTTP_USER_ENV), get(HTTP_PASS_ENV)) {
            (Some(user), Some(password)) => Some(Credentials { user, password }),
            _ => None,
        };

        let poll_interval = match get(POLL_INTERVAL_ENV) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| (1..=MAX_POLL_INTERVAL_SECS).contains(secs))
                    .ok_or_else(|| ConfigError::InvalidNumber {
                        name: POLL_INTERVAL_ENV,
                        value: raw.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        Ok(Self {
            base_url,
            credentials,
            poll_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_server_config_minimal() {
        let config =
            ServerConfig::from_lookup(lookup(&[(SERVER_URL_ENV, "http://ci.local:8111")])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://ci.local:8111/");
        assert!(config.credentials.is_none());
        assert_eq!(config.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_server_config_with_credentials_and_interval() {
        let config = ServerConfig::from_lookup(lookup(&[
            (SERVER_URL_ENV, "https://ci.example.com"),
            (HTTP_USER_ENV, "bot"),
            (HTTP_PASS_ENV, "secret"),
            (POLL_INTERVAL_ENV, "15"),
        ]))
        .unwrap();

        let creds = config.credentials.unwrap();
        assert_eq!(creds.user, "bot");
        assert_eq!(creds.password, "secret");
        assert_eq!(config.poll_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_credentials_need_both_parts() {
        let config = ServerConfig::from_lookup(lookup(&[
            (SERVER_URL_ENV, "http://ci.local"),
            (HTTP_USER_ENV, "bot"),
            (HTTP_PASS_ENV, ""),
        ]))
        .unwrap();
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            user: "bot".to_string(),
            password: "secret".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(shown.contains("bot"));
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn test_missing_url() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(SERVER_URL_ENV)));
    }

    #[test]
    fn test_invalid_url() {
        let err =
            ServerConfig::from_lookup(lookup(&[(SERVER_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_invalid_interval() {
        let err = ServerConfig::from_lookup(lookup(&[
            (SERVER_URL_ENV, "http://ci.local"),
            (POLL_INTERVAL_ENV, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn test_interval_out_of_range() {
        for raw in ["0", "86401", "18446744073709551615"] {
            let err = ServerConfig::from_lookup(lookup(&[
                (SERVER_URL_ENV, "http://ci.local"),
                (POLL_INTERVAL_ENV, raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNumber { .. }), "interval {}", raw);
        }

        let config = ServerConfig::from_lookup(lookup(&[
            (SERVER_URL_ENV, "http://ci.local"),
            (POLL_INTERVAL_ENV, "86400"),
        ]))
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(MAX_POLL_INTERVAL_SECS));
    }

    #[test]
    fn test_state_dir_override() {
        let dir = state_dir_from(lookup(&[(STATE_DIR_ENV, "/srv/retaliation")]));
        assert_eq!(dir, PathBuf::from("/srv/retaliation"));
    }

    #[test]
    fn test_state_dir_defaults_under_home() {
        let dir = state_dir_from(lookup(&[]));
        match dirs::home_dir() {
            Some(home) => assert_eq!(dir, home.join(DEFAULT_STATE_DIR)),
            None => assert_eq!(dir, PathBuf::from(DEFAULT_STATE_DIR)),
        }
        assert_eq!(state_dir_from(lookup(&[(STATE_DIR_ENV, " ")])), dir);
    }

    #[test]
    fn test_targets_file_env_wins() {
        let state = tempfile::tempdir().unwrap();
        std::fs::write(state.path().join(TARGETS_FILE), "{}").unwrap();

        let path = targets_file_from(
            lookup(&[(TARGETS_FILE_ENV, "/etc/retaliation/targets.json")]),
            state.path(),
        );
        assert_eq!(path, Some(PathBuf::from("/etc/retaliation/targets.json")));
    }

    #[test]
    fn test_targets_file_expands_tilde() {
        let state = tempfile::tempdir().unwrap();
        let path = targets_file_from(lookup(&[(TARGETS_FILE_ENV, "~/aim.json")]), state.path())
            .unwrap();

        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("aim.json"));
        }
        assert!(path.ends_with("aim.json"));
    }

    #[test]
    fn test_targets_file_falls_back_to_state_dir() {
        let state = tempfile::tempdir().unwrap();
        let expected = state.path().join(TARGETS_FILE);
        std::fs::write(&expected, "{}").unwrap();

        assert_eq!(targets_file_from(lookup(&[]), state.path()), Some(expected));
    }

    #[test]
    fn test_targets_file_none_means_builtin_table() {
        let state = tempfile::tempdir().unwrap();
        assert_eq!(targets_file_from(lookup(&[]), state.path()), None);
        assert_eq!(
            targets_file_from(lookup(&[(TARGETS_FILE_ENV, "")]), state.path()),
            None
        );
    }
}
