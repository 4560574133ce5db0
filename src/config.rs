//! User configuration from `~/.flexword/config.toml`
//!
//! Every field is optional. Command-line flags override the file, and the
//! file overrides built-in defaults.

use crate::driver::{DEFAULT_GRACE_INTERVAL, DEFAULT_SETTLEMENT_TIMEOUT, DriverOptions};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const DEFAULT_USERNAME: &str = "player";

#[derive(Debug, Default, Deserialize)]
pub struct FlexConfig {
    pub player: Option<PlayerConfig>,
    pub ledger: Option<LedgerConfig>,
    pub leaderboard: Option<LeaderboardConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayerConfig {
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerConfig {
    /// Database path, or `memory`
    pub path: Option<PathBuf>,
    pub settlement_timeout_ms: Option<u64>,
    pub settlement_grace_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardConfig {
    pub limit: Option<usize>,
}

impl FlexConfig {
    /// Load the config file, or `None` if it is missing or unreadable
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        if !path.exists() {
            return None;
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

/// Directory holding the config, ledger database and logs
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".flexword"), |home| home.join(".flexword"))
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".flexword").join("config.toml"))
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub username: String,
    pub ledger: PathBuf,
    pub driver: DriverOptions,
    pub leaderboard_limit: usize,
}

impl Settings {
    /// Merge command-line overrides, the config file and the environment
    #[must_use]
    pub fn resolve(config: &FlexConfig, user: Option<String>, ledger: Option<PathBuf>) -> Self {
        Self::resolve_with_env(config, user, ledger, |key| env::var(key).ok())
    }

    fn resolve_with_env(
        config: &FlexConfig,
        user: Option<String>,
        ledger: Option<PathBuf>,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let player = config.player.as_ref();
        let ledger_config = config.ledger.as_ref();

        let username = user
            .or_else(|| player.and_then(|p| p.username.clone()))
            .or_else(|| env_var("FLEXWORD_USER"))
            .or_else(|| env_var("USER"))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

        let ledger = ledger
            .or_else(|| ledger_config.and_then(|l| l.path.clone()))
            .unwrap_or_else(|| data_dir().join("ledger.db"));

        let settlement_timeout = ledger_config
            .and_then(|l| l.settlement_timeout_ms)
            .map_or(DEFAULT_SETTLEMENT_TIMEOUT, Duration::from_millis);
        let grace_interval = ledger_config
            .and_then(|l| l.settlement_grace_ms)
            .map_or(DEFAULT_GRACE_INTERVAL, Duration::from_millis);

        let leaderboard_limit = config
            .leaderboard
            .as_ref()
            .and_then(|l| l.limit)
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT);

        Self {
            username,
            ledger,
            driver: DriverOptions {
                settlement_timeout,
                grace_interval,
            },
            leaderboard_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_config() {
        let settings = Settings::resolve_with_env(&FlexConfig::default(), None, None, no_env);
        assert_eq!(settings.username, "player");
        assert!(settings.ledger.ends_with("ledger.db"));
        assert_eq!(settings.driver, DriverOptions::default());
        assert_eq!(settings.leaderboard_limit, DEFAULT_LEADERBOARD_LIMIT);
    }

    #[test]
    fn parses_full_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[player]
username = "alice"

[ledger]
path = "memory"
settlement_timeout_ms = 250
settlement_grace_ms = 0

[leaderboard]
limit = 3
"#
        )
        .unwrap();

        let config = FlexConfig::load_from(file.path()).unwrap();
        let settings = Settings::resolve_with_env(&config, None, None, no_env);

        assert_eq!(settings.username, "alice");
        assert_eq!(settings.ledger, PathBuf::from("memory"));
        assert_eq!(settings.driver.settlement_timeout, Duration::from_millis(250));
        assert!(settings.driver.grace_interval.is_zero());
        assert_eq!(settings.leaderboard_limit, 3);
    }

    #[test]
    fn malformed_config_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ledger]\nsettlement_timeout_ms = \"soon\"").unwrap();
        assert!(FlexConfig::load_from(file.path()).is_none());
    }

    #[test]
    fn flags_override_config() {
        let config: FlexConfig = toml::from_str(
            r#"
[player]
username = "alice"
[ledger]
path = "/tmp/flexword.db"
"#,
        )
        .unwrap();

        let settings = Settings::resolve_with_env(
            &config,
            Some("bob".to_string()),
            Some(PathBuf::from("memory")),
            no_env,
        );
        assert_eq!(settings.username, "bob");
        assert_eq!(settings.ledger, PathBuf::from("memory"));
    }

    #[test]
    fn username_falls_back_through_environment() {
        let both = |key: &str| match key {
            "FLEXWORD_USER" => Some("carol".to_string()),
            "USER" => Some("root".to_string()),
            _ => None,
        };
        let only_user = |key: &str| (key == "USER").then(|| "dave".to_string());
        let config = FlexConfig::default();

        assert_eq!(Settings::resolve_with_env(&config, None, None, both).username, "carol");
        assert_eq!(
            Settings::resolve_with_env(&config, None, None, only_user).username,
            "dave"
        );
        assert_eq!(
            Settings::resolve_with_env(&config, Some("  ".to_string()), None, no_env).username,
            "player"
        );
    }
}
