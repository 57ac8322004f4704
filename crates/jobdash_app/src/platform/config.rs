//! Startup configuration: an optional RON file overridden by CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use jobdash_core::DashboardSettings;
use jobdash_engine::{ApiSettings, BackoffPolicy, EngineConfig, PushSettings};
use jobdash_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "jobdash.ron";

#[derive(Debug, Parser)]
#[command(name = "jobdash", about = "Terminal dashboard for recommended jobs")]
pub struct Cli {
    /// RON config file. Defaults to ./jobdash.ron.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// API base URL, e.g. http://localhost:5000
    #[arg(long)]
    pub api: Option<String>,
    /// Sign in as this user on startup.
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(value: LogTarget) -> Self {
        match value {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub stats_refresh_delay_ms: u64,
    pub push_initial_backoff_ms: u64,
    pub push_max_backoff_ms: u64,
    pub log_destination: LogTarget,
    pub user: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            page_size: 10,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            stats_refresh_delay_ms: 300,
            push_initial_backoff_ms: 500,
            push_max_backoff_ms: 30_000,
            log_destination: LogTarget::File,
            user: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl AppConfig {
    /// A missing file is not an error; it yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(api) = &cli.api {
            self.api_base_url = api.clone();
        }
        if let Some(user) = &cli.user {
            self.user = Some(user.clone());
        }
        if let Some(log) = cli.log {
            self.log_destination = log;
        }
        self
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            page_size: self.page_size.max(1),
            stats_refresh_delay: Duration::from_millis(self.stats_refresh_delay_ms),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        let connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        let initial = Duration::from_millis(self.push_initial_backoff_ms.max(1));
        EngineConfig {
            api: ApiSettings {
                base_url: self.api_base_url.clone(),
                connect_timeout,
                request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            },
            push: PushSettings {
                connect_timeout,
                backoff: BackoffPolicy {
                    initial,
                    max: Duration::from_millis(self.push_max_backoff_ms).max(initial),
                },
                ..PushSettings::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(text.as_bytes()).expect("write");
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load(&dir.path().join("nope.ron")).expect("defaults");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let (_dir, path) = write_config(
            r#"(api_base_url: "https://jobs.example", page_size: 25, log_destination: both)"#,
        );
        let config = AppConfig::load(&path).expect("parse");
        assert_eq!(config.api_base_url, "https://jobs.example");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.log_destination, LogTarget::Both);
        assert_eq!(config.stats_refresh_delay_ms, 300);
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let (_dir, path) = write_config("(page_size: \"ten\")");
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_flags_override_file() {
        let cli = Cli::parse_from([
            "jobdash",
            "--api",
            "http://127.0.0.1:9000",
            "--user",
            "alice",
            "--log",
            "terminal",
        ]);
        let config = AppConfig::default().with_cli(&cli);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.log_destination, LogTarget::Terminal);
        assert_eq!(cli.config_path(), PathBuf::from(CONFIG_FILE_NAME));
    }

    #[test]
    fn settings_convert_to_engine_and_core() {
        let config = AppConfig {
            page_size: 0,
            push_initial_backoff_ms: 200,
            push_max_backoff_ms: 100,
            ..AppConfig::default()
        };
        assert_eq!(config.dashboard_settings().page_size, 1);
        assert_eq!(
            config.dashboard_settings().stats_refresh_delay,
            Duration::from_millis(300)
        );
        let engine = config.engine_config();
        assert_eq!(engine.push.backoff.initial, Duration::from_millis(200));
        assert_eq!(engine.push.backoff.max, Duration::from_millis(200));
        assert_eq!(engine.push.namespace, "/resume");
    }
}
