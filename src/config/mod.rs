//! Configuration
//!
//! Layered settings: built-in defaults, then `~/.wasend/config.toml` (or the
//! file passed with `--config`), then `WASEND__SECTION__KEY` environment
//! variables. CLI flags are applied on top by the caller.

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the backend listens unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:10000";

/// Env var prefix, e.g. `WASEND__BACKEND__BASE_URL`.
const ENV_PREFIX: &str = "WASEND";
const ENV_SEPARATOR: &str = "__";

/// `~/.wasend`, falling back to the working directory when there is no home.
pub fn wasend_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wasend")
}

pub fn default_config_path() -> PathBuf {
    wasend_home().join("config.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Origin of the WhatsApp connection backend
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: crate::whatsapp::monitor::DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// JSON lines on stderr instead of the human format
    pub json: bool,
    /// Also write a daily-rolling log file
    pub file: bool,
    /// Where log files go, defaults to `~/.wasend/logs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            file: false,
            directory: None,
        }
    }
}

impl LoggingConfig {
    pub fn directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| wasend_home().join("logs"))
    }
}

impl Config {
    /// Load with `path` as the config file, or the default location when
    /// `None`. An explicit path must exist; a missing default file is fine.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };
        tracing::debug!("Loading config from {} (required={})", file.display(), required);

        let settings = config::Config::builder()
            .add_source(
                config::Config::try_from(&Self::default())
                    .context("Failed to build default config")?,
            )
            .add_source(
                config::File::from(file.as_path())
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", file.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Put command-line flags over the loaded layers and re-check the result.
    pub fn apply_overrides(&mut self, cli: &Cli) -> Result<()> {
        if let Some(base_url) = &cli.base_url {
            self.backend.base_url = base_url.clone();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.backend.base_url)
            .with_context(|| format!("Invalid backend.base_url '{}'", self.backend.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "backend.base_url must be http or https, got '{}'",
                url.scheme()
            );
        }
        if self.backend.request_timeout_secs == 0 {
            anyhow::bail!("backend.request_timeout_secs must be greater than zero");
        }
        if self.monitor.poll_interval_ms == 0 {
            anyhow::bail!("monitor.poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.request_timeout_secs)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Write the default config to `path`. Refuses to overwrite unless `force`.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        std::fs::write(path, Self::default().to_toml()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote default config to {}", path.display());
        Ok(())
    }
}
