//! Bootstrap configuration loading
//!
//! The TOML file holds static bootstrap settings (listen address, logging,
//! LLM endpoint, emotion history bounds). Values are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "XIAOYU_CONFIG";

/// Environment variable selecting the deployment environment
pub const ENVIRONMENT_ENV_VAR: &str = "XIAOYU_ENV";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Deployment environment ("production" or "development")
    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub emotion: EmotionConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Hosted LLM endpoint configuration (OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (prefer the OPENAI_API_KEY environment variable)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Emotion history bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Entries retained per session
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Sessions retained before the least recently used one is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Entries considered when computing trends
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            max_sessions: default_max_sessions(),
            trend_window: default_trend_window(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_history_capacity() -> usize {
    50
}

fn default_max_sessions() -> usize {
    256
}

fn default_trend_window() -> usize {
    5
}

impl TomlConfig {
    /// Whether detailed error information may be returned to clients
    ///
    /// `XIAOYU_ENV` (or `NODE_ENV` for compatibility with the web front end)
    /// overrides the TOML `environment` key.
    pub fn is_development(&self) -> bool {
        let env_value = std::env::var(ENVIRONMENT_ENV_VAR)
            .or_else(|_| std::env::var("NODE_ENV"))
            .ok();
        match env_value.as_deref().or(self.environment.as_deref()) {
            Some(value) => value.eq_ignore_ascii_case("development"),
            None => false,
        }
    }

    /// Validate values that serde cannot constrain
    pub fn validate(&self) -> Result<()> {
        if self.emotion.history_capacity == 0 {
            return Err(Error::Config(
                "emotion.history_capacity must be at least 1".to_string(),
            ));
        }
        if self.emotion.max_sessions == 0 {
            return Err(Error::Config(
                "emotion.max_sessions must be at least 1".to_string(),
            ));
        }
        if self.emotion.trend_window == 0 {
            return Err(Error::Config(
                "emotion.trend_window must be at least 1".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("llm.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Resolve the config file path
///
/// Priority: CLI argument → `XIAOYU_CONFIG` → platform default location.
/// Returns `None` when no file exists at the default location; an explicitly
/// named file is returned even if missing so the caller reports the error.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let default = default_config_path()?;
    if default.exists() {
        Some(default)
    } else {
        debug!("No config file at {}", default.display());
        None
    }
}

/// Platform default config location (`~/.config/xiaoyu/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("xiaoyu").join("config.toml"))
}

/// Load configuration, falling back to compiled defaults when no file exists
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => load_toml_config(&path),
        None => {
            warn!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the listen port
///
/// Priority: CLI argument → `XIAOYU_PORT` → TOML → default.
pub fn resolve_port(cli_arg: Option<u16>, config: &TomlConfig) -> u16 {
    if let Some(port) = cli_arg {
        return port;
    }

    if let Ok(value) = std::env::var("XIAOYU_PORT") {
        match value.trim().parse::<u16>() {
            Ok(port) => return port,
            Err(_) => warn!("Ignoring invalid XIAOYU_PORT value: {}", value),
        }
    }

    config.server.port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, 5730);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.emotion.history_capacity, 50);
        assert_eq!(config.emotion.trend_window, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [llm]
            model = "qwen-plus"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "qwen-plus");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.server.port, 5730);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = TomlConfig::default();
        config.emotion.history_capacity = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_port_wins() {
        let config = TomlConfig::default();
        assert_eq!(resolve_port(Some(9000), &config), 9000);
    }

    #[test]
    fn test_cli_config_path_wins() {
        let path = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }
}
