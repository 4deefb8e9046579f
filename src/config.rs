use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Internal retry budget for moves that lose an optimistic version check
    #[serde(default = "default_move_retry_limit")]
    pub move_retry_limit: u32,
    /// Maximum tree depth accepted by create/move (0 = unlimited)
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
    /// Maximum department name length in characters
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default value functions
fn default_move_retry_limit() -> u32 {
    3
}

fn default_max_depth() -> i32 {
    0
}

fn default_max_name_len() -> usize {
    32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            move_retry_limit: default_move_retry_limit(),
            max_depth: default_max_depth(),
            max_name_len: default_max_name_len(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
