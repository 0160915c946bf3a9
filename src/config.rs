use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

/// Process-wide settings.
///
/// Every field has a default, so an empty config file (or no file at all)
/// yields a working configuration. Settings apply to monitors and history
/// rings created after the change; existing ones keep what they were built
/// with.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Probe connect timeout in milliseconds, fixed per probe regardless of
    /// the scheduling interval
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    /// Maximum retained probe outcomes per endpoint
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Directory holding the persisted state files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Bind address for the API server
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Seconds between periodic state saves
    #[serde(default = "default_save_interval_secs")]
    pub save_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ping_timeout_ms: default_ping_timeout_ms(),
            max_history: default_max_history(),
            data_dir: default_data_dir(),
            bind_addr: default_bind_addr(),
            save_interval_secs: default_save_interval_secs(),
        }
    }
}

impl Config {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }
}

fn default_ping_timeout_ms() -> u64 {
    5000
}

fn default_max_history() -> usize {
    1000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_bind_addr() -> SocketAddr {
    "127.0.0.1:3000".parse().unwrap()
}

fn default_save_interval_secs() -> u64 {
    60
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
