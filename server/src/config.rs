use shared::{DEFAULT_HOST, DEFAULT_PORT};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAP_PATH: &str = "maps/arena.txt";

/// Runtime settings for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP listener binds to
    pub address: String,
    pub map_path: PathBuf,
    /// Evict players silent for this long. `None` keeps every player forever.
    pub player_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            map_path: PathBuf::from(DEFAULT_MAP_PATH),
            player_timeout: None,
        }
    }
}
