use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding `linkedin_profile_<id>.json` files and the `tasks/` subdirectory.
    pub data_dir: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub navigation_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    pub max_scroll_rounds: u32,
    pub scroll_delay_ms: u64,
    pub reactions_limit: usize,
}
