use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use vocab_algo::DEFAULT_DUE_LIMIT;

const DEFAULT_DUE_LIMIT_MAX: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Directory for rolling log files; `None` logs to stdout only
    pub log_dir: Option<PathBuf>,
    /// Snapshot file for mastery records; `None` keeps everything in memory
    pub data_file: Option<PathBuf>,
    pub due_limit_default: usize,
    pub due_limit_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            log_level: "info".to_string(),
            log_dir: None,
            data_file: None,
            due_limit_default: DEFAULT_DUE_LIMIT,
            due_limit_max: DEFAULT_DUE_LIMIT_MAX,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_parse::<u16>("PORT").unwrap_or(defaults.port);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let log_dir = env_bool("ENABLE_FILE_LOGS").unwrap_or(false).then(|| {
            PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()))
        });

        let data_file = std::env::var("MASTERY_DATA_FILE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let due_limit_max = env_parse::<usize>("DUE_LIMIT_MAX")
            .filter(|v| *v > 0)
            .unwrap_or(defaults.due_limit_max);

        let due_limit_default = env_parse::<usize>("DUE_LIMIT_DEFAULT")
            .filter(|v| *v > 0)
            .unwrap_or(defaults.due_limit_default)
            .min(due_limit_max);

        Self {
            host,
            port,
            log_level,
            log_dir,
            data_file,
            due_limit_default,
            due_limit_max,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
