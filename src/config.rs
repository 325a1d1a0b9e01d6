use std::{env, path::PathBuf};

pub const DEFAULT_ADDR: &str = "127.0.0.1:9001";
pub const DEFAULT_LOG_DIR: &str = "log";
pub const LOG_DIR_ENV: &str = "QUIZ_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    /// Question pack to load instead of the built-in bank.
    pub pack_path: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl ServerConfig {
    /// Reads `<addr> [pack]` from the process arguments and the log directory from the environment.
    pub fn from_env() -> Self {
        Self::from_args(env::args(), env::var(LOG_DIR_ENV).ok())
    }

    pub fn from_args(args: impl IntoIterator<Item = String>, log_dir: Option<String>) -> Self {
        let mut args = args.into_iter().skip(1);
        let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let pack_path = args.next().map(PathBuf::from);
        let log_dir = log_dir
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());

        Self {
            addr,
            pack_path,
            log_dir: PathBuf::from(log_dir),
        }
    }
}
