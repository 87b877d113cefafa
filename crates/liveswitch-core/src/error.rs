use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiveSwitchError {
    #[error("config not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid command '{0}'")]
    InvalidCommand(String),

    #[error("channel group not found: {0}")]
    GroupNotFound(String),

    #[error("channel index {index} out of range for group '{group}' ({len} channels)")]
    IndexOutOfRange {
        group: String,
        index: usize,
        len: usize,
    },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LiveSwitchError>;
