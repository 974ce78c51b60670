use std::path::PathBuf;

use screenplay::record::RecordError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("'{}': {source}", .path.display())]
    Record {
        path: PathBuf,
        source: RecordError,
    },
    #[error("cannot encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
