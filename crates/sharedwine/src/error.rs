use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no wine prefix configured (WINEPREFIX is not set)")]
    MissingPrefix,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to load {path}: {reason}")]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("symbol `{symbol}` not found: {reason}")]
    SymbolNotFound { symbol: String, reason: String },

    #[error("failed to spawn loader thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("loader thread terminated without reporting a result")]
    WorkerPanicked,

    #[error("launch result was already taken")]
    ResultTaken,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JNI error: {0}")]
    Jni(String),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
