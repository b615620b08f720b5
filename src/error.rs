//! Error types for vidsweep

use thiserror::Error;

/// Coarse error categories, used for exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Input errors
    NotFound,
    EmptyData,
    SchemaError,
    ParseError,

    // User errors
    InvalidConfig,

    // System errors
    NetworkError,
    FileError,
    SpawnError,
}

impl ErrorCode {
    /// Process exit status for this category
    pub fn exit_code(self) -> i32 {
        match self {
            Self::NotFound => 2,
            Self::EmptyData => 3,
            Self::SchemaError => 4,
            Self::ParseError => 5,
            Self::InvalidConfig => 6,
            Self::NetworkError => 7,
            Self::FileError => 8,
            Self::SpawnError => 9,
        }
    }
}

/// Fatal, pipeline-level errors
#[derive(Error, Debug)]
pub enum VidSweepError {
    #[error("The file at path {0} was not found")]
    NotFound(String),

    #[error("No data found in {0}")]
    EmptyData(String),

    #[error("Missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VidSweepError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::EmptyData(_) => ErrorCode::EmptyData,
            Self::Schema { .. } => ErrorCode::SchemaError,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::Csv(_) => ErrorCode::ParseError,
            Self::File(_) => ErrorCode::FileError,
            Self::Spawn(_) | Self::Join(_) => ErrorCode::SpawnError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Json(_) => ErrorCode::InvalidConfig,
        }
    }
}

pub type Result<T> = std::result::Result<T, VidSweepError>;

/// Why a single download failed. Never escapes the batch.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("body read failed: {0}")]
    Body(std::io::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}
