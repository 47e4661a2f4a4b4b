use thiserror::Error;

/// All errors produced by signa-core.
#[derive(Debug, Error)]
pub enum SignaError {
    #[error("malformed pose frame: {0}")]
    PoseDecode(String),

    #[error("hand pose must have exactly 21 landmarks, got {0}")]
    LandmarkCount(usize),

    #[error("pose source error: {0}")]
    PoseSource(String),

    #[error("dictionary error: {0}")]
    Dictionary(String),

    #[error("speech output error: {0}")]
    Speech(String),

    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine is not running")]
    NotRunning,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SignaError>;
