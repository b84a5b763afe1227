use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for the assistant core. Remote failures carry the
/// backend's own message where one was readable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("microphone unavailable: {0}")]
    PermissionDenied(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("description generation failed: {0}")]
    GenerationFailed(String),

    #[error("backend request failed: {0}")]
    Network(String),

    #[error("{0}")]
    Validation(&'static str),

    #[error("speech output failed: {0}")]
    SpeechFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
