use thiserror::Error;

/// Errors surfaced by the quiz server outside of the session controller.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// A question pack failed validation.
    #[error("invalid question pack: {0}")]
    InvalidPack(String),

    #[error("logger setup failed: {0}")]
    Logger(String),
}
