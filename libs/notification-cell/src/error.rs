use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Live connection closed")]
    ConnectionClosed,
}
