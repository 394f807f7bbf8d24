//! Topic error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopicError {
    /// Subscriber fell behind; the payload is the dropped message count
    #[error("Subscriber lagged, {0} messages dropped")]
    Lagged(u64),

    #[error("Topic channel closed")]
    ChannelClosed,

    #[error("Topic {name} already exists with a different message type")]
    TypeMismatch { name: String },
}

impl From<tokio::sync::broadcast::error::RecvError> for TopicError {
    fn from(e: tokio::sync::broadcast::error::RecvError) -> Self {
        match e {
            tokio::sync::broadcast::error::RecvError::Lagged(n) => Self::Lagged(n),
            tokio::sync::broadcast::error::RecvError::Closed => Self::ChannelClosed,
        }
    }
}
