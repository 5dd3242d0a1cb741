//! Error types for livechat core

use thiserror::Error;

use crate::models::MessageId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Message not found: {0}")]
    NotFound(MessageId),

    #[error("Not the author of message {0}")]
    NotAuthor(MessageId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
