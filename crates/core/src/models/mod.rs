//! Data models for livechat

mod message;

pub use message::*;
