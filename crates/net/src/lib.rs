//! livechat network library
//!
//! Carries channel events over a byte stream the caller has already
//! connected.
//!
//! # Architecture
//!
//! - **Frame**: length-prefixed JSON events
//! - **SocketChannel**: a `Channel` whose emits are written by a background
//!   task and whose inbound events queue up in an `Inbox`
//!
//! # Usage
//!
//! ```ignore
//! let stream = TcpStream::connect(addr).await?;
//! let (channel, mut inbox) = SocketChannel::attach(stream);
//! let channel = Rc::new(channel);
//! let view = ChatView::new(channel.clone(), "alice", "lobby");
//!
//! while let Some(event) = inbox.next_event().await {
//!     channel.deliver(&event);
//! }
//! ```

pub mod error;
pub mod frame;
pub mod socket;

pub use error::{Error, Result};
pub use socket::{Inbox, SocketChannel};

/// Default port of the chat relay
pub const DEFAULT_PORT: u16 = 3001;
