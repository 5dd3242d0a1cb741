//! livechat core library
//!
//! Message model, channel event vocabulary, the channel abstraction and the
//! chat view model that binds them together.

pub mod channel;
pub mod clock;
pub mod error;
pub mod event;
pub mod models;
pub mod view;

pub use channel::{Channel, Listener, ListenerId, ListenerRegistry, MemoryChannel};
pub use clock::{Clock, FixedClock, MessageIdGenerator, SystemClock};
pub use error::{Error, Result};
pub use event::{Event, EventName};
pub use models::*;
pub use view::{ChatState, ChatView, Key, MessageRow, Side};
