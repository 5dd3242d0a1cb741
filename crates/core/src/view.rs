//! Chat view model
//!
//! Holds the draft text and the displayed message list for one room/user
//! pair, turns user intent into outbound events and inbound events into
//! list mutations.
//!
//! Local changes are optimistic: a send or delete is applied to the list
//! right after the emit, whether or not the emit succeeded, and is never
//! reconciled.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::channel::{Channel, ListenerId};
use crate::clock::{Clock, MessageIdGenerator, SystemClock};
use crate::error::{Error, Result};
use crate::event::{Event, EventName};
use crate::models::{format_clock, ChatMessage, MessageId};

/// Key pressed while the input field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

/// Which side of the conversation a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    You,
    Other,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::You => "you",
            Side::Other => "other",
        }
    }
}

/// A message prepared for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: MessageId,
    pub author: String,
    pub text: String,
    pub timestamp: String,
    pub side: Side,
    /// Whether the delete affordance is offered for this row
    pub deletable: bool,
}

/// Local view state
#[derive(Debug, Default)]
pub struct ChatState {
    pub draft: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatState {
    fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace every message sharing the id. Returns how many were replaced.
    fn replace(&mut self, updated: &ChatMessage) -> usize {
        let mut replaced = 0;
        for message in self.messages.iter_mut().filter(|m| m.id == updated.id) {
            *message = updated.clone();
            replaced += 1;
        }
        replaced
    }

    /// Drop every message with the id. Returns how many were removed.
    fn remove(&mut self, id: MessageId) -> usize {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        before - self.messages.len()
    }
}

/// View model for a live chat window bound to one channel
pub struct ChatView {
    channel: Rc<dyn Channel>,
    username: String,
    room: String,
    clock: Box<dyn Clock>,
    ids: MessageIdGenerator,
    state: Rc<RefCell<ChatState>>,
    subscriptions: Vec<ListenerId>,
}

impl ChatView {
    /// Create the view and subscribe to the channel
    pub fn new(channel: Rc<dyn Channel>, username: impl Into<String>, room: impl Into<String>) -> Self {
        Self::with_clock(channel, username, room, Box::new(SystemClock))
    }

    pub fn with_clock(
        channel: Rc<dyn Channel>,
        username: impl Into<String>,
        room: impl Into<String>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut view = Self {
            channel,
            username: username.into(),
            room: room.into(),
            clock,
            ids: MessageIdGenerator::new(),
            state: Rc::new(RefCell::new(ChatState::default())),
            subscriptions: Vec::new(),
        };
        view.mount();
        view
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn draft(&self) -> String {
        self.state.borrow().draft.clone()
    }

    /// Borrow the displayed messages in insertion order
    pub fn messages(&self) -> Ref<'_, [ChatMessage]> {
        Ref::map(self.state.borrow(), |s| s.messages.as_slice())
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Replace the draft text. Called on every edit of the input field.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.state.borrow_mut().draft = text.into();
    }

    /// React to a key press in the input field. Only Enter does anything.
    pub fn handle_key(&mut self, key: Key) -> Option<MessageId> {
        match key {
            Key::Enter => self.submit(),
            Key::Char(_) | Key::Other => None,
        }
    }

    /// Send the draft as a new message
    ///
    /// An exactly-empty draft is ignored; whitespace is sent as-is. Returns
    /// the id of the message appended locally.
    pub fn submit(&mut self) -> Option<MessageId> {
        let text = {
            let state = self.state.borrow();
            if state.draft.is_empty() {
                return None;
            }
            state.draft.clone()
        };

        let now = self.clock.now();
        let message = ChatMessage {
            id: self.ids.next_id(&now),
            room: self.room.clone(),
            author: self.username.clone(),
            text,
            timestamp: format_clock(&now),
        };
        let id = message.id;

        if let Err(e) = self.channel.emit(Event::SendMessage(message.clone())) {
            warn!(message_id = %id, error = %e, "Failed to emit send_message");
        }

        let mut state = self.state.borrow_mut();
        state.append(message);
        state.draft.clear();
        debug!(message_id = %id, room = %self.room, "Message sent");
        Some(id)
    }

    /// Emit a deletion request and drop the message locally
    ///
    /// Performs no authorship check. Returns how many entries were removed.
    pub fn remove(&mut self, id: MessageId) -> usize {
        if let Err(e) = self.channel.emit(Event::DeleteMessage(id)) {
            warn!(message_id = %id, error = %e, "Failed to emit delete_message");
        }

        let removed = self.state.borrow_mut().remove(id);
        debug!(message_id = %id, removed = removed, "Message deleted");
        removed
    }

    /// Delete a message through the UI affordance
    ///
    /// Only the author's own messages can be deleted this way. This is a
    /// convenience of the presentation layer, not an authorization boundary:
    /// inbound `delete_message` events are applied for any message, so a
    /// peer is trusted to only delete what it may. Enforcement belongs to
    /// whatever is authoritative behind the channel.
    pub fn request_delete(&mut self, id: MessageId) -> Result<usize> {
        let own = {
            let state = self.state.borrow();
            let message = state
                .messages
                .iter()
                .find(|m| m.id == id)
                .ok_or(Error::NotFound(id))?;
            message.is_authored_by(&self.username)
        };

        if !own {
            return Err(Error::NotAuthor(id));
        }
        Ok(self.remove(id))
    }

    /// Messages prepared for display
    pub fn rows(&self) -> Vec<MessageRow> {
        self.state
            .borrow()
            .messages
            .iter()
            .map(|m| {
                let own = m.is_authored_by(&self.username);
                MessageRow {
                    id: m.id,
                    author: m.author.clone(),
                    text: m.text.clone(),
                    timestamp: m.timestamp.clone(),
                    side: if own { Side::You } else { Side::Other },
                    deletable: own,
                }
            })
            .collect()
    }

    /// Bind to a different channel
    ///
    /// Passing the channel already bound is a no-op. Otherwise the listeners
    /// move from the old channel to the new one; events sent in between are
    /// not replayed.
    pub fn set_channel(&mut self, channel: Rc<dyn Channel>) {
        if same_channel(&self.channel, &channel) {
            return;
        }

        let was_mounted = self.is_mounted();
        self.unmount();
        self.channel = channel;
        if was_mounted {
            self.mount();
        }
    }

    /// Register the receive, update and delete listeners
    pub fn mount(&mut self) {
        if self.is_mounted() {
            return;
        }

        self.subscriptions = vec![
            self.channel.on(
                EventName::ReceiveMessage,
                listener(&self.state, |state, event| {
                    if let Event::ReceiveMessage(message) = event {
                        state.append(message.clone());
                    }
                }),
            ),
            self.channel.on(
                EventName::UpdateMessage,
                listener(&self.state, |state, event| {
                    if let Event::UpdateMessage(message) = event {
                        if state.replace(message) == 0 {
                            debug!(message_id = %message.id, "Update for unknown message");
                        }
                    }
                }),
            ),
            self.channel.on(
                EventName::DeleteMessage,
                listener(&self.state, |state, event| {
                    if let Event::DeleteMessage(id) = event {
                        state.remove(*id);
                    }
                }),
            ),
        ];
        debug!(room = %self.room, "Chat view subscribed");
    }

    /// Deregister exactly the listeners added by [`ChatView::mount`]
    pub fn unmount(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for id in self.subscriptions.drain(..) {
            self.channel.off(id);
        }
        debug!(room = %self.room, "Chat view unsubscribed");
    }
}

impl Drop for ChatView {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Wrap a state handler as a channel listener holding only a weak reference
fn listener<F>(state: &Rc<RefCell<ChatState>>, handler: F) -> crate::channel::Listener
where
    F: Fn(&mut ChatState, &Event) + 'static,
{
    let state: Weak<RefCell<ChatState>> = Rc::downgrade(state);
    Box::new(move |event: &Event| {
        if let Some(state) = state.upgrade() {
            handler(&mut state.borrow_mut(), event);
        }
    })
}

fn same_channel(a: &Rc<dyn Channel>, b: &Rc<dyn Channel>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}
