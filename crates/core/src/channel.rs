//! Bidirectional event channel abstraction
//!
//! A channel is shared by whoever holds it. Views only add and remove their
//! own listeners and never close the channel.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::event::{Event, EventName};

/// Callback invoked for every inbound event of the name it was registered for
pub type Listener = Box<dyn FnMut(&Event)>;

/// Handle returned by [`Channel::on`], used to remove exactly that listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A bidirectional, event-based connection
pub trait Channel {
    /// Send an event to the remote side. Does not wait for delivery.
    fn emit(&self, event: Event) -> Result<()>;

    /// Register a listener for inbound events named `name`
    fn on(&self, name: EventName, listener: Listener) -> ListenerId;

    /// Remove a listener. Returns false if it was not registered.
    fn off(&self, id: ListenerId) -> bool;
}

struct Registration {
    id: ListenerId,
    name: EventName,
    listener: Rc<RefCell<Listener>>,
}

/// Ordered listener table shared by channel implementations
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Registration>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, name: EventName, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.entries.borrow_mut().push(Registration {
            id,
            name,
            listener: Rc::new(RefCell::new(listener)),
        });
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|r| r.id != id);
        entries.len() != before
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of listeners registered for `name`
    pub fn count_for(&self, name: EventName) -> usize {
        self.entries.borrow().iter().filter(|r| r.name == name).count()
    }

    /// Invoke every listener registered for the event's name, in registration
    /// order. Returns how many listeners ran.
    ///
    /// The table is snapshotted first, so listeners may call `add` or
    /// `remove` while running.
    pub fn dispatch(&self, event: &Event) -> usize {
        let name = event.name();
        let targets: Vec<Rc<RefCell<Listener>>> = self
            .entries
            .borrow()
            .iter()
            .filter(|r| r.name == name)
            .map(|r| Rc::clone(&r.listener))
            .collect();

        for target in &targets {
            let mut listener = target.borrow_mut();
            (*listener)(event);
        }

        if targets.is_empty() {
            debug!(event = %name, "No listeners for event");
        }
        targets.len()
    }
}

/// In-process channel
///
/// Emitted events are recorded instead of sent anywhere and inbound events
/// are injected with [`MemoryChannel::deliver`]. Emits are not looped back to
/// local listeners.
#[derive(Default)]
pub struct MemoryChannel {
    listeners: ListenerRegistry,
    emitted: RefCell<Vec<Event>>,
    closed: Cell<bool>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an inbound event to registered listeners
    pub fn deliver(&self, event: Event) -> usize {
        self.listeners.dispatch(&event)
    }

    /// Events emitted so far
    pub fn emitted(&self) -> Vec<Event> {
        self.emitted.borrow().clone()
    }

    /// Drain the recorded events
    pub fn take_emitted(&self) -> Vec<Event> {
        std::mem::take(&mut *self.emitted.borrow_mut())
    }

    /// Make every later emit fail
    pub fn close(&self) {
        self.closed.set(true);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Channel for MemoryChannel {
    fn emit(&self, event: Event) -> Result<()> {
        if self.closed.get() {
            return Err(Error::ChannelClosed);
        }
        self.emitted.borrow_mut().push(event);
        Ok(())
    }

    fn on(&self, name: EventName, listener: Listener) -> ListenerId {
        self.listeners.add(name, listener)
    }

    fn off(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}
