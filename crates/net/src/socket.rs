//! Channel over a caller-connected byte stream
//!
//! The caller owns connecting, reconnecting and authenticating; this module
//! only moves events in both directions over a stream it is handed.
//! Listener callbacks never run on the I/O tasks: inbound events queue up in
//! an [`Inbox`] and the owner delivers them on its own turn.

use livechat_core::{Channel, Event, EventName, Listener, ListenerId, ListenerRegistry};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::frame::{read_frame, write_frame};

/// Capacity of the inbound and outbound event queues
pub const QUEUE_CAPACITY: usize = 64;

/// Events received from the remote side, in arrival order
pub struct Inbox {
    event_rx: mpsc::Receiver<Event>,
}

impl Inbox {
    /// Wait for the next inbound event. `None` once the connection is gone.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Take an already queued event without waiting
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.event_rx.try_recv().ok()
    }
}

/// A [`Channel`] backed by length-prefixed JSON frames on a stream
pub struct SocketChannel {
    listeners: ListenerRegistry,
    cmd_tx: mpsc::Sender<Event>,
}

impl SocketChannel {
    /// Take over a connected stream
    ///
    /// Spawns a reader and a writer task on the current tokio runtime, so
    /// this must be called from within one.
    pub fn attach<S>(stream: S) -> (Self, Inbox)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (event_tx, event_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (cmd_tx, cmd_rx) = mpsc::channel(QUEUE_CAPACITY);

        tokio::spawn(reader_task(reader, event_tx));
        tokio::spawn(writer_task(writer, cmd_rx));

        let channel = SocketChannel {
            listeners: ListenerRegistry::new(),
            cmd_tx,
        };
        (channel, Inbox { event_rx })
    }

    /// Dispatch an event taken from the [`Inbox`] to registered listeners
    pub fn deliver(&self, event: &Event) -> usize {
        self.listeners.dispatch(event)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Channel for SocketChannel {
    fn emit(&self, event: Event) -> livechat_core::Result<()> {
        self.cmd_tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                livechat_core::Error::Transport("Outbound queue full".into())
            }
            mpsc::error::TrySendError::Closed(_) => livechat_core::Error::ChannelClosed,
        })
    }

    fn on(&self, name: EventName, listener: Listener) -> ListenerId {
        self.listeners.add(name, listener)
    }

    fn off(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

async fn reader_task<S: AsyncRead>(mut reader: ReadHalf<S>, event_tx: mpsc::Sender<Event>) {
    loop {
        match read_frame(&mut reader).await {
            Ok(event) => {
                debug!(event = %event.name(), "Event received");
                if event_tx.send(event).await.is_err() {
                    debug!("Inbox dropped");
                    break;
                }
            }
            Err(Error::Malformed(reason)) => {
                warn!(reason = %reason, "Dropping malformed event");
            }
            Err(Error::ConnectionClosed) => {
                info!("Peer closed connection");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Read error");
                break;
            }
        }
    }
}

async fn writer_task<S: AsyncWrite>(mut writer: WriteHalf<S>, mut cmd_rx: mpsc::Receiver<Event>) {
    while let Some(event) = cmd_rx.recv().await {
        if let Err(e) = write_frame(&mut writer, &event).await {
            warn!(event = %event.name(), error = %e, "Write error");
            break;
        }
        debug!(event = %event.name(), "Event sent");
    }

    if let Err(e) = writer.shutdown().await {
        debug!(error = %e, "Shutdown failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::write_raw_frame;
    use livechat_core::{ChatMessage, ChatView, MessageId};
    use std::cell::Cell;
    use std::rc::Rc;

    fn msg(id: u64, author: &str) -> ChatMessage {
        ChatMessage::new(MessageId(id), "lobby", author, "hello", "9:5")
    }

    #[tokio::test]
    async fn test_emit_reaches_peer() {
        let (local, mut peer) = tokio::io::duplex(4096);
        let (channel, _inbox) = SocketChannel::attach(local);

        channel.emit(Event::DeleteMessage(MessageId(4))).unwrap();

        let event = read_frame(&mut peer).await.unwrap();
        assert_eq!(event, Event::DeleteMessage(MessageId(4)));
    }

    #[tokio::test]
    async fn test_peer_events_arrive_in_order() {
        let (local, mut peer) = tokio::io::duplex(4096);
        let (_channel, mut inbox) = SocketChannel::attach(local);

        write_frame(&mut peer, &Event::ReceiveMessage(msg(1, "bob"))).await.unwrap();
        write_frame(&mut peer, &Event::DeleteMessage(MessageId(1))).await.unwrap();

        assert_eq!(inbox.next_event().await, Some(Event::ReceiveMessage(msg(1, "bob"))));
        assert_eq!(inbox.next_event().await, Some(Event::DeleteMessage(MessageId(1))));
        assert_eq!(inbox.try_next_event(), None);
    }

    #[tokio::test]
    async fn test_malformed_event_does_not_close_inbox() {
        let (local, mut peer) = tokio::io::duplex(4096);
        let (_channel, mut inbox) = SocketChannel::attach(local);

        write_raw_frame(&mut peer, br#"{"event":"delete_message"}"#).await.unwrap();
        write_frame(&mut peer, &Event::DeleteMessage(MessageId(9))).await.unwrap();

        assert_eq!(inbox.next_event().await, Some(Event::DeleteMessage(MessageId(9))));
    }

    #[tokio::test]
    async fn test_inbox_ends_when_peer_hangs_up() {
        let (local, peer) = tokio::io::duplex(4096);
        let (_channel, mut inbox) = SocketChannel::attach(local);

        drop(peer);
        assert_eq!(inbox.next_event().await, None);
    }

    #[tokio::test]
    async fn test_deliver_runs_listeners() {
        let (local, _peer) = tokio::io::duplex(4096);
        let (channel, _inbox) = SocketChannel::attach(local);

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = channel.on(EventName::DeleteMessage, Box::new(move |_| h.set(h.get() + 1)));

        assert_eq!(channel.deliver(&Event::DeleteMessage(MessageId(1))), 1);
        assert!(channel.off(id));
        assert_eq!(channel.deliver(&Event::DeleteMessage(MessageId(1))), 0);
        assert_eq!(hits.get(), 1);
    }

    #[tokio::test]
    async fn test_chat_view_over_socket() {
        let (local, mut peer) = tokio::io::duplex(4096);
        let (channel, mut inbox) = SocketChannel::attach(local);
        let channel = Rc::new(channel);
        let mut view = ChatView::new(channel.clone(), "alice", "lobby");

        view.update_draft("hi");
        let id = view.submit().unwrap();

        match read_frame(&mut peer).await.unwrap() {
            Event::SendMessage(m) => {
                assert_eq!(m.id, id);
                assert_eq!(m.author, "alice");
                assert_eq!(m.text, "hi");
            }
            other => panic!("Wrong event: {:?}", other),
        }

        write_frame(&mut peer, &Event::ReceiveMessage(msg(2, "bob"))).await.unwrap();
        let event = inbox.next_event().await.unwrap();
        channel.deliver(&event);

        let authors: Vec<String> = view.messages().iter().map(|m| m.author.clone()).collect();
        assert_eq!(authors, vec!["alice", "bob"]);
    }
}
