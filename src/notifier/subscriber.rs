//! Subscriber transports

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors a subscriber transport can report on send
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("subscriber transport is closed")]
    Closed,

    #[error("subscriber buffer is full")]
    Full,
}

/// A connected listener
///
/// Implemented by whatever carries events to a client (a websocket writer
/// task, a server-sent-events stream, a test channel).
pub trait Subscriber: Send + Sync {
    /// Whether a send is still worth attempting
    fn is_open(&self) -> bool;

    /// Queues one text event without waiting on the listener
    fn send_text(&self, text: &str) -> Result<(), NotifyError>;
}

/// Subscriber backed by a bounded tokio channel
///
/// The receiving half goes to the task that owns the client connection;
/// dropping it marks this subscriber closed.
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    sender: mpsc::Sender<String>,
}

impl ChannelSubscriber {
    /// Creates a subscriber and the receiver its events arrive on
    pub fn open(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl Subscriber for ChannelSubscriber {
    fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        self.sender.try_send(text.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotifyError::Full,
            mpsc::error::TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}
