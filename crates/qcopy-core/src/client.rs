//! The queue service contract consumed by the copier.

use crate::copier::BatchSize;
use async_trait::async_trait;
use std::fmt;

/// One delivery pulled from a queue.
///
/// The receipt handle proves this specific delivery. It stays valid only
/// until the queue's visibility timeout expires or the message is deleted;
/// a redelivered message carries a new handle.
#[derive(Clone, Debug)]
pub struct ReceivedMessage {
    /// The message content, passed on unmodified
    pub body: String,
    /// Handle required to delete this delivery from its queue
    pub receipt_handle: String,
}

#[derive(Debug)]
pub enum CopyError {
    ClientInitialization(String),
    QueueNotFound(String),
    Receive(String),
    Forward(String),
    Delete(String),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::ClientInitialization(msg) => {
                write!(f, "failed to initialize queue client: {}", msg)
            }
            CopyError::QueueNotFound(name) => write!(f, "queue could not be resolved: {}", name),
            CopyError::Receive(msg) => write!(f, "failed to receive messages: {}", msg),
            CopyError::Forward(msg) => {
                write!(f, "failed to forward message to destination: {}", msg)
            }
            CopyError::Delete(msg) => write!(f, "failed to delete message from source: {}", msg),
        }
    }
}

impl std::error::Error for CopyError {}

/// Operations the copier needs from a queue service.
///
/// Implemented by [`SqsQueueClient`](crate::SqsQueueClient) for real queues
/// and by [`InMemory`](crate::InMemory) for tests; the copier takes either
/// through this trait at construction.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Resolves a queue name to an addressable queue URL.
    async fn resolve_queue_url(&self, name: &str) -> Result<String, CopyError>;

    /// Pulls up to `max_messages` messages from a queue. The service may
    /// return fewer than requested; an empty batch means the queue is
    /// currently empty.
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: BatchSize,
    ) -> Result<Vec<ReceivedMessage>, CopyError>;

    /// Sends a message body, verbatim, to a queue.
    async fn send(&self, queue_url: &str, body: &str) -> Result<(), CopyError>;

    /// Deletes one delivery from a queue using its receipt handle.
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), CopyError>;
}
