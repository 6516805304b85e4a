//! In-memory queue service for tests and local pipelines.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::{CopyError, QueueClient, ReceivedMessage};
use crate::copier::BatchSize;

fn queue_url_for(name: &str) -> String {
    format!("inmem://{name}")
}

/// Queue client that keeps everything in memory.
///
/// Behaves like the real service at the contract level: a received message
/// moves in flight and is only gone once deleted by its receipt handle.
/// Clones share state, so a test can hold one handle for assertions while
/// the copier owns another.
#[derive(Clone, Default)]
pub struct InMemory {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    queues: HashMap<String, VecDeque<ReceivedMessage>>,
    in_flight: HashMap<String, Vec<ReceivedMessage>>,
    sent: HashMap<String, Vec<String>>,
    deleted: HashMap<String, Vec<String>>,
    fail_send_bodies: HashSet<String>,
    fail_delete_receipts: HashSet<String>,
    receive_calls: u64,
    send_seq: u64,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a queue seeded with `(body, receipt_handle)` pairs. A queue
    /// must be registered before its name resolves.
    pub fn with_queue(self, name: &str, messages: &[(&str, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let queue = messages
                .iter()
                .map(|(body, receipt_handle)| ReceivedMessage {
                    body: body.to_string(),
                    receipt_handle: receipt_handle.to_string(),
                })
                .collect();
            state.queues.insert(queue_url_for(name), queue);
        }
        self
    }

    /// Makes every send of this exact body fail.
    pub fn fail_send_of(&self, body: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_send_bodies
            .insert(body.to_string());
    }

    /// Makes the delete of this receipt handle fail.
    pub fn fail_delete_of(&self, receipt_handle: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_delete_receipts
            .insert(receipt_handle.to_string());
    }

    /// Bodies sent to the named queue, in send order.
    pub fn sent_to(&self, queue_name: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .sent
            .get(&queue_url_for(queue_name))
            .cloned()
            .unwrap_or_default()
    }

    /// Receipt handles deleted from the named queue, in delete order.
    pub fn deleted_from(&self, queue_name: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .deleted
            .get(&queue_url_for(queue_name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn receive_calls(&self) -> u64 {
        self.state.lock().unwrap().receive_calls
    }

    /// Puts every in-flight message back at the head of its queue, as if
    /// the visibility timeout had expired.
    pub fn redeliver(&self) {
        let mut state = self.state.lock().unwrap();
        let urls: Vec<String> = state.in_flight.keys().cloned().collect();
        for url in urls {
            let Some(mut flight) = state.in_flight.remove(&url) else {
                continue;
            };
            let queue = state.queues.entry(url).or_default();
            while let Some(message) = flight.pop() {
                queue.push_front(message);
            }
        }
    }
}

#[async_trait]
impl QueueClient for InMemory {
    async fn resolve_queue_url(&self, name: &str) -> Result<String, CopyError> {
        let url = queue_url_for(name);
        let state = self.state.lock().unwrap();
        if state.queues.contains_key(&url) {
            Ok(url)
        } else {
            Err(CopyError::QueueNotFound(name.to_string()))
        }
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: BatchSize,
    ) -> Result<Vec<ReceivedMessage>, CopyError> {
        let mut state = self.state.lock().unwrap();
        state.receive_calls += 1;

        let batch = {
            let queue = state
                .queues
                .get_mut(queue_url)
                .ok_or_else(|| CopyError::Receive(format!("unknown queue: {queue_url}")))?;

            let mut batch = Vec::new();
            while batch.len() < max_messages.get() as usize {
                match queue.pop_front() {
                    Some(message) => batch.push(message),
                    None => break,
                }
            }
            batch
        };

        state
            .in_flight
            .entry(queue_url.to_string())
            .or_default()
            .extend(batch.iter().cloned());

        Ok(batch)
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<(), CopyError> {
        let mut state = self.state.lock().unwrap();

        if state.fail_send_bodies.contains(body) {
            return Err(CopyError::Forward(format!(
                "send to {queue_url} was rejected"
            )));
        }

        state.send_seq += 1;
        let receipt_handle = format!("inmem-receipt-{}", state.send_seq);

        state
            .sent
            .entry(queue_url.to_string())
            .or_default()
            .push(body.to_string());

        // Sent messages become receivable in turn, like on a real queue.
        if let Some(queue) = state.queues.get_mut(queue_url) {
            queue.push_back(ReceivedMessage {
                body: body.to_string(),
                receipt_handle,
            });
        }

        Ok(())
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), CopyError> {
        let mut state = self.state.lock().unwrap();

        if state.fail_delete_receipts.contains(receipt_handle) {
            return Err(CopyError::Delete(format!(
                "delete of {receipt_handle} was rejected"
            )));
        }

        let removed = match state.in_flight.get_mut(queue_url) {
            Some(flight) => {
                match flight.iter().position(|m| m.receipt_handle == receipt_handle) {
                    Some(i) => {
                        flight.remove(i);
                        true
                    }
                    None => false,
                }
            }
            None => false,
        };

        if !removed {
            return Err(CopyError::Delete(format!(
                "unknown receipt handle: {receipt_handle}"
            )));
        }

        state
            .deleted
            .entry(queue_url.to_string())
            .or_default()
            .push(receipt_handle.to_string());

        Ok(())
    }
}
