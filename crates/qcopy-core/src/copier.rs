use crate::client::{CopyError, QueueClient};

/// Messages requested per receive call.
///
/// The queue service accepts 1-10 messages per request. The default of 1
/// keeps delivery strictly ordered: exactly one message is in flight between
/// a receive and its delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSize(i32);

impl BatchSize {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 10;

    pub fn new(value: i32) -> Result<Self, String> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(format!(
                "batch size must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(1)
    }
}

/// Run-time parameters for one copy run. Built once, immutable while the
/// copier runs.
#[derive(Clone, Debug)]
pub struct CopyJob {
    /// Name of the queue messages are read from
    pub source_queue: String,
    /// Name of the queue message bodies are replayed onto
    pub dest_queue: String,
    /// Remove each message from the source once its copy has been accepted
    pub delete_after_copy: bool,
    /// Upper bound on messages pulled per receive call
    pub max_messages_per_receive: BatchSize,
}

impl CopyJob {
    /// A job that copies without deleting, one message per receive.
    pub fn new(source_queue: impl Into<String>, dest_queue: impl Into<String>) -> Self {
        Self {
            source_queue: source_queue.into(),
            dest_queue: dest_queue.into(),
            delete_after_copy: false,
            max_messages_per_receive: BatchSize::default(),
        }
    }
}

/// Counters reported by a completed run.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct CopySummary {
    /// Non-empty batches received from the source
    pub batches: u64,
    /// Messages forwarded to the destination
    pub copied: u64,
    /// Messages removed from the source
    pub deleted: u64,
    /// Deletes that were rejected; those messages may reappear and be copied again
    pub delete_failures: u64,
}

/// Hooks into the copy loop.
///
/// The loop itself stays free of formatting concerns; implementations decide
/// what to do with each event. Every method defaults to a no-op.
pub trait CopyObserver: Send + Sync {
    fn batch_received(&self, _count: usize) {}
    fn message_forwarded(&self, _body: &str) {}
    fn message_deleted(&self, _receipt_handle: &str) {}
    fn delete_failed(&self, _receipt_handle: &str, _error: &CopyError) {}
}

/// Observer that reports copy progress through the `log` facade.
pub struct LogObserver;

impl CopyObserver for LogObserver {
    fn batch_received(&self, count: usize) {
        log::debug!("received batch of {count} message(s)");
    }

    fn message_forwarded(&self, body: &str) {
        log::info!("copied message: {body}");
    }

    fn message_deleted(&self, _receipt_handle: &str) {
        log::info!("removed message from source queue");
    }

    fn delete_failed(&self, receipt_handle: &str, error: &CopyError) {
        log::warn!("could not delete {receipt_handle}: {error}; the message may be copied again");
    }
}

/// Drives the copy loop against a [`QueueClient`].
pub struct Copier<C> {
    client: C,
    observer: Box<dyn CopyObserver>,
}

impl<C: QueueClient> Copier<C> {
    /// Events go to [`LogObserver`] unless
    /// [`with_observer`](Self::with_observer) replaces it.
    pub fn new(client: C) -> Self {
        Self {
            client,
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl CopyObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Copies every message currently readable from the source queue onto
    /// the destination queue.
    ///
    /// Messages are forwarded one at a time in receipt order; the run ends
    /// normally as soon as a receive call comes back empty. A rejected send
    /// aborts the whole run with no retry and no partial skip. A rejected
    /// delete is reported to the observer and the loop moves on, leaving the
    /// message to reappear after the source queue's visibility timeout.
    pub async fn run(&self, job: &CopyJob) -> Result<CopySummary, CopyError> {
        let source = self.client.resolve_queue_url(&job.source_queue).await?;
        let dest = self.client.resolve_queue_url(&job.dest_queue).await?;

        let mut summary = CopySummary::default();

        loop {
            let messages = self
                .client
                .receive(&source, job.max_messages_per_receive)
                .await?;

            if messages.is_empty() {
                return Ok(summary);
            }

            summary.batches += 1;
            self.observer.batch_received(messages.len());

            for message in messages {
                self.client.send(&dest, &message.body).await?;
                self.observer.message_forwarded(&message.body);
                summary.copied += 1;

                if job.delete_after_copy {
                    match self.client.delete(&source, &message.receipt_handle).await {
                        Ok(()) => {
                            self.observer.message_deleted(&message.receipt_handle);
                            summary.deleted += 1;
                        }
                        Err(e) => {
                            self.observer.delete_failed(&message.receipt_handle, &e);
                            summary.delete_failures += 1;
                        }
                    }
                }
            }
        }
    }
}
