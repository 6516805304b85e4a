//! # qcopy-core
//!
//! Core library for copying messages between AWS SQS queues.
//!
//! The copy loop pulls a bounded batch of messages from a source queue,
//! replays each body verbatim onto a destination queue, and can delete the
//! original from the source once its copy has been accepted. The loop ends
//! when a receive call comes back empty.
//!
//! ## Features
//!
//! - **Queue Resolution**: turn human-readable queue names into queue URLs
//! - **Sequential Copying**: one message in flight at a time, in receipt order
//! - **Optional Source Cleanup**: delete-after-copy with at-least-once semantics
//!
//! ## Example
//!
//! ```no_run
//! use qcopy::{Copier, CopyJob, SqsQueueClient};
//!
//! # async fn example() -> Result<(), qcopy::CopyError> {
//! // Credentials come from the process environment.
//! let client = SqsQueueClient::from_env("eu-central-1").await?;
//!
//! let job = CopyJob::new("orders", "orders-replay");
//! let summary = Copier::new(client).run(&job).await?;
//!
//! println!("copied {} messages", summary.copied);
//! # Ok(())
//! # }
//! ```

mod client;
mod copier;
mod inmemory;
mod sqs;

pub use client::*;
pub use copier::*;
pub use inmemory::*;
pub use sqs::*;
