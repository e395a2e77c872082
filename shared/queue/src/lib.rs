//! Message queue integration for the queue jobs workspace
//!
//! This crate provides the [`QueueClient`] abstraction consumed by the processor job and the
//! frontend, together with an SQS-backed implementation and, behind the `test-utils`
//! feature, an in-memory queue that models visibility timeouts and receipts.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Queue client abstraction
pub mod client;
/// Error types for queue operations
pub mod error;
/// In-memory queue used by tests
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
/// SQS queue implementation
pub mod sqs_queue;
/// Common types for queue operations
pub mod types;

pub use client::QueueClient;
pub use error::{QueueError, QueueResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryQueue;
pub use sqs_queue::SqsQueue;
pub use types::{QueueConfig, QueueMessage};
