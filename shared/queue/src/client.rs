use std::time::Duration;

use crate::{QueueMessage, QueueResult};

/// Client for a queue with at-least-once delivery and visibility timeouts
///
/// Received messages stay hidden from other receivers for the visibility timeout. A message
/// that is not deleted within that window becomes receivable again. Callers cancel an
/// in-flight operation by dropping its future.
#[async_trait::async_trait]
pub trait QueueClient: Send + Sync {
    /// Receives up to `max_messages` messages, hiding them for `visibility_timeout`
    ///
    /// Returns an empty vector when no message is currently visible.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the queue cannot be reached
    async fn receive_messages(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>>;

    /// Deletes the delivery identified by `message_id` and `receipt_handle`
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ReceiptInvalid` if the receipt is stale or unknown, or another
    /// `QueueError` if the queue cannot be reached
    async fn delete_message(&self, message_id: &str, receipt_handle: &str) -> QueueResult<()>;

    /// Sends a message and returns its message ID
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the send operation fails
    async fn send_message(&self, body: &str) -> QueueResult<String>;
}
