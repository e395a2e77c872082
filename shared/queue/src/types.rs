/// A message received from the queue, valid for a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Message ID, stable across redeliveries of the same message
    pub message_id: String,
    /// Receipt handle for deleting this delivery
    ///
    /// Becomes invalid once the message is deleted or its visibility timeout expires.
    pub receipt_handle: String,
    /// The message body
    pub body: String,
    /// Number of times the message has been received, including this delivery
    pub receive_count: u32,
}

impl QueueMessage {
    /// Whether this delivery is a redelivery of a message that was received before
    #[must_use]
    pub const fn is_redelivery(&self) -> bool {
        self.receive_count > 1
    }
}

/// Configuration for queue operations
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue URL
    pub queue_url: String,
    /// Wait time for long polling (in seconds), 0 disables long polling
    pub wait_time_seconds: i32,
}
