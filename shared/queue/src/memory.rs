//! In-memory queue with visibility timeout semantics
//!
//! Timing uses `tokio::time`, so tests running on a paused clock control redelivery by
//! advancing virtual time.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

use crate::{
    client::QueueClient,
    error::{QueueError, QueueResult},
    types::QueueMessage,
};

#[derive(Debug)]
struct StoredMessage {
    message_id: String,
    body: String,
    receive_count: u32,
    invisible_until: Option<Instant>,
    receipt_handle: Option<String>,
}

impl StoredMessage {
    fn is_visible(&self, now: Instant) -> bool {
        self.invisible_until.is_none_or(|until| until <= now)
    }
}

/// Queue held in process memory
///
/// Receipts are issued per delivery. A receipt stops being valid when the message is
/// deleted, when the visibility timeout elapses, or when the message is received again.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    messages: Mutex<Vec<StoredMessage>>,
    unavailable: AtomicBool,
}

impl InMemoryQueue {
    /// Creates an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `QueueError::Unavailable` while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of messages stored, visible or not
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Whether the queue holds no messages at all
    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }

    /// Bodies of all stored messages in enqueue order
    pub async fn bodies(&self) -> Vec<String> {
        self.messages
            .lock()
            .await
            .iter()
            .map(|m| m.body.clone())
            .collect()
    }

    fn ensure_available(&self) -> QueueResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable(
                "in-memory queue marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl QueueClient for InMemoryQueue {
    async fn receive_messages(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        self.ensure_available()?;

        let now = Instant::now();
        let limit = usize::try_from(max_messages).unwrap_or(usize::MAX);
        let mut messages = self.messages.lock().await;

        let received = messages
            .iter_mut()
            .filter(|m| m.is_visible(now))
            .take(limit)
            .map(|m| {
                let receipt_handle = Uuid::new_v4().to_string();
                m.receive_count += 1;
                m.invisible_until = Some(now + visibility_timeout);
                m.receipt_handle = Some(receipt_handle.clone());

                QueueMessage {
                    message_id: m.message_id.clone(),
                    receipt_handle,
                    body: m.body.clone(),
                    receive_count: m.receive_count,
                }
            })
            .collect();

        Ok(received)
    }

    async fn delete_message(&self, message_id: &str, receipt_handle: &str) -> QueueResult<()> {
        self.ensure_available()?;

        let now = Instant::now();
        let mut messages = self.messages.lock().await;

        let position = messages.iter().position(|m| {
            m.message_id == message_id
                && m.receipt_handle.as_deref() == Some(receipt_handle)
                && !m.is_visible(now)
        });

        match position {
            Some(index) => {
                messages.remove(index);
                Ok(())
            }
            None => Err(QueueError::ReceiptInvalid {
                message_id: message_id.to_string(),
            }),
        }
    }

    async fn send_message(&self, body: &str) -> QueueResult<String> {
        self.ensure_available()?;

        let message_id = Uuid::new_v4().to_string();
        self.messages.lock().await.push(StoredMessage {
            message_id: message_id.clone(),
            body: body.to_string(),
            receive_count: 0,
            invisible_until: None,
            receipt_handle: None,
        });

        Ok(message_id)
    }
}
