//! SQS queue implementation
//!
//! Message bodies are passed through as plain strings; this module does not impose any
//! encoding on them.

use std::{sync::Arc, time::Duration};

use aws_sdk_sqs::{
    operation::delete_message::DeleteMessageError, types::MessageSystemAttributeName,
    Client as SqsClient,
};
use tracing::debug;

use crate::{
    client::QueueClient,
    error::{QueueError, QueueResult},
    types::{QueueConfig, QueueMessage},
};

/// Maximum number of messages SQS returns from a single receive call
const SQS_MAX_MESSAGES: i32 = 10;
/// Maximum visibility timeout SQS accepts (12 hours)
const SQS_MAX_VISIBILITY_TIMEOUT_SECS: i32 = 43_200;

/// Standard SQS queue
pub struct SqsQueue {
    sqs_client: Arc<SqsClient>,
    config: QueueConfig,
}

impl SqsQueue {
    /// Creates a new SQS queue
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    /// * `config` - Queue configuration including URL and long polling settings
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>, config: QueueConfig) -> Self {
        Self { sqs_client, config }
    }

    /// Returns the URL of the underlying queue
    #[must_use]
    pub fn queue_url(&self) -> &str {
        &self.config.queue_url
    }
}

#[async_trait::async_trait]
impl QueueClient for SqsQueue {
    async fn receive_messages(
        &self,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        let max_messages =
            i32::try_from(max_messages).map_or(SQS_MAX_MESSAGES, |m| m.clamp(1, SQS_MAX_MESSAGES));
        let visibility_timeout = i32::try_from(visibility_timeout.as_secs())
            .map_or(SQS_MAX_VISIBILITY_TIMEOUT_SECS, |s| {
                s.min(SQS_MAX_VISIBILITY_TIMEOUT_SECS)
            });

        let result = self
            .sqs_client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(max_messages)
            .visibility_timeout(visibility_timeout)
            .wait_time_seconds(self.config.wait_time_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await?;

        let messages = result
            .messages()
            .iter()
            .filter_map(|msg| {
                let message_id = msg.message_id()?.to_string();
                let receipt_handle = msg.receipt_handle()?.to_string();
                let body = msg.body().unwrap_or_default().to_string();
                let receive_count = msg
                    .attributes()
                    .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
                    .and_then(|count| count.parse().ok())
                    .unwrap_or(1);

                Some(QueueMessage {
                    message_id,
                    receipt_handle,
                    body,
                    receive_count,
                })
            })
            .collect::<Vec<_>>();

        debug!(count = messages.len(), "Received messages from SQS");
        Ok(messages)
    }

    async fn delete_message(&self, message_id: &str, receipt_handle: &str) -> QueueResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(is_stale_receipt) {
                    QueueError::ReceiptInvalid {
                        message_id: message_id.to_string(),
                    }
                } else {
                    QueueError::from(err)
                }
            })?;

        debug!(message_id, "Deleted message from SQS");
        Ok(())
    }

    async fn send_message(&self, body: &str) -> QueueResult<String> {
        let result = self
            .sqs_client
            .send_message()
            .queue_url(&self.config.queue_url)
            .message_body(body)
            .send()
            .await?;

        let message_id = result
            .message_id()
            .map(std::string::ToString::to_string)
            .unwrap_or_default();

        debug!(%message_id, "Sent message to SQS");
        Ok(message_id)
    }
}

/// Whether SQS rejected the delete because of the receipt handle itself
fn is_stale_receipt(err: &DeleteMessageError) -> bool {
    err.is_receipt_handle_is_invalid() || err.is_invalid_id_format()
}
