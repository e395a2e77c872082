use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    queue_service::QueueService,
    types::{AppError, ValidatedJson},
};

/// Request body for enqueueing a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message text handed to the processor job
    #[validate(length(min = 1, max = 65536, message = "invalid_message_length"))]
    pub message: String,
}

/// Response body for an accepted message
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    /// Queue-assigned message ID
    pub message_id: String,
}

/// Enqueues a message for the processor job
///
/// # Errors
///
/// Returns `AppError` with status 503 if the queue rejects the message
#[instrument(skip(queue_service, payload))]
pub async fn send_message(
    Extension(queue_service): Extension<Arc<QueueService>>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), AppError> {
    let message_id = queue_service.send_message(&payload.message).await?;

    Ok((StatusCode::ACCEPTED, Json(SendMessageResponse { message_id })))
}
