//! WhatsApp message endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::require_text;
use super::responses::DispatchResponse;
use crate::models::GatewayAck;
use crate::services::GatewayError;
use crate::{ApiResult, AppState};

/// POST /messages/send request body
#[derive(Debug, Deserialize)]
pub struct SendTextRequest {
    pub number: String,
    pub text: String,
}

/// POST /messages/send-bulk request body
#[derive(Debug, Deserialize)]
pub struct SendBulkRequest {
    pub numbers: Vec<String>,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendTextResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: GatewayAck,
}

/// POST /messages/send
///
/// The number is passed to the gateway as given.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendTextRequest>,
) -> ApiResult<Json<SendTextResponse>> {
    require_text(&request.text)?;

    let timeout = state.pipeline.call_timeout();
    let ack = match tokio::time::timeout(timeout, state.gateway.send(&request.number, &request.text)).await {
        Ok(result) => result?,
        Err(_) => return Err(GatewayError::Timeout(timeout).into()),
    };

    Ok(Json(SendTextResponse {
        success: true,
        message: "Message sent successfully",
        data: ack,
    }))
}

/// POST /messages/send-bulk
///
/// Numbers are normalized to include the country code before sending.
pub async fn send_bulk_messages(
    State(state): State<AppState>,
    Json(request): Json<SendBulkRequest>,
) -> ApiResult<Json<DispatchResponse>> {
    require_text(&request.text)?;

    let report = state
        .dispatcher
        .dispatch(
            &request.numbers,
            &request.text,
            state.gateway.as_ref(),
            &state.shutdown.child_token(),
        )
        .await?;

    info!(
        total = report.total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Bulk dispatch completed"
    );

    Ok(Json(DispatchResponse::new(report, "Bulk message operation completed")))
}

/// Build message routes
pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages/send", post(send_message))
        .route("/messages/send-bulk", post(send_bulk_messages))
}
