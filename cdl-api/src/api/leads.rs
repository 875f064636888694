//! Lead endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::forms::{created_or_error, require_form};
use super::require_text;
use super::responses::DispatchResponse;
use crate::models::{Lead, NewLead, LEAD_SCHEMA};
use crate::services::BatchImporter;
use crate::{ApiError, ApiResult, AppState};

/// POST /leads/send-messages request body
#[derive(Debug, Deserialize)]
pub struct LeadMessageRequest {
    pub lead_ids: Vec<Uuid>,
    pub text: String,
}

/// GET /leads
pub async fn list_leads(State(state): State<AppState>) -> ApiResult<Json<Vec<Lead>>> {
    Ok(Json(state.directory.all_leads().await?))
}

/// POST /leads
pub async fn create_lead(
    State(state): State<AppState>,
    Json(request): Json<NewLead>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_form(&state, request.form_id).await?;

    let mut records = BatchImporter::validate_batch(&[request.to_raw_row()], &LEAD_SCHEMA)?;
    let record = records.remove(0);

    let outcome = state.directory.leads_for_form(request.form_id).create(&record).await;
    created_or_error(outcome)
}

/// POST /leads/send-messages
///
/// Ids that do not match a lead are reported as failed without a send.
pub async fn send_to_leads(
    State(state): State<AppState>,
    Json(request): Json<LeadMessageRequest>,
) -> ApiResult<Json<DispatchResponse>> {
    require_text(&request.text)?;

    let leads = state.directory.leads_by_ids(&request.lead_ids).await?;
    if leads.is_empty() {
        return Err(ApiError::NotFound("No leads found".to_string()));
    }

    let phones: HashMap<Uuid, String> = leads.into_iter().map(|lead| (lead.id, lead.phone)).collect();
    let report = state
        .dispatcher
        .dispatch_for_leads(
            &request.lead_ids,
            |id| phones.get(id).cloned(),
            &request.text,
            state.gateway.as_ref(),
            &state.shutdown.child_token(),
        )
        .await?;

    info!(
        total = report.total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Lead dispatch completed"
    );

    Ok(Json(DispatchResponse::new(report, "Messages sent to leads")))
}

/// Build lead routes
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads).post(create_lead))
        .route("/leads/send-messages", post(send_to_leads))
}
