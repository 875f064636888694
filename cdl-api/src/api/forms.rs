//! Campaign form endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::require_text;
use super::responses::{DispatchResponse, FormInfo, ImportResponse};
use super::upload::import_upload;
use crate::models::{Form, Lead, NewForm, FORM_SCHEMA, LEAD_SCHEMA};
use crate::services::{BatchImporter, CreateOutcome};
use crate::{ApiError, ApiResult, AppState};

/// POST /forms/:form_id/send-messages request body
#[derive(Debug, Deserialize)]
pub struct FormMessageRequest {
    pub text: String,
}

/// Fetch a form or answer 404
pub(crate) async fn require_form(state: &AppState, form_id: Uuid) -> ApiResult<Form> {
    state
        .directory
        .form_by_id(form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Form {} not found", form_id)))
}

/// Map a single-record store outcome to an HTTP result
pub(crate) fn created_or_error(outcome: CreateOutcome) -> ApiResult<(StatusCode, Json<Value>)> {
    match outcome {
        CreateOutcome::Created(record) => Ok((StatusCode::CREATED, Json(record))),
        CreateOutcome::Conflict(reason) => Err(ApiError::Conflict(reason)),
        CreateOutcome::StoreError(reason) => Err(ApiError::Upstream(StatusCode::BAD_GATEWAY, reason)),
    }
}

/// GET /forms
pub async fn list_forms(State(state): State<AppState>) -> ApiResult<Json<Vec<Form>>> {
    Ok(Json(state.directory.all_forms().await?))
}

/// POST /forms
pub async fn create_form(
    State(state): State<AppState>,
    Json(request): Json<NewForm>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut records = BatchImporter::validate_batch(&[request.to_raw_row()], &FORM_SCHEMA)?;
    let record = records.remove(0);

    let outcome = state.directory.forms().create(&record).await;
    created_or_error(outcome)
}

/// GET /forms/:form_id
pub async fn get_form(State(state): State<AppState>, Path(form_id): Path<Uuid>) -> ApiResult<Json<Form>> {
    Ok(Json(require_form(&state, form_id).await?))
}

/// GET /forms/:form_id/leads
pub async fn list_form_leads(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Lead>>> {
    require_form(&state, form_id).await?;
    Ok(Json(state.directory.leads_by_form(form_id).await?))
}

/// POST /forms/:form_id/leads/upload-csv
pub async fn upload_leads_csv(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    require_form(&state, form_id).await?;

    let store = state.directory.leads_for_form(form_id);
    import_upload(&state, multipart, &LEAD_SCHEMA, store.as_ref(), "leads").await
}

/// POST /forms/:form_id/send-messages
///
/// Sends `text` to every lead of the form.
pub async fn send_to_form_leads(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(request): Json<FormMessageRequest>,
) -> ApiResult<Json<DispatchResponse>> {
    require_text(&request.text)?;
    let form = require_form(&state, form_id).await?;

    let leads = state.directory.leads_by_form(form_id).await?;
    if leads.is_empty() {
        return Err(ApiError::NotFound("No leads found for this form".to_string()));
    }

    let lead_ids: Vec<Uuid> = leads.iter().map(|lead| lead.id).collect();
    let report = state
        .dispatcher
        .dispatch_for_leads(
            &lead_ids,
            |id| leads.iter().find(|lead| lead.id == *id).map(|lead| lead.phone.clone()),
            &request.text,
            state.gateway.as_ref(),
            &state.shutdown.child_token(),
        )
        .await?;

    info!(
        form_id = %form_id,
        total = report.total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Form dispatch completed"
    );

    let form_info = FormInfo::new(&form, leads.len());
    Ok(Json(
        DispatchResponse::new(report, "Messages sent to form leads").with_form(form_info),
    ))
}

/// Build form routes
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/forms", get(list_forms).post(create_form))
        .route("/forms/:form_id", get(get_form))
        .route("/forms/:form_id/leads", get(list_form_leads))
        .route("/forms/:form_id/leads/upload-csv", post(upload_leads_csv))
        .route("/forms/:form_id/send-messages", post(send_to_form_leads))
}
