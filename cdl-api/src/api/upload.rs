//! Multipart CSV upload extraction

use axum::{extract::Multipart, http::StatusCode, Json};
use tracing::{debug, info};

use super::responses::ImportResponse;
use crate::models::FieldSchema;
use crate::services::{decode_rows, RecordStore};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the spreadsheet
pub const FILE_FIELD: &str = "file";

/// Read the `file` field of a multipart upload as UTF-8 CSV text
pub async fn read_csv_upload(mut multipart: Multipart) -> ApiResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(ApiError::BadRequest("File must be a CSV".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        debug!(file_name = %file_name, size = bytes.len(), "CSV upload received");

        return String::from_utf8(bytes.to_vec()).map_err(|_| {
            ApiError::BadRequest("File encoding error. Please ensure CSV is UTF-8 encoded".to_string())
        });
    }

    Err(ApiError::BadRequest(format!("Missing '{}' field", FILE_FIELD)))
}

/// Decode an uploaded sheet and import it through `store`
pub(crate) async fn import_upload(
    state: &AppState,
    multipart: Multipart,
    schema: &FieldSchema,
    store: &dyn RecordStore,
    noun: &str,
) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    let content = read_csv_upload(multipart).await?;
    let rows = decode_rows(&content, schema.required)?;

    let report = state
        .importer
        .import_batch(&rows, schema, store, &state.shutdown.child_token())
        .await?;

    info!(
        kind = schema.kind,
        total = report.total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        not_attempted = report.not_attempted.len(),
        "CSV import completed"
    );

    Ok((StatusCode::CREATED, Json(ImportResponse::new(report, noun))))
}
