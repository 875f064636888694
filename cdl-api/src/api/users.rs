//! Contact endpoints

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::responses::ImportResponse;
use super::upload::import_upload;
use crate::models::{User, USER_SCHEMA};
use crate::{ApiResult, AppState};

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.directory.all_users().await?))
}

/// POST /users/upload-csv
///
/// Multipart `file` field with `first_name` and `phone` columns. Any invalid
/// row rejects the whole sheet; store failures are reported per contact.
pub async fn upload_users_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    let store = state.directory.users();
    import_upload(&state, multipart, &USER_SCHEMA, store.as_ref(), "contacts").await
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/upload-csv", post(upload_users_csv))
}
