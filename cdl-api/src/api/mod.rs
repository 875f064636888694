//! HTTP API handlers for cdl-api

pub mod forms;
pub mod health;
pub mod leads;
pub mod messages;
pub mod responses;
pub mod upload;
pub mod users;

pub use forms::form_routes;
pub use health::health_routes;
pub use leads::lead_routes;
pub use messages::message_routes;
pub use users::user_routes;

use crate::{ApiError, ApiResult};

/// Reject blank message text before any send is attempted
pub(crate) fn require_text(text: &str) -> ApiResult<()> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("text cannot be empty".to_string()));
    }
    Ok(())
}
