//! Record store contract
//!
//! The importer only needs [`RecordStore::create`]. Handlers additionally
//! read forms and leads through [`CampaignDirectory`], which also hands out
//! per-table store handles.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Form, Lead, User, ValidatedRecord};

/// Result of one store write
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Persisted record, including server-assigned fields
    Created(serde_json::Value),
    /// Uniqueness constraint violated; message names the offending field
    Conflict(String),
    /// Network, timeout or server failure
    StoreError(String),
}

/// Write side of the record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, record: &ValidatedRecord) -> CreateOutcome;
}

/// Record store read failure
#[derive(Debug, Error)]
pub enum StoreReadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Record store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid record store response: {0}")]
    Decode(String),
}

/// Campaign data access used by the HTTP layer
#[async_trait]
pub trait CampaignDirectory: Send + Sync {
    async fn all_users(&self) -> Result<Vec<User>, StoreReadError>;

    async fn all_forms(&self) -> Result<Vec<Form>, StoreReadError>;

    async fn all_leads(&self) -> Result<Vec<Lead>, StoreReadError>;

    async fn form_by_id(&self, form_id: Uuid) -> Result<Option<Form>, StoreReadError>;

    /// Leads matching the given ids (unknown ids are simply absent)
    async fn leads_by_ids(&self, lead_ids: &[Uuid]) -> Result<Vec<Lead>, StoreReadError>;

    async fn leads_by_form(&self, form_id: Uuid) -> Result<Vec<Lead>, StoreReadError>;

    /// Store handle for the users table
    fn users(&self) -> Arc<dyn RecordStore>;

    /// Store handle for the forms table
    fn forms(&self) -> Arc<dyn RecordStore>;

    /// Store handle for leads, with `form_id` attached to every record
    fn leads_for_form(&self, form_id: Uuid) -> Arc<dyn RecordStore>;
}
