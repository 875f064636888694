//! Supabase (PostgREST) record store client
//!
//! Writes go to `POST /rest/v1/{table}` with `Prefer: return=representation`
//! so the stored row (with its server-assigned `id` and timestamps) comes
//! back in the response.
//!
//! # Conflict detection
//! PostgREST forwards PostgreSQL error objects:
//! ```json
//! {"code": "23505", "details": "Key (phone)=(27999990000) already exists.",
//!  "message": "duplicate key value violates unique constraint \"users_phone_key\""}
//! ```
//! A unique violation is recognized by its SQLSTATE code (`23505`), and the
//! offending field is taken from the constraint name. A bare 409 without an
//! error code is also treated as a conflict. Other 409s (foreign key
//! violations, `23503`) are store errors.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::record_store::{CampaignDirectory, CreateOutcome, RecordStore, StoreReadError};
use crate::config::SupabaseConfig;
use crate::models::{FieldValue, Form, Lead, User, ValidatedRecord};

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Listing order for full-table reads
const OLDEST_FIRST: &str = "created_at.asc";

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Supabase REST client
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_url: String,
    key: String,
}

impl SupabaseClient {
    pub fn new(http: Client, config: &SupabaseConfig) -> Self {
        Self {
            http,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            key: config.key.clone(),
        }
    }

    /// Store handle for `table`
    pub fn table(&self, table: &'static str) -> SupabaseTable {
        SupabaseTable {
            client: self.clone(),
            table,
            fixed: ValidatedRecord::new(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", self.key.as_str())
            .bearer_auth(&self.key)
    }

    /// Insert one row and classify the response
    pub async fn insert(&self, table: &str, body: &Value) -> CreateOutcome {
        debug!(table, "POST record");

        let response = match self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(table, error = %e, "Record store request failed");
                return CreateOutcome::StoreError(format!("Network error: {}", e));
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            return match stored_row(&text) {
                Some(row) => CreateOutcome::Created(row),
                None => {
                    warn!(table, status = status.as_u16(), body = %text, "Insert returned no stored row");
                    CreateOutcome::StoreError("Record store returned an empty representation".to_string())
                }
            };
        }

        warn!(table, status = status.as_u16(), body = %text, "Record store rejected insert");
        classify_failure(status.as_u16(), &text, table, body)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreReadError> {
        debug!(table, ?filters, "GET records");

        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await
            .map_err(|e| StoreReadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreReadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreReadError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CampaignDirectory for SupabaseClient {
    async fn all_users(&self) -> Result<Vec<User>, StoreReadError> {
        self.select("users", &[("order", OLDEST_FIRST.to_string())]).await
    }

    async fn all_forms(&self) -> Result<Vec<Form>, StoreReadError> {
        self.select("forms", &[("order", OLDEST_FIRST.to_string())]).await
    }

    async fn all_leads(&self) -> Result<Vec<Lead>, StoreReadError> {
        self.select("leads", &[("order", OLDEST_FIRST.to_string())]).await
    }

    async fn form_by_id(&self, form_id: Uuid) -> Result<Option<Form>, StoreReadError> {
        let forms: Vec<Form> = self.select("forms", &[("id", format!("eq.{}", form_id))]).await?;
        Ok(forms.into_iter().next())
    }

    async fn leads_by_ids(&self, lead_ids: &[Uuid]) -> Result<Vec<Lead>, StoreReadError> {
        if lead_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = lead_ids.iter().map(Uuid::to_string).collect();
        self.select("leads", &[("id", format!("in.({})", ids.join(",")))]).await
    }

    async fn leads_by_form(&self, form_id: Uuid) -> Result<Vec<Lead>, StoreReadError> {
        self.select(
            "leads",
            &[("form_id", format!("eq.{}", form_id)), ("order", OLDEST_FIRST.to_string())],
        )
        .await
    }

    fn users(&self) -> Arc<dyn RecordStore> {
        Arc::new(self.table("users"))
    }

    fn forms(&self) -> Arc<dyn RecordStore> {
        Arc::new(self.table("forms"))
    }

    fn leads_for_form(&self, form_id: Uuid) -> Arc<dyn RecordStore> {
        Arc::new(self.table("leads").with_field("form_id", form_id.to_string()))
    }
}

/// One table of the record store, optionally with fields fixed on every insert
#[derive(Clone)]
pub struct SupabaseTable {
    client: SupabaseClient,
    table: &'static str,
    fixed: ValidatedRecord,
}

impl SupabaseTable {
    /// Attach `name = value` to every record written through this handle
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fixed.insert(name.to_string(), value.into());
        self
    }
}

#[async_trait]
impl RecordStore for SupabaseTable {
    async fn create(&self, record: &ValidatedRecord) -> CreateOutcome {
        let mut merged = record.clone();
        merged.extend(self.fixed.iter().map(|(k, v)| (k.clone(), v.clone())));

        match serde_json::to_value(&merged) {
            Ok(body) => self.client.insert(self.table, &body).await,
            Err(e) => CreateOutcome::StoreError(format!("Serialize record failed: {}", e)),
        }
    }
}

/// First row of a `return=representation` body, if it is an object
fn stored_row(body: &str) -> Option<Value> {
    let row = match serde_json::from_str::<Value>(body).ok()? {
        Value::Array(rows) => rows.into_iter().next()?,
        row => row,
    };
    row.is_object().then_some(row)
}

/// Map a non-success insert response to Conflict or StoreError
fn classify_failure(status: u16, body: &str, table: &str, record: &Value) -> CreateOutcome {
    let error: PostgrestError = serde_json::from_str(body).unwrap_or_default();

    let unique_violation = match error.code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION,
        None => status == 409,
    };

    if unique_violation {
        return CreateOutcome::Conflict(conflict_reason(table, error.message.as_deref(), record));
    }

    let message = match error.message.filter(|m| !m.trim().is_empty()) {
        Some(message) => message,
        None if body.trim().is_empty() => "empty response".to_string(),
        None => body.trim().to_string(),
    };
    CreateOutcome::StoreError(format!("HTTP {}: {}", status, message))
}

fn conflict_reason(table: &str, message: Option<&str>, record: &Value) -> String {
    let kind = record_kind(table);

    match message.and_then(|m| constraint_field(m, table)) {
        Some(field) => match record.get(&field).and_then(display_value) {
            Some(value) => format!("{} with {} {} already exists", kind, field, value),
            None => format!("{} with this {} already exists", kind, field),
        },
        None => format!("{} already exists", kind),
    }
}

/// Extract `phone` from `... constraint "users_phone_key"`
fn constraint_field(message: &str, table: &str) -> Option<String> {
    let start = message.find('"')? + 1;
    let end = start + message[start..].find('"')?;

    let field = message[start..end]
        .strip_prefix(table)?
        .strip_prefix('_')?
        .strip_suffix("_key")?;

    (!field.is_empty()).then(|| field.to_string())
}

/// "users" → "User"
fn record_kind(table: &str) -> String {
    let singular = table.strip_suffix('s').unwrap_or(table);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
