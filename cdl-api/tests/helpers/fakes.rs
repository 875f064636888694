//! Mock collaborators for pipeline and router tests

use async_trait::async_trait;
use cdl_api::models::{Form, GatewayAck, Lead, RawRow, User, ValidatedRecord};
use cdl_api::services::{
    CampaignDirectory, CreateOutcome, GatewayError, MessageGateway, RecordStore, StoreReadError,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Build a raw row from (column, value) pairs
pub fn raw_row(cells: &[(&str, &str)]) -> RawRow {
    cells.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn user_row(first_name: &str, phone: &str) -> RawRow {
    raw_row(&[("first_name", first_name), ("phone", phone)])
}

/// Tracks concurrent calls and the highest concurrency observed
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory record store keyed by `phone` (or `title` for forms)
#[derive(Default)]
pub struct MockStore {
    calls: AtomicUsize,
    in_flight: InFlight,
    conflicts: HashSet<String>,
    errors: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    created: Mutex<Vec<ValidatedRecord>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conflict(mut self, key: &str) -> Self {
        self.conflicts.insert(key.to_string());
        self
    }

    pub fn with_error(mut self, key: &str) -> Self {
        self.errors.insert(key.to_string());
        self
    }

    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<ValidatedRecord> {
        self.created.lock().unwrap().clone()
    }

    fn key_of(record: &ValidatedRecord) -> String {
        record
            .get("phone")
            .or_else(|| record.get("title"))
            .and_then(|v| v.as_text())
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn create(&self, record: &ValidatedRecord) -> CreateOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.enter();

        let key = Self::key_of(record);
        if let Some(delay) = self.delays.get(&key).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }

        let outcome = if self.conflicts.contains(&key) {
            CreateOutcome::Conflict(format!("Record with key {} already exists", key))
        } else if self.errors.contains(&key) {
            CreateOutcome::StoreError("HTTP 500: internal error".to_string())
        } else {
            self.created.lock().unwrap().push(record.clone());
            let mut stored = serde_json::to_value(record).unwrap();
            stored["id"] = json!(call + 1);
            CreateOutcome::Created(stored)
        };

        self.in_flight.leave();
        outcome
    }
}

/// In-memory messaging gateway
#[derive(Default)]
pub struct MockGateway {
    calls: AtomicUsize,
    in_flight: InFlight,
    failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to `number` fail with HTTP `status`
    pub fn failing(mut self, number: &str, status: u16) -> Self {
        self.failures.insert(number.to_string(), status);
        self
    }

    pub fn with_delay(mut self, number: &str, delay: Duration) -> Self {
        self.delays.insert(number.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }

    /// Numbers sent to, in completion order
    pub fn sent_numbers(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

#[async_trait]
impl MessageGateway for MockGateway {
    async fn send(&self, number: &str, text: &str) -> Result<GatewayAck, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.enter();

        if let Some(delay) = self.delays.get(number).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }

        let result = match self.failures.get(number) {
            Some(status) => Err(GatewayError::Status {
                status: *status,
                body: "gateway rejected".to_string(),
            }),
            None => {
                self.sent.lock().unwrap().push((number.to_string(), text.to_string()));
                Ok(GatewayAck {
                    message_id: Some(format!("MSG{}", call + 1)),
                    status: Some("PENDING".to_string()),
                    timestamp: Some("1717689097".to_string()),
                })
            }
        };

        self.in_flight.leave();
        result
    }
}

/// In-memory campaign directory sharing one [`MockStore`] for every table
pub struct MockDirectory {
    pub store: Arc<MockStore>,
    users: Vec<User>,
    forms: Vec<Form>,
    leads: Vec<Lead>,
    lead_form_ids: Mutex<Vec<Uuid>>,
}

impl MockDirectory {
    pub fn new(store: MockStore) -> Self {
        Self {
            store: Arc::new(store),
            users: Vec::new(),
            forms: Vec::new(),
            leads: Vec::new(),
            lead_form_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.forms.push(form);
        self
    }

    pub fn with_lead(mut self, lead: Lead) -> Self {
        self.leads.push(lead);
        self
    }

    /// Form ids passed to `leads_for_form`
    pub fn lead_form_ids(&self) -> Vec<Uuid> {
        self.lead_form_ids.lock().unwrap().clone()
    }

    pub fn user(first_name: &str, phone: &str) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            phone: phone.to_string(),
            last_name: None,
            age: None,
            email: None,
            street_address: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn form(title: &str) -> Form {
        Form {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn lead(form_id: Uuid, first_name: &str, phone: &str) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            form_id: Some(form_id),
            first_name: first_name.to_string(),
            phone: phone.to_string(),
            last_name: None,
            email: None,
            created_at: None,
        }
    }
}

#[async_trait]
impl CampaignDirectory for MockDirectory {
    async fn all_users(&self) -> Result<Vec<User>, StoreReadError> {
        Ok(self.users.clone())
    }

    async fn all_forms(&self) -> Result<Vec<Form>, StoreReadError> {
        Ok(self.forms.clone())
    }

    async fn all_leads(&self) -> Result<Vec<Lead>, StoreReadError> {
        Ok(self.leads.clone())
    }

    async fn form_by_id(&self, form_id: Uuid) -> Result<Option<Form>, StoreReadError> {
        Ok(self.forms.iter().find(|f| f.id == form_id).cloned())
    }

    async fn leads_by_ids(&self, lead_ids: &[Uuid]) -> Result<Vec<Lead>, StoreReadError> {
        Ok(self.leads.iter().filter(|l| lead_ids.contains(&l.id)).cloned().collect())
    }

    async fn leads_by_form(&self, form_id: Uuid) -> Result<Vec<Lead>, StoreReadError> {
        Ok(self
            .leads
            .iter()
            .filter(|l| l.form_id == Some(form_id))
            .cloned()
            .collect())
    }

    fn users(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    fn forms(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    fn leads_for_form(&self, form_id: Uuid) -> Arc<dyn RecordStore> {
        self.lead_form_ids.lock().unwrap().push(form_id);
        self.store.clone()
    }
}
