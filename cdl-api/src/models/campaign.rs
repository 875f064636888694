//! Campaign forms and leads as stored in the record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::RawRow;

/// Imported contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub phone: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Campaign form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lead captured for a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    #[serde(default)]
    pub form_id: Option<Uuid>,
    pub first_name: String,
    pub phone: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// POST /forms request body
#[derive(Debug, Clone, Deserialize)]
pub struct NewForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /leads request body
#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub form_id: Uuid,
    pub first_name: String,
    pub phone: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewForm {
    /// View as a raw row so JSON submissions go through the same validator as spreadsheets
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert("title".to_string(), self.title.clone());
        if let Some(description) = &self.description {
            row.insert("description".to_string(), description.clone());
        }
        row
    }
}

impl NewLead {
    /// View as a raw row (form_id is attached by the store handle, not validated)
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert("first_name".to_string(), self.first_name.clone());
        row.insert("phone".to_string(), self.phone.clone());
        if let Some(last_name) = &self.last_name {
            row.insert("last_name".to_string(), last_name.clone());
        }
        if let Some(email) = &self.email {
            row.insert("email".to_string(), email.clone());
        }
        row
    }
}
