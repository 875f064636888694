//! Data models for cdl-api

pub mod campaign;
pub mod dispatch;
pub mod record;
pub mod report;

pub use campaign::{Form, Lead, NewForm, NewLead, User};
pub use dispatch::{DispatchOutcome, DispatchReport, DispatchTarget, FailedMessage, GatewayAck, SentMessage};
pub use record::{
    FieldRule, FieldSchema, FieldValue, OptionalField, RawRow, RowOutcome, ValidatedRecord,
    FORM_SCHEMA, LEAD_SCHEMA, USER_SCHEMA,
};
pub use report::{BatchReport, FailureKind, ImportFailure, ImportReport, ImportedRecord};
