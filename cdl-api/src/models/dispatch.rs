//! Bulk dispatch types

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::report::{BatchReport, FailureKind};

/// Normalized recipient plus the text to send
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTarget {
    /// Position in the submitted recipient list
    pub index: usize,
    /// Originating lead, for lead-based dispatch
    pub lead_id: Option<Uuid>,
    /// Digits-only number with country code
    pub number: String,
    pub text: Arc<str>,
}

/// Immediate acknowledgement from the messaging gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatewayAck {
    pub message_id: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
}

/// Result of one send attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Sent(DispatchTarget, GatewayAck),
    Failed(DispatchTarget, String),
}

/// Successful send, as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentMessage {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<Uuid>,
    pub number: String,
    pub status: &'static str,
    pub message_id: Option<String>,
    pub gateway_status: Option<String>,
}

/// Failed send, as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedMessage {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<Uuid>,
    /// Phone number as submitted or stored on the lead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Normalized number; absent when the lead could not be resolved
    pub number: Option<String>,
    pub kind: FailureKind,
    pub error: String,
}

impl SentMessage {
    pub fn new(target: DispatchTarget, ack: GatewayAck) -> Self {
        Self {
            index: target.index,
            lead_id: target.lead_id,
            number: target.number,
            status: "sent",
            message_id: ack.message_id,
            gateway_status: ack.status,
        }
    }
}

impl FailedMessage {
    pub fn upstream(target: DispatchTarget, raw: String, error: String) -> Self {
        Self {
            index: target.index,
            lead_id: target.lead_id,
            raw: Some(raw),
            number: Some(target.number),
            kind: FailureKind::Upstream,
            error,
        }
    }

    pub fn unresolved(index: usize, lead_id: Uuid) -> Self {
        Self {
            index,
            lead_id: Some(lead_id),
            raw: None,
            number: None,
            kind: FailureKind::Unresolved,
            error: "Lead not found".to_string(),
        }
    }
}

pub type DispatchReport = BatchReport<SentMessage, FailedMessage>;
