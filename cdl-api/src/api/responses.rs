//! Response bodies shared by the import and dispatch endpoints

use serde::Serialize;
use uuid::Uuid;

use crate::models::{DispatchReport, FailedMessage, Form, ImportReport, SentMessage};

/// Response of a spreadsheet import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub imported_count: usize,
    pub total_rows: usize,
    pub failed_count: usize,
    /// One "Line N: reason" entry per record the store rejected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub report: ImportReport,
}

impl ImportResponse {
    pub fn new(report: ImportReport, noun: &str) -> Self {
        let warnings = report
            .failed
            .iter()
            .map(|failure| format!("Line {}: {}", failure.index + 1, failure.reason))
            .collect();

        Self {
            message: format!("Import completed: {} {} added", report.succeeded.len(), noun),
            imported_count: report.succeeded.len(),
            total_rows: report.total,
            failed_count: report.failed.len(),
            warnings,
            report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DispatchSummary {
    pub total: usize,
    pub successful_sends: usize,
    pub failed_sends: usize,
    pub not_attempted: usize,
}

#[derive(Debug, Serialize)]
pub struct DispatchResults {
    pub successful: Vec<SentMessage>,
    pub failed: Vec<FailedMessage>,
    /// Positions never attempted because the service was shutting down
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_attempted: Vec<usize>,
}

/// Form the messages were sent for
#[derive(Debug, Serialize)]
pub struct FormInfo {
    pub id: Uuid,
    pub title: String,
    pub total_leads: usize,
}

impl FormInfo {
    pub fn new(form: &Form, total_leads: usize) -> Self {
        Self {
            id: form.id,
            title: form.title.clone(),
            total_leads,
        }
    }
}

/// Response of a bulk dispatch
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_info: Option<FormInfo>,
    pub summary: DispatchSummary,
    pub results: DispatchResults,
}

impl DispatchResponse {
    pub fn new(report: DispatchReport, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            form_info: None,
            summary: DispatchSummary {
                total: report.total,
                successful_sends: report.succeeded.len(),
                failed_sends: report.failed.len(),
                not_attempted: report.not_attempted.len(),
            },
            results: DispatchResults {
                successful: report.succeeded,
                failed: report.failed,
                not_attempted: report.not_attempted,
            },
        }
    }

    pub fn with_form(mut self, form_info: FormInfo) -> Self {
        self.form_info = Some(form_info);
        self
    }
}
