//! Bulk WhatsApp dispatch
//!
//! Each recipient is normalized and sent exactly once. A failed send is
//! recorded against that recipient and never stops the batch; there is no
//! retry.

use cdl_common::config::PipelineSettings;
use cdl_common::normalize_phone_number;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::message_gateway::{GatewayError, MessageGateway};
use super::result_aggregator::{run_indexed, AggregateError, ItemOutcome};
use crate::models::{DispatchOutcome, DispatchReport, DispatchTarget, FailedMessage, SentMessage};

/// Recipient before normalization
#[derive(Debug, Clone)]
enum Recipient {
    Number { lead_id: Option<Uuid>, raw: String },
    UnknownLead(Uuid),
}

/// Sends one text to many recipients through a [`MessageGateway`]
#[derive(Debug, Clone)]
pub struct BulkDispatcher {
    settings: PipelineSettings,
}

impl BulkDispatcher {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    /// Send `text` to every raw phone number in `recipients`
    pub async fn dispatch(
        &self,
        recipients: &[String],
        text: &str,
        gateway: &dyn MessageGateway,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, AggregateError> {
        let recipients = recipients
            .iter()
            .map(|raw| Recipient::Number {
                lead_id: None,
                raw: raw.clone(),
            })
            .collect();

        self.run(recipients, text, gateway, cancel).await
    }

    /// Resolve each lead to its phone number, then send `text` to it
    ///
    /// Leads the resolver cannot map are reported as failed without a send.
    pub async fn dispatch_for_leads<R>(
        &self,
        lead_ids: &[Uuid],
        resolver: R,
        text: &str,
        gateway: &dyn MessageGateway,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, AggregateError>
    where
        R: Fn(&Uuid) -> Option<String>,
    {
        let recipients = lead_ids
            .iter()
            .map(|id| match resolver(id) {
                Some(raw) => Recipient::Number {
                    lead_id: Some(*id),
                    raw,
                },
                None => Recipient::UnknownLead(*id),
            })
            .collect();

        self.run(recipients, text, gateway, cancel).await
    }

    async fn run(
        &self,
        recipients: Vec<Recipient>,
        text: &str,
        gateway: &dyn MessageGateway,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, AggregateError> {
        let text: Arc<str> = Arc::from(text);
        let timeout = self.settings.call_timeout();

        run_indexed(recipients, self.settings.concurrency(), cancel, |index, recipient| {
            let text = text.clone();
            async move {
                match recipient {
                    Recipient::UnknownLead(lead_id) => {
                        ItemOutcome::Failed(FailedMessage::unresolved(index, lead_id))
                    }
                    Recipient::Number { lead_id, raw } => {
                        let target = build_target(index, lead_id, &raw, text);
                        match send_one(gateway, target, timeout).await {
                            DispatchOutcome::Sent(target, ack) => {
                                ItemOutcome::Succeeded(SentMessage::new(target, ack))
                            }
                            DispatchOutcome::Failed(target, reason) => {
                                ItemOutcome::Failed(FailedMessage::upstream(target, raw, reason))
                            }
                        }
                    }
                }
            }
        })
        .await
    }
}

/// Normalize a raw recipient into a dispatch target
pub fn build_target(index: usize, lead_id: Option<Uuid>, raw: &str, text: Arc<str>) -> DispatchTarget {
    DispatchTarget {
        index,
        lead_id,
        number: normalize_phone_number(raw),
        text,
    }
}

/// Single send attempt with a timeout
pub async fn send_one(gateway: &dyn MessageGateway, target: DispatchTarget, timeout: Duration) -> DispatchOutcome {
    let result = match tokio::time::timeout(timeout, gateway.send(&target.number, &target.text)).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout(timeout)),
    };

    match result {
        Ok(ack) => DispatchOutcome::Sent(target, ack),
        Err(e) => DispatchOutcome::Failed(target, format!("API Error: {}", e)),
    }
}
