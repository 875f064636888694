//! Messaging gateway contract

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::GatewayAck;

/// Gateway send failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Sends one WhatsApp text message
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, number: &str, text: &str) -> Result<GatewayAck, GatewayError>;
}
