//! Evolution API WhatsApp gateway client
//!
//! Sends text messages through `POST {url}/message/sendText/{instance}`.
//! The gateway answers 200/201 with the queued message:
//! ```json
//! {"key": {"remoteJid": "5527999990000@s.whatsapp.net", "fromMe": true, "id": "BAE5F0A1"},
//!  "messageTimestamp": "1717689097", "status": "PENDING"}
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::message_gateway::{GatewayError, MessageGateway};
use crate::config::EvolutionConfig;
use crate::models::GatewayAck;

#[derive(Debug, Serialize)]
struct SendTextPayload<'a> {
    number: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendTextResponse {
    #[serde(default)]
    key: Option<MessageKey>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "messageTimestamp")]
    message_timestamp: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageKey {
    #[serde(default)]
    id: Option<String>,
}

/// Evolution API client
#[derive(Clone)]
pub struct EvolutionClient {
    http: Client,
    send_url: String,
    api_key: String,
}

impl EvolutionClient {
    pub fn new(http: Client, config: &EvolutionConfig) -> Self {
        Self {
            http,
            send_url: format!(
                "{}/message/sendText/{}",
                config.url.trim_end_matches('/'),
                config.instance
            ),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl MessageGateway for EvolutionClient {
    async fn send(&self, number: &str, text: &str) -> Result<GatewayAck, GatewayError> {
        debug!(number, "Sending WhatsApp text");

        let response = self
            .http
            .post(&self.send_url)
            .header("apikey", self.api_key.as_str())
            .json(&SendTextPayload { number, text })
            .send()
            .await
            .map_err(|e| {
                warn!(number, error = %e, "Evolution API request failed");
                GatewayError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(number, status = status.as_u16(), body = %body, "Evolution API rejected message");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx means the gateway accepted the message; the body only adds detail
        let parsed: SendTextResponse = serde_json::from_str(&body).unwrap_or_default();

        Ok(GatewayAck {
            message_id: parsed.key.and_then(|k| k.id),
            status: parsed.status,
            timestamp: parsed.message_timestamp.and_then(|ts| match ts {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        })
    }
}
