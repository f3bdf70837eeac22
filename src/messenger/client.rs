//! Delivery over the provider's Send API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::payload_builder::outbound_payloads;
use crate::core::config::AppConfig;
use crate::core::models::Reply;
use crate::errors::BotError;

const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Delivery seam between the dispatcher and the provider, so dispatch tests
/// can record replies instead of sending them.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    async fn send(&self, recipient_id: &str, reply: &Reply) -> Result<(), BotError>;
}

pub struct MessengerClient {
    graph_base: String,
    access_token: String,
}

impl MessengerClient {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            graph_base: config
                .graph_api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_GRAPH_API_BASE.to_string()),
            access_token: config.page_access_token.clone(),
        }
    }
}

#[async_trait]
impl OutboundSender for MessengerClient {
    /// One normalized reply may fan out into several provider messages;
    /// they are sent in order so the split pieces read top to bottom.
    async fn send(&self, recipient_id: &str, reply: &Reply) -> Result<(), BotError> {
        for payload in outbound_payloads(recipient_id, reply) {
            let response = HTTP_CLIENT
                .post(format!("{}/me/messages", self.graph_base))
                .query(&[("access_token", self.access_token.as_str())])
                .json(&payload)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BotError::Messenger(format!(
                    "send failed with {status}: {body}"
                )));
            }
        }
        Ok(())
    }
}
