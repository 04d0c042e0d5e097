//! Anthropic Messages API adapter

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use switchboard_catalog::{ModelDescriptor, ProviderKind, cost};
use switchboard_config::HttpProviderConfig;
use url::Url;

use crate::error::ProviderError;
use crate::types::{ChatMessage, ExchangeResult, Role};
use crate::ProviderAdapter;

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API adapter
pub struct AnthropicProvider {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    timeout_secs: u64,
}

impl AnthropicProvider {
    /// Create from provider configuration; an absent config yields an
    /// adapter that reports `NotConfigured` on use
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(config: Option<&HttpProviderConfig>) -> Self {
        let base_url = config
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));
        let timeout_secs = config.map_or(30, |c| c.timeout_secs);

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url,
            api_key: config.and_then(|c| c.api_key.clone()),
            timeout_secs,
        }
    }

    fn messages_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/messages")
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn execute(
        &self,
        model: &ModelDescriptor,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<ExchangeResult, ProviderError> {
        let Some(ref api_key) = self.api_key else {
            return Err(ProviderError::NotConfigured { provider: "anthropic" });
        };

        let mut messages: Vec<WireMessage> = history.iter().map(WireMessage::from).collect();
        messages.push(WireMessage {
            role: "user",
            content: message.to_owned(),
        });

        let wire_request = MessagesRequest {
            model: &model.upstream_id,
            max_tokens: model.max_output_tokens.min(2048),
            messages,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(model = %model.id, error = %e, "anthropic request failed");
                ProviderError::from_reqwest(&e, self.timeout_secs)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(model = %model.id, status, "anthropic returned error");
            return Err(ProviderError::Rejected { status, detail });
        }

        let wire: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let content = wire
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        Ok(ExchangeResult {
            content,
            model_used: model.upstream_id.clone(),
            input_tokens: wire.usage.input_tokens,
            output_tokens: wire.usage.output_tokens,
            actual_cost: cost::actual(wire.usage.input_tokens, wire.usage.output_tokens, model),
            latency: start.elapsed(),
        })
    }
}

// -- Wire types for the Messages API --

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}
