//! OpenAI-compatible chat completions adapter
//!
//! Serves any backend speaking the `/chat/completions` protocol; the
//! default endpoint is the open-model aggregator the builtin catalog
//! points at.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use switchboard_catalog::{ModelDescriptor, ProviderKind, cost};
use switchboard_config::HttpProviderConfig;
use url::Url;

use crate::error::ProviderError;
use crate::types::{ChatMessage, ExchangeResult};
use crate::ProviderAdapter;

/// Default chat completions base URL
const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

/// Sampling temperature used for all exchanges
const TEMPERATURE: f64 = 0.7;

/// OpenAI-compatible chat completions adapter
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    timeout_secs: u64,
    configured: bool,
}

impl OpenAiCompatProvider {
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
            configured: config.is_some(),
        }
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAiCompat
    }

    async fn execute(
        &self,
        model: &ModelDescriptor,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<ExchangeResult, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured {
                provider: "openai_compat",
            });
        }

        let mut messages: Vec<ChatMessage> = history.to_vec();
        messages.push(ChatMessage::user(message));

        let wire_request = CompletionsRequest {
            model: &model.upstream_id,
            messages,
            max_tokens: model.max_output_tokens.min(2048),
            temperature: TEMPERATURE,
            stream: false,
        };

        let mut builder = self.client.post(self.completions_url()).json(&wire_request);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            tracing::error!(model = %model.id, error = %e, "chat completions request failed");
            ProviderError::from_reqwest(&e, self.timeout_secs)
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(model = %model.id, status, "chat completions returned error");
            return Err(ProviderError::Rejected { status, detail });
        }

        let wire: CompletionsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let content = wire
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Malformed("response carried no choices".to_owned()))?;

        let usage = wire.usage.unwrap_or_default();

        Ok(ExchangeResult {
            content,
            model_used: model.upstream_id.clone(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            actual_cost: cost::actual(usage.prompt_tokens, usage.completion_tokens, model),
            latency: start.elapsed(),
        })
    }
}

// -- Wire types for the chat completions protocol --

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_catalog::{Catalog, ModelId};

    #[test]
    fn completions_url_joins_cleanly() {
        let provider = OpenAiCompatProvider::new(None);
        assert_eq!(
            provider.completions_url(),
            "https://api.together.xyz/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn unconfigured_adapter_reports_not_configured() {
        let provider = OpenAiCompatProvider::new(None);
        let catalog = Catalog::builtin();
        let err = provider
            .execute(catalog.get(ModelId::General), &[], "hello")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::NotConfigured {
                provider: "openai_compat"
            }
        ));
    }
}
