//! Programmatic configuration builder for integration tests

use secrecy::SecretString;
use switchboard_config::{Config, HttpProviderConfig, ModelOverrideConfig};
use url::Url;

/// Builder assembling a `Config` for a test server
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from defaults; no providers configured
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Point the OpenAI-compatible provider at a mock backend
    pub fn with_openai_compat(mut self, base_url: &str) -> Self {
        self.config.providers.openai_compat = Some(HttpProviderConfig {
            api_key: Some(SecretString::from("test-key".to_owned())),
            base_url: Some(Url::parse(base_url).expect("valid mock URL")),
            timeout_secs: 5,
        });
        self
    }

    /// Point the Anthropic provider at a mock backend
    ///
    /// Only useful together with a catalog override, since the mock
    /// speaks the chat completions protocol.
    pub fn with_anthropic(mut self, base_url: &str) -> Self {
        self.config.providers.anthropic = Some(HttpProviderConfig {
            api_key: Some(SecretString::from("test-key".to_owned())),
            base_url: Some(Url::parse(base_url).expect("valid mock URL")),
            timeout_secs: 5,
        });
        self
    }

    /// Serve the premium model through the OpenAI-compatible provider
    /// so tests can answer it from the mock
    pub fn with_premium_on_openai_compat(mut self) -> Self {
        self.config.catalog.models.insert(
            "premium".to_owned(),
            ModelOverrideConfig {
                provider_kind: Some("openai_compat".to_owned()),
                upstream_id: Some("mock-premium".to_owned()),
                ..ModelOverrideConfig::default()
            },
        );
        self
    }

    /// Finish building
    pub fn build(self) -> Config {
        self.config
    }
}
