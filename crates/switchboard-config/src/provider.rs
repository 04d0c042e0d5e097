use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Upstream provider configuration, one section per backend kind
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Anthropic Messages API backend
    #[serde(default)]
    pub anthropic: Option<HttpProviderConfig>,
    /// OpenAI-compatible chat completions backend
    #[serde(default)]
    pub openai_compat: Option<HttpProviderConfig>,
}

/// Credentials and endpoint for one HTTP backend
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpProviderConfig {
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Request timeout in seconds; timed-out calls are treated as
    /// backend failures, not crashes
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}
