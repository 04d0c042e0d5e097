use indexmap::IndexMap;
use serde::Deserialize;

/// Model catalog overrides, keyed by model identifier (snake_case)
///
/// The built-in catalog covers every model; entries here adjust rates,
/// limits, or upstream wiring for individual models. Changes require a
/// restart — the catalog is immutable once the process is up.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Per-model overrides
    #[serde(default)]
    pub models: IndexMap<String, ModelOverrideConfig>,
}

/// Overrides for a single catalog entry
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelOverrideConfig {
    /// Which backend kind serves this model (`anthropic`,
    /// `openai_compat`, or `local`)
    #[serde(default)]
    pub provider_kind: Option<String>,
    /// Wire-level model identifier sent to the backend
    #[serde(default)]
    pub upstream_id: Option<String>,
    /// Cost per 1k input tokens (USD)
    #[serde(default)]
    pub cost_per_1k_input: Option<f64>,
    /// Cost per 1k output tokens (USD)
    #[serde(default)]
    pub cost_per_1k_output: Option<f64>,
    /// Maximum output tokens per exchange
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Context window in tokens
    #[serde(default)]
    pub context_window: Option<u32>,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
}
