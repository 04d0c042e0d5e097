//! Model catalog: the closed set of routable backends
//!
//! A tagged `ModelId` enum paired with a descriptor table gives
//! exhaustiveness checks at compile time; string identifiers only appear
//! at the config and wire boundaries.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod cost;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use switchboard_config::CatalogConfig;
use thiserror::Error;

/// Identifier for a routable model
///
/// Closed set: adding a backend means adding a variant and a builtin
/// descriptor, and the compiler finds every match that needs updating.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelId {
    /// Platform commands resolved in-process
    Local,
    /// Free tier for quick questions
    Free,
    /// Balanced workhorse for development and general queries
    General,
    /// Advanced reasoning for math and complex analysis
    Reasoning,
    /// Multilingual dialogue and translation
    Multilingual,
    /// Premium analysis tier
    Premium,
    /// Highest-capability tier for critical analysis
    PremiumPlus,
}

impl ModelId {
    /// Whether this model sits in the premium lane
    pub const fn is_premium(self) -> bool {
        matches!(self, Self::Premium | Self::PremiumPlus)
    }

    /// Informal cost/capability lane used in routing output and reports
    pub const fn lane(self) -> &'static str {
        match self {
            Self::Local => "platform-commands",
            Self::Free => "quick-questions",
            Self::General => "development",
            Self::Reasoning => "complex-reasoning",
            Self::Multilingual => "multilingual",
            Self::Premium => "premium-analysis",
            Self::PremiumPlus => "critical-analysis",
        }
    }
}

/// Which adapter implementation serves a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai_compat")]
    #[strum(serialize = "openai_compat")]
    OpenAiCompat,
    /// In-process handling, no network
    Local,
}

/// Immutable descriptor for one model
///
/// Created once at startup; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Catalog identifier
    pub id: ModelId,
    /// Which adapter serves this model
    pub provider_kind: ProviderKind,
    /// Wire-level model identifier sent upstream
    pub upstream_id: String,
    /// Cost per 1k input tokens (USD)
    pub cost_per_1k_input: f64,
    /// Cost per 1k output tokens (USD)
    pub cost_per_1k_output: f64,
    /// Maximum output tokens per exchange
    pub max_output_tokens: u32,
    /// Context window in tokens
    pub context_window: u32,
    /// Specialty tags used in reports and routing explanations
    pub specialty_tags: Vec<String>,
    /// Human-readable description
    pub description: String,
}

/// Errors raised while building the catalog from configuration
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Override key does not name a catalog model
    #[error("unknown model in catalog overrides: {key}")]
    UnknownModel { key: String },

    /// Override names an unknown provider kind
    #[error("unknown provider kind '{value}' for model {model}")]
    UnknownProviderKind { model: ModelId, value: String },
}

/// Read-only lookup table, `ModelId -> ModelDescriptor`
#[derive(Debug)]
pub struct Catalog {
    descriptors: Vec<ModelDescriptor>,
}

impl Catalog {
    /// Catalog with built-in descriptors only
    pub fn builtin() -> Self {
        use strum::IntoEnumIterator;

        Self {
            descriptors: ModelId::iter().map(builtin_descriptor).collect(),
        }
    }

    /// Build the catalog from built-ins plus configuration overrides
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();

        for (key, overrides) in &config.models {
            let id = ModelId::from_str(key).map_err(|_| CatalogError::UnknownModel { key: key.clone() })?;
            let descriptor = catalog
                .descriptors
                .iter_mut()
                .find(|d| d.id == id)
                .expect("builtin catalog covers every ModelId");

            if let Some(ref kind) = overrides.provider_kind {
                descriptor.provider_kind =
                    ProviderKind::from_str(kind).map_err(|_| CatalogError::UnknownProviderKind {
                        model: id,
                        value: kind.clone(),
                    })?;
            }
            if let Some(ref upstream_id) = overrides.upstream_id {
                descriptor.upstream_id.clone_from(upstream_id);
            }
            if let Some(cost) = overrides.cost_per_1k_input {
                descriptor.cost_per_1k_input = cost;
            }
            if let Some(cost) = overrides.cost_per_1k_output {
                descriptor.cost_per_1k_output = cost;
            }
            if let Some(max) = overrides.max_output_tokens {
                descriptor.max_output_tokens = max;
            }
            if let Some(window) = overrides.context_window {
                descriptor.context_window = window;
            }
            if let Some(ref description) = overrides.description {
                descriptor.description.clone_from(description);
            }
        }

        Ok(catalog)
    }

    /// Look up a descriptor; infallible because the catalog is exhaustive
    pub fn get(&self, id: ModelId) -> &ModelDescriptor {
        self.descriptors
            .iter()
            .find(|d| d.id == id)
            .expect("builtin catalog covers every ModelId")
    }

    /// All descriptors in lane order
    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.descriptors
    }
}

fn builtin_descriptor(id: ModelId) -> ModelDescriptor {
    let tags = |tags: &[&str]| tags.iter().map(|t| (*t).to_owned()).collect::<Vec<_>>();

    match id {
        ModelId::Local => ModelDescriptor {
            id,
            provider_kind: ProviderKind::Local,
            upstream_id: "switchboard-local".to_owned(),
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
            max_output_tokens: 2048,
            context_window: 4096,
            specialty_tags: tags(&["platform", "commands", "status"]),
            description: "Local platform commands and status reports".to_owned(),
        },
        ModelId::Free => ModelDescriptor {
            id,
            provider_kind: ProviderKind::OpenAiCompat,
            upstream_id: "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free".to_owned(),
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
            max_output_tokens: 4096,
            context_window: 8192,
            specialty_tags: tags(&["free", "quick-questions", "simple-reasoning"]),
            description: "Free distilled model for quick questions".to_owned(),
        },
        ModelId::General => ModelDescriptor {
            id,
            provider_kind: ProviderKind::OpenAiCompat,
            upstream_id: "deepseek-ai/DeepSeek-V3".to_owned(),
            cost_per_1k_input: 1.25,
            cost_per_1k_output: 1.25,
            max_output_tokens: 8192,
            context_window: 128_000,
            specialty_tags: tags(&["general", "coding", "development"]),
            description: "Balanced workhorse for general development and coding".to_owned(),
        },
        ModelId::Reasoning => ModelDescriptor {
            id,
            provider_kind: ProviderKind::OpenAiCompat,
            upstream_id: "deepseek-ai/DeepSeek-R1".to_owned(),
            cost_per_1k_input: 3.0,
            cost_per_1k_output: 7.0,
            max_output_tokens: 8192,
            context_window: 128_000,
            specialty_tags: tags(&["reasoning", "math", "research"]),
            description: "Advanced reasoning model for complex problem solving".to_owned(),
        },
        ModelId::Multilingual => ModelDescriptor {
            id,
            provider_kind: ProviderKind::OpenAiCompat,
            upstream_id: "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_owned(),
            cost_per_1k_input: 0.88,
            cost_per_1k_output: 0.88,
            max_output_tokens: 8192,
            context_window: 128_000,
            specialty_tags: tags(&["multilingual", "dialogue", "translation"]),
            description: "Multilingual specialist for global applications".to_owned(),
        },
        ModelId::Premium => ModelDescriptor {
            id,
            provider_kind: ProviderKind::Anthropic,
            upstream_id: "claude-3-5-sonnet-20241022".to_owned(),
            cost_per_1k_input: 3.0,
            cost_per_1k_output: 15.0,
            max_output_tokens: 8192,
            context_window: 200_000,
            specialty_tags: tags(&["premium-analysis", "architecture", "strategy"]),
            description: "Premium model for high-value analysis".to_owned(),
        },
        ModelId::PremiumPlus => ModelDescriptor {
            id,
            provider_kind: ProviderKind::Anthropic,
            upstream_id: "claude-3-opus-20240229".to_owned(),
            cost_per_1k_input: 15.0,
            cost_per_1k_output: 75.0,
            max_output_tokens: 8192,
            context_window: 200_000,
            specialty_tags: tags(&["critical-analysis", "complex-reasoning"]),
            description: "Highest capability tier for critical analysis".to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_config::ModelOverrideConfig;

    #[test]
    fn builtin_covers_every_model() {
        use strum::IntoEnumIterator;

        let catalog = Catalog::builtin();
        for id in ModelId::iter() {
            assert_eq!(catalog.get(id).id, id);
        }
    }

    #[test]
    fn local_model_is_free() {
        let catalog = Catalog::builtin();
        let local = catalog.get(ModelId::Local);
        assert_eq!(local.provider_kind, ProviderKind::Local);
        assert!(local.cost_per_1k_input.abs() < f64::EPSILON);
        assert!(local.cost_per_1k_output.abs() < f64::EPSILON);
    }

    #[test]
    fn premium_lane_membership() {
        assert!(ModelId::Premium.is_premium());
        assert!(ModelId::PremiumPlus.is_premium());
        assert!(!ModelId::General.is_premium());
        assert!(!ModelId::Local.is_premium());
    }

    #[test]
    fn overrides_apply() {
        let mut config = CatalogConfig::default();
        config.models.insert(
            "premium".to_owned(),
            ModelOverrideConfig {
                provider_kind: Some("openai_compat".to_owned()),
                upstream_id: Some("mock-premium".to_owned()),
                cost_per_1k_input: Some(1.0),
                ..ModelOverrideConfig::default()
            },
        );

        let catalog = Catalog::from_config(&config).unwrap();
        let premium = catalog.get(ModelId::Premium);
        assert_eq!(premium.provider_kind, ProviderKind::OpenAiCompat);
        assert_eq!(premium.upstream_id, "mock-premium");
        assert!((premium.cost_per_1k_input - 1.0).abs() < f64::EPSILON);
        // Untouched fields keep builtin values
        assert!((premium.cost_per_1k_output - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_override_key_rejected() {
        let mut config = CatalogConfig::default();
        config.models.insert("gpt9".to_owned(), ModelOverrideConfig::default());

        let err = Catalog::from_config(&config).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownModel { .. }));
    }

    #[test]
    fn model_id_round_trips_through_strings() {
        use std::str::FromStr;

        assert_eq!(ModelId::PremiumPlus.to_string(), "premium_plus");
        assert_eq!(ModelId::from_str("premium_plus").unwrap(), ModelId::PremiumPlus);
    }
}
