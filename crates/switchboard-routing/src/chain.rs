//! Escalation chain planning
//!
//! Resolves a detected capability need into an ordered list of concrete
//! steps using the two config tables. Planning is pure; executing the
//! steps (and paying for them) belongs to the session layer.

use std::str::FromStr;

use indexmap::IndexMap;
use switchboard_catalog::ModelId;
use switchboard_config::{CapabilityKind, EscalationConfig};
use thiserror::Error;

/// Chain key used when a capability has no dedicated chain
const FALLBACK_CHAIN: &str = "default";

/// Errors raised while resolving the chain tables from configuration
#[derive(Debug, Error)]
pub enum ChainTableError {
    /// A `provider_model` step names a model outside the catalog
    #[error("capability step '{step}' names unknown model '{model}'")]
    UnknownModel { step: String, model: String },

    /// A chain references a step key missing from the capability table
    #[error("chain '{capability}' references unknown step '{step}'")]
    UnknownStep { capability: String, step: String },
}

/// Action taken when a chain step runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepAction {
    /// Answer from the local system clock, free
    LocalClock,
    /// Synthesize a search-style answer locally at a fixed cost
    LocalSynth {
        /// Fixed cost charged when the step runs
        cost: f64,
    },
    /// Run a normal exchange against a catalog model
    Model(ModelId),
}

/// One resolved step of an escalation chain
#[derive(Debug, Clone)]
pub struct ChainStep {
    /// Step key from the capability table
    pub key: String,
    /// Resolved action
    pub action: StepAction,
}

/// An ordered, ready-to-execute escalation chain
#[derive(Debug, Clone)]
pub struct ChainPlan {
    /// Unique identifier for this escalation attempt
    pub chain_id: String,
    /// Capability the chain answers for
    pub capability: String,
    /// Steps in execution order; each runs at most once
    pub steps: Vec<ChainStep>,
}

/// Resolved chain tables, built once at startup
#[derive(Debug)]
pub struct ChainTable {
    chains: IndexMap<String, Vec<String>>,
    steps: IndexMap<String, StepAction>,
}

impl ChainTable {
    /// Resolve the config tables, validating every reference
    pub fn from_config(config: &EscalationConfig) -> Result<Self, ChainTableError> {
        let mut steps = IndexMap::new();
        for (key, step) in &config.capabilities {
            let action = match step.kind {
                CapabilityKind::LocalClock => StepAction::LocalClock,
                CapabilityKind::LocalSynth => StepAction::LocalSynth {
                    cost: step.cost.unwrap_or(config.search_step_cost),
                },
                CapabilityKind::ProviderModel => {
                    let model = step.model.as_deref().unwrap_or_default();
                    let id = ModelId::from_str(model).map_err(|_| ChainTableError::UnknownModel {
                        step: key.clone(),
                        model: model.to_owned(),
                    })?;
                    StepAction::Model(id)
                }
            };
            steps.insert(key.clone(), action);
        }

        for (capability, chain) in &config.chains {
            for step in chain {
                if !steps.contains_key(step) {
                    return Err(ChainTableError::UnknownStep {
                        capability: capability.clone(),
                        step: step.clone(),
                    });
                }
            }
        }

        Ok(Self {
            chains: config.chains.clone(),
            steps,
        })
    }

    /// Plan a chain for a capability, falling back to the default chain
    /// for unknown keys
    pub fn plan(&self, target_capability: &str) -> ChainPlan {
        let keys = self
            .chains
            .get(target_capability)
            .or_else(|| self.chains.get(FALLBACK_CHAIN))
            .cloned()
            .unwrap_or_default();

        let steps = keys
            .into_iter()
            .filter_map(|key| {
                self.steps.get(&key).map(|action| ChainStep {
                    key: key.clone(),
                    action: *action,
                })
            })
            .collect();

        ChainPlan {
            chain_id: format!("esc-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            capability: target_capability.to_owned(),
            steps,
        }
    }
}
