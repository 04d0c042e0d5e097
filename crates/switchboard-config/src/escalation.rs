use indexmap::IndexMap;
use serde::Deserialize;

/// Escalation policy: detection costs, approval threshold, and the
/// capability-chain tables
///
/// The two tables are the externally editable policy surface of the
/// escalation subsystem: `chains` maps a detected capability need to an
/// ordered list of step keys, and `capabilities` maps each step key to
/// the action taken when the step runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Dollar ceiling below which an escalation runs without caller
    /// confirmation
    #[serde(default = "default_auto_approve_threshold")]
    pub auto_approve_threshold: f64,
    /// Estimated cost attached to real-time-data escalations
    #[serde(default = "default_search_cost")]
    pub search_step_cost: f64,
    /// Estimated cost attached to backend-failure recoveries
    #[serde(default = "default_recovery_cost")]
    pub recovery_cost: f64,
    /// Capability key → ordered list of step keys
    #[serde(default = "default_chains")]
    pub chains: IndexMap<String, Vec<String>>,
    /// Step key → action taken for that step
    #[serde(default = "default_capabilities")]
    pub capabilities: IndexMap<String, CapabilityStepConfig>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            auto_approve_threshold: default_auto_approve_threshold(),
            search_step_cost: default_search_cost(),
            recovery_cost: default_recovery_cost(),
            chains: default_chains(),
            capabilities: default_capabilities(),
        }
    }
}

/// One entry in the capability table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityStepConfig {
    /// What running this step does
    pub kind: CapabilityKind,
    /// Model identifier for `provider_model` steps
    #[serde(default)]
    pub model: Option<String>,
    /// Fixed cost charged when the step runs (`local_synth` steps)
    #[serde(default)]
    pub cost: Option<f64>,
}

/// Action kind for a capability step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Answer from the local system clock, free of charge
    LocalClock,
    /// Synthesize a web-search-style answer locally at a fixed cost
    LocalSynth,
    /// Run a normal exchange against a catalog model
    ProviderModel,
}

const fn default_auto_approve_threshold() -> f64 {
    5.0
}

const fn default_search_cost() -> f64 {
    0.05
}

const fn default_recovery_cost() -> f64 {
    0.10
}

fn default_chains() -> IndexMap<String, Vec<String>> {
    let owned = |steps: &[&str]| steps.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();

    IndexMap::from([
        ("current_date".to_owned(), owned(&["local_clock"])),
        ("real_time_data".to_owned(), owned(&["general", "premium", "web_search"])),
        ("web_capabilities".to_owned(), owned(&["premium", "web_search"])),
        ("current_events".to_owned(), owned(&["web_search"])),
        ("premium_analysis".to_owned(), owned(&["premium", "premium_plus"])),
        (
            "complex_analysis".to_owned(),
            owned(&["reasoning", "premium", "premium_plus"]),
        ),
        ("default".to_owned(), owned(&["premium", "web_search"])),
    ])
}

fn default_capabilities() -> IndexMap<String, CapabilityStepConfig> {
    let model_step = |model: &str| CapabilityStepConfig {
        kind: CapabilityKind::ProviderModel,
        model: Some(model.to_owned()),
        cost: None,
    };

    IndexMap::from([
        (
            "local_clock".to_owned(),
            CapabilityStepConfig {
                kind: CapabilityKind::LocalClock,
                model: None,
                cost: None,
            },
        ),
        (
            "web_search".to_owned(),
            CapabilityStepConfig {
                kind: CapabilityKind::LocalSynth,
                model: None,
                cost: Some(default_search_cost()),
            },
        ),
        ("general".to_owned(), model_step("general")),
        ("reasoning".to_owned(), model_step("reasoning")),
        ("premium".to_owned(), model_step("premium")),
        ("premium_plus".to_owned(), model_step("premium_plus")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_are_consistent() {
        let config = EscalationConfig::default();

        // Every step referenced by a chain must exist in the capability table
        for (capability, steps) in &config.chains {
            for step in steps {
                assert!(
                    config.capabilities.contains_key(step),
                    "chain {capability} references unknown step {step}"
                );
            }
        }
    }

    #[test]
    fn date_chain_resolves_locally() {
        let config = EscalationConfig::default();
        let chain = &config.chains["current_date"];
        assert_eq!(chain, &["local_clock"]);
        assert_eq!(config.capabilities["local_clock"].kind, CapabilityKind::LocalClock);
    }
}
