use serde::Deserialize;

/// Routing policy configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Mid-session model switch policy
    #[serde(default)]
    pub switch: SwitchConfig,
}

/// Policy knobs for mid-session model switching
///
/// The thresholds and summarization heuristics carry no strong rationale
/// in the source material; they are exposed here rather than hardcoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    /// Dollar ceiling below which a switch executes without caller
    /// confirmation
    #[serde(default = "default_switch_threshold")]
    pub auto_approve_threshold: f64,
    /// How many trailing history turns are scanned for transfer material
    #[serde(default = "default_scan_window")]
    pub scan_window: usize,
    /// Maximum key-topic user turns carried into the transfer payload
    #[serde(default = "default_key_topic_turns")]
    pub key_topic_turns: usize,
    /// Maximum recommendation assistant turns carried into the payload
    #[serde(default = "default_decision_turns")]
    pub decision_turns: usize,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            auto_approve_threshold: default_switch_threshold(),
            scan_window: default_scan_window(),
            key_topic_turns: default_key_topic_turns(),
            decision_turns: default_decision_turns(),
        }
    }
}

const fn default_switch_threshold() -> f64 {
    3.0
}

const fn default_scan_window() -> usize {
    10
}

const fn default_key_topic_turns() -> usize {
    3
}

const fn default_decision_turns() -> usize {
    2
}
