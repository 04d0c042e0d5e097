//! Routing decisions for sticky conversations
//!
//! Three declarative decision layers, all pure and deterministic:
//! - **classifier**: first-turn model selection from an ordered rule table
//! - **switch**: per-turn stay-or-switch evaluation plus context transfer
//! - **detector/chain**: escalation triggers and capability chain plans
//!
//! Execution (provider calls, session mutation) lives elsewhere; this
//! crate only produces decisions.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod chain;
pub mod classifier;
pub mod detector;
pub mod switch;

use serde::Serialize;
use switchboard_catalog::ModelId;

pub use chain::{ChainPlan, ChainStep, ChainTable, ChainTableError, StepAction};
pub use classifier::classify;
pub use detector::{EscalationDecision, EscalationTrigger, capability, detect};
pub use switch::{Speaker, TranscriptTurn, build_transfer, evaluate_switch};

/// Coarse complexity assessment of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplexityTier {
    Simple,
    Medium,
    High,
}

/// Result of a routing decision
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Selected model
    pub target: ModelId,
    /// Confidence in the selection (0.0 to 1.0)
    pub confidence: f64,
    /// Why this model was selected
    pub reason: String,
    /// Pre-call cost approximation for this turn (USD)
    pub estimated_cost: f64,
    /// Complexity assessment driving the selection
    pub tier: ComplexityTier,
    /// Whether acting on this decision changes the session's model
    pub requires_switch: bool,
    /// Explanation attached when a switch is required
    pub switch_reason: Option<String>,
}
