//! Escalation detection
//!
//! Inspects the raw query before a backend call and the response text
//! after one. Three independent checks in priority order: real-time-data
//! need, backend failure phrasing, capability limit. Pattern families
//! are static data so they can be tested in isolation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use switchboard_catalog::{Catalog, ModelId, cost};
use switchboard_config::EscalationConfig;

/// Capability keys produced by the detector and consumed by the chain
/// tables
pub mod capability {
    /// Date/time answerable from the local clock, free
    pub const CURRENT_DATE: &str = "current_date";
    /// Live external data (prices, weather, news, scores)
    pub const REAL_TIME_DATA: &str = "real_time_data";
    /// Recovery path after a backend admitted it cannot answer
    pub const WEB_CAPABILITIES: &str = "web_capabilities";
    /// Deep analysis beyond the current model's tier
    pub const PREMIUM_ANALYSIS: &str = "premium_analysis";
    /// Placeholder when no escalation applies
    pub const NONE: &str = "none";
}

/// What tripped an escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EscalationTrigger {
    /// Query needs data newer than any model's training cutoff
    RealTimeData,
    /// The backend failed or admitted it cannot answer
    BackendFailure,
    /// Query exceeds the current model's capability tier
    CapabilityLimit,
    /// Projected spend crossed a policy ceiling
    CostThreshold,
    /// Caller asked for escalation explicitly
    UserRequest,
}

/// Outcome of an escalation check
#[derive(Debug, Clone)]
pub struct EscalationDecision {
    /// Whether an escalation chain should run
    pub should_escalate: bool,
    /// What tripped the decision
    pub trigger: EscalationTrigger,
    /// Key into the chain table
    pub target_capability: String,
    /// Explanation for logs and the caller
    pub reasoning: String,
    /// Confidence in the detection (0.0 to 1.0)
    pub confidence: f64,
    /// Projected cost of acting on the decision (USD)
    pub estimated_cost: f64,
}

impl EscalationDecision {
    /// Whether the chain may run without caller confirmation
    ///
    /// Free or cheap escalations run immediately; so do real-time-data
    /// and backend-failure recoveries, since an answer has to be
    /// produced one way or another.
    pub fn auto_approved(&self, threshold: f64) -> bool {
        self.estimated_cost <= threshold
            || matches!(
                self.trigger,
                EscalationTrigger::RealTimeData | EscalationTrigger::BackendFailure
            )
    }

    fn none(trigger: EscalationTrigger, reasoning: &str, confidence: f64) -> Self {
        Self {
            should_escalate: false,
            trigger,
            target_capability: capability::NONE.to_owned(),
            reasoning: reasoning.to_owned(),
            confidence,
            estimated_cost: 0.0,
        }
    }
}

// -- Pattern families, compiled once --

static CURRENT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\btoday\b|\bcurrent date\b|\bwhat date\b|\btoday's date\b|\bdate today\b|\bwhat is the date\b|\bwhat's the date\b")
        .expect("must be valid regex")
});

static CURRENT_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcurrent time\b|\bwhat time\b|\btime now\b|\btime is it\b").expect("must be valid regex")
});

static LIVE_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bcurrent\b.*\b(price|stock|weather|news|score)\b|\blive\b.*\b(updates|data|feed)\b|\blatest\b.*\b(news|information|update)\b|\breal[- ]?time\b.*\b(data|info|update)\b",
    )
    .expect("must be valid regex")
});

static RECENT_EVENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\byesterday\b|\blast week\b|\brecent\b.*\b(news|events)\b|\bhappened today\b|\blatest\b.*\bdevelopment\b")
        .expect("must be valid regex")
});

static WEB_SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsearch for\b|\blook up\b|\bfind information about\b|\bwho is\b.*\b(recently|new|current)\b|\bwhat happened\b.*\b(today|recently|latest)\b")
        .expect("must be valid regex")
});

/// Refusal/limitation phrases that mark a backend failure
const FAILURE_PHRASES: &[&str] = &[
    "i don't have access to",
    "i cannot access",
    "i don't have real-time",
    "i cannot browse",
    "i don't have the ability to",
    "my knowledge cutoff",
    "i cannot provide current",
    "i don't have current information",
    "i cannot retrieve live data",
    "i'm not able to access",
];

/// Vocabulary indicating analysis beyond a non-premium tier
const PREMIUM_INDICATORS: &[&str] = &[
    "comprehensive analysis",
    "strategic review",
    "executive summary",
    "in-depth analysis",
    "detailed evaluation",
    "thorough assessment",
];

/// Check a query (and optionally the backend's response) for escalation
/// triggers
///
/// First positive match wins, in priority order: real-time data on the
/// query, failure phrasing on the response, capability limit on the
/// query. Returns a non-escalating decision when nothing matches.
pub fn detect(
    query: &str,
    response: Option<&str>,
    current_model: ModelId,
    catalog: &Catalog,
    policy: &EscalationConfig,
) -> EscalationDecision {
    let query_lower = query.to_lowercase();

    if let Some(decision) = detect_real_time(&query_lower, policy) {
        return decision;
    }

    if let Some(response) = response
        && let Some(decision) = detect_backend_failure(response, policy)
    {
        return decision;
    }

    if let Some(decision) = detect_capability_limit(&query_lower, query, current_model, catalog) {
        return decision;
    }

    EscalationDecision::none(EscalationTrigger::UserRequest, "no escalation triggers detected", 0.95)
}

fn detect_real_time(query_lower: &str, policy: &EscalationConfig) -> Option<EscalationDecision> {
    // Date and time resolve from the local clock, so they carry zero cost
    if CURRENT_DATE_RE.is_match(query_lower) || CURRENT_TIME_RE.is_match(query_lower) {
        return Some(EscalationDecision {
            should_escalate: true,
            trigger: EscalationTrigger::RealTimeData,
            target_capability: capability::CURRENT_DATE.to_owned(),
            reasoning: "query asks for the current date or time".to_owned(),
            confidence: 0.95,
            estimated_cost: 0.0,
        });
    }

    let family = [
        (&*LIVE_DATA_RE, "live data"),
        (&*RECENT_EVENTS_RE, "recent events"),
        (&*WEB_SEARCH_RE, "web search phrasing"),
    ]
    .into_iter()
    .find(|(re, _)| re.is_match(query_lower));

    family.map(|(_, name)| EscalationDecision {
        should_escalate: true,
        trigger: EscalationTrigger::RealTimeData,
        target_capability: capability::REAL_TIME_DATA.to_owned(),
        reasoning: format!("query requires real-time data ({name})"),
        confidence: 0.90,
        estimated_cost: policy.search_step_cost,
    })
}

fn detect_backend_failure(response: &str, policy: &EscalationConfig) -> Option<EscalationDecision> {
    let response_lower = response.to_lowercase();

    FAILURE_PHRASES
        .iter()
        .find(|phrase| response_lower.contains(*phrase))
        .map(|phrase| EscalationDecision {
            should_escalate: true,
            trigger: EscalationTrigger::BackendFailure,
            target_capability: capability::WEB_CAPABILITIES.to_owned(),
            reasoning: format!("backend limitation detected: \"{phrase}\""),
            confidence: 0.95,
            estimated_cost: policy.recovery_cost,
        })
}

fn detect_capability_limit(
    query_lower: &str,
    query: &str,
    current_model: ModelId,
    catalog: &Catalog,
) -> Option<EscalationDecision> {
    if current_model.is_premium() {
        return None;
    }

    PREMIUM_INDICATORS
        .iter()
        .find(|indicator| query_lower.contains(*indicator))
        .map(|indicator| EscalationDecision {
            should_escalate: true,
            trigger: EscalationTrigger::CapabilityLimit,
            target_capability: capability::PREMIUM_ANALYSIS.to_owned(),
            reasoning: format!("premium capability needed: \"{indicator}\""),
            confidence: 0.85,
            estimated_cost: cost::estimate(query, catalog.get(ModelId::Premium)),
        })
}
