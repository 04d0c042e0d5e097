//! Stay-or-switch evaluation for existing sessions
//!
//! Sticky by default: continuing on the session's model preserves
//! context and avoids premium-tier charges. A switch fires only on an
//! explicit premium-capability request, and always carries a compressed
//! context-transfer payload so the new backend can continue naturally
//! without replaying the full history.

use std::fmt::Write as _;

use switchboard_catalog::{Catalog, ModelDescriptor, ModelId, cost};
use switchboard_config::SwitchConfig;

use crate::{ComplexityTier, RoutingDecision};

/// Vocabulary that requests premium-tier capability mid-session
const PREMIUM_REQUESTS: &[&str] = &[
    "premium analysis",
    "comprehensive analysis",
    "comprehensive review",
    "architecture review",
    "architectural analysis",
    "strategic planning",
    "strategic review",
    "critical evaluation",
];

/// Vocabulary marking a user turn as transfer-worthy topic material
const TOPIC_VOCAB: &[&str] = &["project", "build", "create", "debug", "implement", "fix"];

/// Vocabulary marking an assistant turn as a recommendation
const DECISION_VOCAB: &[&str] = &["recommend", "suggest", "solution"];

/// Tokens-per-word estimate used when sizing the transfer payload
const TOKENS_PER_WORD: f64 = 1.3;

/// Who authored a history turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// Borrowed view of one history turn, enough for transfer extraction
#[derive(Debug, Clone, Copy)]
pub struct TranscriptTurn<'a> {
    /// Turn author
    pub speaker: Speaker,
    /// Turn text
    pub text: &'a str,
}

/// Decide whether this turn stays on the sticky model or switches
pub fn evaluate_switch(primary: ModelId, text: &str, catalog: &Catalog) -> RoutingDecision {
    let lower = text.to_lowercase();
    let wants_premium = PREMIUM_REQUESTS.iter().any(|phrase| lower.contains(phrase));

    if wants_premium && !primary.is_premium() {
        let target = ModelId::Premium;
        let estimated_cost = cost::estimate(text, catalog.get(target));

        return RoutingDecision {
            target,
            confidence: 0.95,
            reason: "premium analysis requested, switching tiers".to_owned(),
            estimated_cost,
            tier: ComplexityTier::High,
            requires_switch: true,
            switch_reason: Some(format!("premium analysis request (est. cost ${estimated_cost:.3})")),
        };
    }

    if wants_premium {
        // Already on a premium model; no switch needed
        return RoutingDecision {
            target: primary,
            confidence: 1.0,
            reason: "already on a premium model".to_owned(),
            estimated_cost: cost::estimate(text, catalog.get(primary)),
            tier: ComplexityTier::High,
            requires_switch: false,
            switch_reason: None,
        };
    }

    RoutingDecision {
        target: primary,
        confidence: 0.9,
        reason: "continuing on the sticky session model".to_owned(),
        estimated_cost: cost::estimate(text, catalog.get(primary)),
        tier: ComplexityTier::Medium,
        requires_switch: false,
        switch_reason: None,
    }
}

/// Build the context-transfer payload sent to a newly switched-to model
///
/// The payload, not the raw history, is what the new backend sees: prior
/// model and spend, key topics from recent user turns, recent
/// recommendations, then the verbatim current request. If the rendered
/// payload would overflow the target's context window, the oldest
/// summarized material is dropped first; the current request is never
/// dropped.
pub fn build_transfer(
    prior_model: ModelId,
    total_cost: f64,
    turn_count: usize,
    turns: &[TranscriptTurn<'_>],
    current_request: &str,
    target: &ModelDescriptor,
    policy: &SwitchConfig,
) -> String {
    let window = &turns[turns.len().saturating_sub(policy.scan_window)..];

    let mut topics: Vec<&str> = window
        .iter()
        .filter(|t| t.speaker == Speaker::User && contains_any(t.text, TOPIC_VOCAB))
        .map(|t| clip(t.text, 100))
        .collect();
    if topics.len() > policy.key_topic_turns {
        topics.drain(..topics.len() - policy.key_topic_turns);
    }

    let mut decisions: Vec<&str> = window
        .iter()
        .filter(|t| t.speaker == Speaker::Assistant && contains_any(t.text, DECISION_VOCAB))
        .map(|t| clip(t.text, 150))
        .collect();
    if decisions.len() > policy.decision_turns {
        decisions.drain(..decisions.len() - policy.decision_turns);
    }

    loop {
        let payload = render(prior_model, total_cost, turn_count, &topics, &decisions, current_request);

        let estimated_tokens = payload.split_whitespace().count() as f64 * TOKENS_PER_WORD;
        if estimated_tokens <= f64::from(target.context_window) {
            return payload;
        }

        // Oldest summarized material goes first; the request itself stays
        if !topics.is_empty() {
            topics.remove(0);
        } else if !decisions.is_empty() {
            decisions.remove(0);
        } else {
            return payload;
        }
    }
}

fn render(
    prior_model: ModelId,
    total_cost: f64,
    turn_count: usize,
    topics: &[&str],
    decisions: &[&str],
    current_request: &str,
) -> String {
    let mut payload = String::from("CONVERSATION CONTEXT TRANSFER\n\n");
    let _ = writeln!(payload, "Previous model: {prior_model}");
    let _ = writeln!(payload, "Session cost so far: ${total_cost:.3}");
    let _ = writeln!(payload, "Messages exchanged: {turn_count}");

    if !topics.is_empty() {
        payload.push_str("\nKey topics discussed:\n");
        for topic in topics {
            let _ = writeln!(payload, "- {topic}");
        }
    }

    if !decisions.is_empty() {
        payload.push_str("\nRecent recommendations:\n");
        for decision in decisions {
            let _ = writeln!(payload, "- {decision}");
        }
    }

    let _ = write!(
        payload,
        "\nCURRENT REQUEST:\n{current_request}\n\nPlease continue this conversation naturally, \
         maintaining consistency with the previous discussion."
    );

    payload
}

fn contains_any(text: &str, vocab: &[&str]) -> bool {
    let lower = text.to_lowercase();
    vocab.iter().any(|word| lower.contains(word))
}

/// Clip to a character limit without splitting a code point
fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
