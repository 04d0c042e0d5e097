//! First-turn query classification
//!
//! An ordered rule table maps free text to a target model; first match
//! wins, a balanced default catches the rest. The table is data, not
//! control flow, so rules can be tested and extended without touching
//! the matching loop. Same input always yields the same decision.

use switchboard_catalog::{Catalog, ModelId, cost};

use crate::{ComplexityTier, RoutingDecision};

/// One classification rule
///
/// A rule fires when any keyword appears in the lowercased text (an
/// empty keyword list matches unconditionally) and the word count falls
/// inside the optional bounds.
struct Rule {
    target: ModelId,
    confidence: f64,
    tier: ComplexityTier,
    reason: &'static str,
    keywords: &'static [&'static str],
    min_words: Option<usize>,
    max_words: Option<usize>,
}

/// Ordered rule table; position encodes priority
const RULES: &[Rule] = &[
    Rule {
        target: ModelId::Local,
        confidence: 0.95,
        tier: ComplexityTier::Simple,
        reason: "platform command detected",
        keywords: &["switchboard status", "switchboard", "deploy", "git status", "routing status"],
        min_words: None,
        max_words: None,
    },
    Rule {
        target: ModelId::Premium,
        confidence: 0.90,
        tier: ComplexityTier::High,
        reason: "premium analysis request detected",
        keywords: &["comprehensive analysis", "strategic", "architecture review", "critical decision"],
        min_words: None,
        max_words: None,
    },
    Rule {
        target: ModelId::Reasoning,
        confidence: 0.85,
        tier: ComplexityTier::High,
        reason: "complex reasoning vocabulary detected",
        keywords: &["analyze", "research", "complex", "reasoning", "math", "prove", "step by step"],
        min_words: None,
        max_words: None,
    },
    Rule {
        target: ModelId::Reasoning,
        confidence: 0.85,
        tier: ComplexityTier::High,
        reason: "long-form request suggests complex reasoning",
        keywords: &[],
        min_words: Some(31),
        max_words: None,
    },
    Rule {
        target: ModelId::General,
        confidence: 0.85,
        tier: ComplexityTier::Medium,
        reason: "development task detected",
        keywords: &["code", "debug", "python", "javascript", "function", "api", "algorithm"],
        min_words: None,
        max_words: None,
    },
    Rule {
        target: ModelId::Multilingual,
        confidence: 0.80,
        tier: ComplexityTier::Medium,
        reason: "multilingual task detected",
        keywords: &["translate", "language", "multilingual", "español", "français"],
        min_words: None,
        max_words: None,
    },
    Rule {
        target: ModelId::Free,
        confidence: 0.75,
        tier: ComplexityTier::Simple,
        reason: "simple question routed to the free tier",
        keywords: &["what is", "how to", "explain", "define", "tell me about"],
        min_words: None,
        max_words: Some(14),
    },
];

impl Rule {
    fn matches(&self, lower: &str, word_count: usize) -> bool {
        if self.min_words.is_some_and(|min| word_count < min) {
            return false;
        }
        if self.max_words.is_some_and(|max| word_count > max) {
            return false;
        }
        self.keywords.is_empty() || self.keywords.iter().any(|k| lower.contains(k))
    }
}

/// Classify a query to pick the primary model for a new session
///
/// Pure function: no session state is consulted, so identical text
/// always produces an identical decision.
pub fn classify(text: &str, catalog: &Catalog) -> RoutingDecision {
    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();

    let (target, confidence, tier, reason) = RULES
        .iter()
        .find(|rule| rule.matches(&lower, word_count))
        .map_or(
            (ModelId::General, 0.70, ComplexityTier::Medium, "general query routed to the balanced default"),
            |rule| (rule.target, rule.confidence, rule.tier, rule.reason),
        );

    let decision = RoutingDecision {
        target,
        confidence,
        reason: reason.to_owned(),
        estimated_cost: cost::estimate(text, catalog.get(target)),
        tier,
        requires_switch: false,
        switch_reason: None,
    };

    tracing::debug!(
        target = %decision.target,
        confidence = decision.confidence,
        tier = %decision.tier,
        "query classified"
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn platform_command_routes_local() {
        let decision = classify("switchboard status", &catalog());
        assert_eq!(decision.target, ModelId::Local);
        assert!(decision.confidence >= 0.9);
        assert!(decision.estimated_cost.abs() < f64::EPSILON);
    }

    #[test]
    fn platform_command_wins_over_surrounding_text() {
        let decision = classify(
            "before anything else run switchboard status and then debug my python code",
            &catalog(),
        );
        assert_eq!(decision.target, ModelId::Local);
        assert!(decision.confidence >= 0.9);
    }

    #[test]
    fn coding_query_routes_general() {
        let decision = classify("Help me debug this Python function", &catalog());
        assert_eq!(decision.target, ModelId::General);
        assert!((decision.confidence - 0.85).abs() < f64::EPSILON);
        assert_eq!(decision.tier, ComplexityTier::Medium);
    }

    #[test]
    fn premium_vocabulary_routes_premium() {
        let decision = classify("I need a comprehensive analysis of our platform", &catalog());
        assert_eq!(decision.target, ModelId::Premium);
        assert_eq!(decision.tier, ComplexityTier::High);
    }

    #[test]
    fn reasoning_vocabulary_routes_reasoning() {
        let decision = classify("prove this theorem step by step", &catalog());
        assert_eq!(decision.target, ModelId::Reasoning);
    }

    #[test]
    fn long_message_routes_reasoning() {
        let text = "please ".repeat(35);
        let decision = classify(&text, &catalog());
        assert_eq!(decision.target, ModelId::Reasoning);
    }

    #[test]
    fn short_question_routes_free() {
        let decision = classify("what is machine learning?", &catalog());
        assert_eq!(decision.target, ModelId::Free);
        assert!((decision.confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn long_what_is_question_does_not_use_free_tier() {
        let text = format!("what is the meaning of {}", "word ".repeat(20));
        let decision = classify(&text, &catalog());
        assert_ne!(decision.target, ModelId::Free);
    }

    #[test]
    fn unmatched_query_uses_balanced_default() {
        let decision = classify("good morning", &catalog());
        assert_eq!(decision.target, ModelId::General);
        assert!((decision.confidence - 0.70).abs() < f64::EPSILON);
    }

    #[test]
    fn classification_is_idempotent() {
        let catalog = catalog();
        let a = classify("translate this sentence", &catalog);
        let b = classify("translate this sentence", &catalog);
        assert_eq!(a.target, b.target);
        assert!((a.confidence - b.confidence).abs() < f64::EPSILON);
        assert!((a.estimated_cost - b.estimated_cost).abs() < f64::EPSILON);
        assert_eq!(a.reason, b.reason);
    }

    #[test]
    fn multilingual_query_routes_multilingual() {
        let decision = classify("translate this paragraph into français", &catalog());
        assert_eq!(decision.target, ModelId::Multilingual);
    }
}
