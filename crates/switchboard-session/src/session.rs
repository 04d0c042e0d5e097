//! Conversation session state
//!
//! A session is owned exclusively by the manager and mutated only under
//! its per-session lock. A turn commits as a whole — history, cost,
//! model — or not at all.

use jiff::Timestamp;
use serde::Serialize;
use switchboard_catalog::ModelId;
use switchboard_provider::{ChatMessage, Role};
use switchboard_routing::{EscalationTrigger, Speaker, TranscriptTurn};

/// One recorded history entry
#[derive(Debug, Clone)]
pub struct Turn {
    /// Author of the entry
    pub role: Role,
    /// Entry text
    pub text: String,
    /// When the entry was recorded
    pub timestamp: Timestamp,
    /// Model that produced an assistant entry
    pub model: Option<ModelId>,
    /// Settled cost attributed to this entry (USD)
    pub cost: f64,
}

/// Recorded outcome of one escalation chain run
#[derive(Debug, Clone, Serialize)]
pub struct EscalationOutcome {
    /// Identifier of the chain run
    pub chain_id: String,
    /// What tripped the escalation
    pub trigger: EscalationTrigger,
    /// Capability the chain answered for
    pub capability: String,
    /// Whether any step succeeded
    pub succeeded: bool,
    /// Step keys attempted, in order
    pub steps_tried: Vec<String>,
    /// Cost accumulated across all attempted steps (USD)
    pub cost: f64,
}

/// Mutable per-conversation state
#[derive(Debug)]
pub struct ConversationSession {
    pub(crate) session_id: String,
    pub(crate) primary_model: ModelId,
    pub(crate) history: Vec<Turn>,
    pub(crate) total_cost: f64,
    pub(crate) total_tokens: u64,
    pub(crate) started_at: Timestamp,
    pub(crate) last_activity_at: Timestamp,
    pub(crate) escalation_log: Vec<EscalationOutcome>,
}

impl ConversationSession {
    pub(crate) fn new(session_id: String, primary_model: ModelId) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            primary_model,
            history: Vec::new(),
            total_cost: 0.0,
            total_tokens: 0,
            started_at: now,
            last_activity_at: now,
            escalation_log: Vec::new(),
        }
    }

    /// The model this session is currently sticky to
    pub const fn primary_model(&self) -> ModelId {
        self.primary_model
    }

    /// Commit a completed exchange as one unit
    ///
    /// Cost is clamped at zero so `total_cost` is monotone
    /// non-decreasing no matter what the adapters report.
    pub(crate) fn commit_exchange(&mut self, user_text: &str, response: &str, model: ModelId, cost: f64, tokens: u64) {
        let now = Timestamp::now();
        let cost = cost.max(0.0);

        self.history.push(Turn {
            role: Role::User,
            text: user_text.to_owned(),
            timestamp: now,
            model: None,
            cost: 0.0,
        });
        self.history.push(Turn {
            role: Role::Assistant,
            text: response.to_owned(),
            timestamp: now,
            model: Some(model),
            cost,
        });

        self.total_cost += cost;
        self.total_tokens += tokens;
        self.last_activity_at = now;
    }

    /// Trailing history as wire messages for a backend exchange
    pub(crate) fn chat_tail(&self, tail: usize) -> Vec<ChatMessage> {
        self.history[self.history.len().saturating_sub(tail)..]
            .iter()
            .map(|turn| ChatMessage {
                role: turn.role,
                content: turn.text.clone(),
            })
            .collect()
    }

    /// Borrowed transcript view for context-transfer extraction
    pub(crate) fn transcript(&self) -> Vec<TranscriptTurn<'_>> {
        self.history
            .iter()
            .map(|turn| TranscriptTurn {
                speaker: match turn.role {
                    Role::User => Speaker::User,
                    Role::Assistant => Speaker::Assistant,
                },
                text: &turn.text,
            })
            .collect()
    }

    /// Read-only projection of the session
    pub(crate) fn summary(&self) -> SessionSummary {
        let message_count = self.history.len();
        let duration_secs = (Timestamp::now().as_second() - self.started_at.as_second()).max(0);

        SessionSummary {
            session_id: self.session_id.clone(),
            primary_model: self.primary_model,
            lane: self.primary_model.lane(),
            duration_secs,
            message_count,
            total_cost: self.total_cost,
            total_tokens: self.total_tokens,
            cost_per_message: self.total_cost / message_count.max(1) as f64,
            escalations: self.escalation_log.len(),
        }
    }
}

/// Read-only session projection returned by the summary endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: String,
    /// Current sticky model
    pub primary_model: ModelId,
    /// Lane of the sticky model
    pub lane: &'static str,
    /// Seconds since the session started
    pub duration_secs: i64,
    /// History entries recorded
    pub message_count: usize,
    /// Total settled spend (USD)
    pub total_cost: f64,
    /// Total tokens across all exchanges
    pub total_tokens: u64,
    /// Average spend per history entry
    pub cost_per_message: f64,
    /// Escalation chains run in this session
    pub escalations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_appends_both_roles() {
        let mut session = ConversationSession::new("s1".to_owned(), ModelId::General);
        session.commit_exchange("question", "answer", ModelId::General, 0.5, 30);

        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[1].role, Role::Assistant);
        assert_eq!(session.history[1].model, Some(ModelId::General));
        assert!((session.total_cost - 0.5).abs() < f64::EPSILON);
        assert_eq!(session.total_tokens, 30);
    }

    #[test]
    fn total_cost_never_decreases() {
        let mut session = ConversationSession::new("s1".to_owned(), ModelId::General);
        session.commit_exchange("a", "b", ModelId::General, 1.0, 10);
        session.commit_exchange("c", "d", ModelId::General, -5.0, 10);
        assert!((session.total_cost - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn chat_tail_keeps_most_recent() {
        let mut session = ConversationSession::new("s1".to_owned(), ModelId::General);
        for i in 0..5 {
            session.commit_exchange(&format!("q{i}"), &format!("a{i}"), ModelId::General, 0.0, 0);
        }

        let tail = session.chat_tail(4);
        assert_eq!(tail.len(), 4);
        assert_eq!(tail[0].content, "q3");
        assert_eq!(tail[3].content, "a4");
    }

    #[test]
    fn summary_divides_cost_per_message() {
        let mut session = ConversationSession::new("s1".to_owned(), ModelId::Premium);
        session.commit_exchange("q", "a", ModelId::Premium, 2.0, 100);

        let summary = session.summary();
        assert_eq!(summary.message_count, 2);
        assert!((summary.cost_per_message - 1.0).abs() < f64::EPSILON);
        assert_eq!(summary.lane, "premium-analysis");
    }

    #[test]
    fn empty_summary_does_not_divide_by_zero() {
        let session = ConversationSession::new("s1".to_owned(), ModelId::Free);
        let summary = session.summary();
        assert!(summary.cost_per_message.abs() < f64::EPSILON);
    }
}
