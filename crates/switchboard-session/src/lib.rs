//! Session management for sticky conversations
//!
//! Owns the arena of live sessions. Each session is guarded by its own
//! lock, so turns for one session serialize (later arrivals queue behind
//! the in-flight turn) while different sessions proceed fully in
//! parallel. The catalog and chain tables are read-only after startup
//! and shared without synchronization.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod executor;
mod session;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use jiff::Timestamp;
use serde::Serialize;
use switchboard_catalog::Catalog;
use switchboard_config::{Config, EscalationConfig, SessionConfig, SwitchConfig};
use switchboard_provider::ProviderSet;
use switchboard_routing::{ChainTable, ChainTableError, RoutingDecision, classify};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub use error::SessionError;
pub use executor::{EscalationReport, TurnOutcome};
pub use session::{ConversationSession, EscalationOutcome, SessionSummary, Turn};

/// Shared state behind the session manager
pub(crate) struct Inner {
    pub(crate) sessions: DashMap<String, Arc<Mutex<ConversationSession>>>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) providers: ProviderSet,
    pub(crate) chains: ChainTable,
    pub(crate) switch_policy: SwitchConfig,
    pub(crate) escalation_policy: EscalationConfig,
    pub(crate) session_policy: SessionConfig,
}

/// Result of starting a conversation
#[derive(Debug)]
pub struct StartedSession {
    /// Identifier for subsequent turns
    pub session_id: String,
    /// Initial routing decision binding the session to its model
    pub decision: RoutingDecision,
}

/// Aggregate view across all live sessions
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Sessions currently in the arena
    pub active_sessions: usize,
    /// Total spend across live sessions (USD)
    pub total_cost: f64,
    /// Total history entries across live sessions
    pub total_turns: usize,
}

/// Owner of all conversation sessions
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Build the manager from configuration and pre-built collaborators
    pub fn new(catalog: Arc<Catalog>, providers: ProviderSet, config: &Config) -> Result<Self, ChainTableError> {
        let chains = ChainTable::from_config(&config.escalation)?;

        Ok(Self {
            inner: Arc::new(Inner {
                sessions: DashMap::new(),
                catalog,
                providers,
                chains,
                switch_policy: config.routing.switch.clone(),
                escalation_policy: config.escalation.clone(),
                session_policy: config.session.clone(),
            }),
        })
    }

    /// Start a conversation: classify the opening text and bind a new
    /// session to the selected model
    ///
    /// No backend call happens here; the first `turn` executes. An
    /// explicit `session_id` replaces any previous session under that id.
    pub fn start(&self, text: &str, session_id: Option<String>) -> StartedSession {
        let session_id = session_id.unwrap_or_else(short_id);
        let decision = classify(text, &self.inner.catalog);

        tracing::info!(
            session_id = %session_id,
            model = %decision.target,
            lane = decision.target.lane(),
            reason = %decision.reason,
            "conversation session started"
        );

        let session = ConversationSession::new(session_id.clone(), decision.target);
        self.inner
            .sessions
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));

        StartedSession { session_id, decision }
    }

    /// Process one turn for a session
    ///
    /// An unknown or expired id is treated as an implicit fresh start,
    /// never an error. At most one turn per session is in flight at a
    /// time; concurrent arrivals queue on the session lock in order.
    pub async fn turn(&self, session_id: &str, text: &str) -> TurnOutcome {
        let handle = self.session_handle(session_id, text);

        let mut session = handle.lock().await;
        session.last_activity_at = Timestamp::now();

        executor::run_turn(&self.inner, &mut session, text).await
    }

    /// Read-only projection of a session
    pub async fn summary(&self, session_id: &str) -> Result<SessionSummary, SessionError> {
        let handle = self
            .inner
            .sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SessionError::NotFound {
                session_id: session_id.to_owned(),
            })?;

        let session = handle.lock().await;
        Ok(session.summary())
    }

    /// Aggregate stats across live sessions
    pub async fn stats(&self) -> EngineStats {
        // Collect handles first; awaiting while iterating the map would
        // hold a shard lock across a suspension point
        let handles: Vec<Arc<Mutex<ConversationSession>>> = self
            .inner
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut stats = EngineStats {
            active_sessions: handles.len(),
            total_cost: 0.0,
            total_turns: 0,
        };

        for handle in &handles {
            let session = handle.lock().await;
            stats.total_cost += session.total_cost;
            stats.total_turns += session.history.len();
        }

        stats
    }

    /// The shared model catalog
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Spawn the background reaper evicting idle sessions
    ///
    /// Sessions idle past the configured timeout are dropped from the
    /// arena; a busy session is never evicted mid-turn. Runs until the
    /// cancellation token fires.
    pub fn spawn_reaper(&self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(inner.session_policy.sweep_interval_secs));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => reap_idle(&inner),
                }
            }
        })
    }

    fn session_handle(&self, session_id: &str, text: &str) -> Arc<Mutex<ConversationSession>> {
        if let Some(entry) = self.inner.sessions.get(session_id) {
            return Arc::clone(entry.value());
        }

        // Unknown id: implicit fresh start bound by classification
        let decision = classify(text, &self.inner.catalog);
        tracing::info!(
            session_id = %session_id,
            model = %decision.target,
            "unknown session id, starting fresh session"
        );

        let created = Arc::new(Mutex::new(ConversationSession::new(
            session_id.to_owned(),
            decision.target,
        )));

        // A racing turn for the same new id keeps whichever entry lands first
        Arc::clone(
            self.inner
                .sessions
                .entry(session_id.to_owned())
                .or_insert(created)
                .value(),
        )
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active_sessions", &self.inner.sessions.len())
            .finish_non_exhaustive()
    }
}

/// Evict sessions idle past the configured timeout
fn reap_idle(inner: &Inner) {
    let now = Timestamp::now().as_second();
    let timeout = i64::try_from(inner.session_policy.idle_timeout_secs).unwrap_or(i64::MAX);

    inner.sessions.retain(|session_id, handle| {
        // A locked session has a turn in flight; leave it alone
        let Ok(session) = handle.try_lock() else {
            return true;
        };

        let idle = now - session.last_activity_at.as_second();
        let keep = idle < timeout;
        if !keep {
            tracing::info!(session_id = %session_id, idle_secs = idle, "evicting idle session");
        }
        keep
    });
}

/// Short opaque session identifier
fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_owned()
}
