//! Turn pipeline and escalation chain execution
//!
//! One turn runs: pre-call escalation check, stay-or-switch evaluation,
//! the backend exchange, post-call failure detection, and chain
//! recovery. Session state is mutated only at commit points, so a
//! cancelled or failed turn never leaves the session half-updated.

use jiff::Zoned;
use serde::Serialize;
use switchboard_catalog::ModelId;
use switchboard_routing::{
    ChainPlan, EscalationDecision, EscalationTrigger, StepAction, capability, detect, evaluate_switch,
};

use crate::Inner;
use crate::session::{ConversationSession, EscalationOutcome};

/// Result of one processed turn, always well-formed
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text to surface to the caller
    pub response_text: String,
    /// Sticky model after the turn
    pub model: ModelId,
    /// Wire-level model id or chain step that actually answered
    pub model_used: String,
    /// Settled cost of the turn, escalation steps included (USD)
    pub cost: f64,
    /// Whether the sticky model changed during the turn
    pub switched: bool,
    /// Escalation activity, when any occurred
    pub escalation: Option<EscalationReport>,
}

/// Escalation detail attached to a turn outcome
#[derive(Debug, Clone, Serialize)]
pub struct EscalationReport {
    /// What tripped the escalation
    pub trigger: EscalationTrigger,
    /// Capability the decision targeted
    pub capability: String,
    /// Detector reasoning
    pub reasoning: String,
    /// Chain run identifier, when a chain ran
    pub chain_id: Option<String>,
    /// Step keys attempted, in order
    pub steps_tried: Vec<String>,
    /// Chain success, when a chain ran
    pub succeeded: Option<bool>,
    /// True when the chain needs caller approval before running
    pub approval_required: bool,
}

/// Mutable state of one chain run; terminates after at most
/// `ordered_steps.len()` attempts
struct EscalationChainRun {
    chain_id: String,
    ordered_steps: Vec<String>,
    current_step_index: usize,
    accumulated_cost: f64,
    succeeded: bool,
}

/// Result of walking an escalation chain
struct ChainOutcome {
    chain_id: String,
    succeeded: bool,
    response: Option<String>,
    cost: f64,
    tokens: u64,
    steps_tried: Vec<String>,
    answered_by: Option<String>,
}

pub(crate) async fn run_turn(inner: &Inner, session: &mut ConversationSession, text: &str) -> TurnOutcome {
    // Pre-call check on the raw query
    let pre = detect(text, None, session.primary_model, &inner.catalog, &inner.escalation_policy);

    let mut pending_escalation: Option<EscalationReport> = None;
    if pre.should_escalate {
        if pre.auto_approved(inner.escalation_policy.auto_approve_threshold) {
            return escalate(inner, session, text, &pre, false).await;
        }
        // Above threshold and not a mandatory trigger: surface the
        // decision, keep answering on the normal path
        tracing::info!(
            session_id = %session.session_id,
            capability = %pre.target_capability,
            estimated_cost = pre.estimated_cost,
            "escalation requires approval, continuing without it"
        );
        pending_escalation = Some(EscalationReport {
            trigger: pre.trigger,
            capability: pre.target_capability.clone(),
            reasoning: pre.reasoning.clone(),
            chain_id: None,
            steps_tried: Vec::new(),
            succeeded: None,
            approval_required: true,
        });
    }

    // Stay-or-switch evaluation
    let decision = evaluate_switch(session.primary_model, text, &inner.catalog);

    let mut switched = false;
    let mut transfer_payload = None;
    if decision.requires_switch {
        if decision.estimated_cost > inner.switch_policy.auto_approve_threshold {
            tracing::warn!(
                session_id = %session.session_id,
                estimated_cost = decision.estimated_cost,
                "switch cost above auto-approval threshold, proceeding"
            );
        }

        let payload = switchboard_routing::build_transfer(
            session.primary_model,
            session.total_cost,
            session.history.len(),
            &session.transcript(),
            text,
            inner.catalog.get(decision.target),
            &inner.switch_policy,
        );

        tracing::info!(
            session_id = %session.session_id,
            from = %session.primary_model,
            to = %decision.target,
            payload_chars = payload.len(),
            "model switch executed with context transfer"
        );

        session.primary_model = decision.target;
        switched = true;
        transfer_payload = Some(payload);
    }

    // The exchange itself. A switched turn sends the compressed transfer
    // payload instead of the raw history.
    let descriptor = inner.catalog.get(session.primary_model);
    let adapter = inner.providers.for_kind(descriptor.provider_kind);

    let (history, message) = match transfer_payload {
        Some(ref payload) => (Vec::new(), payload.as_str()),
        None => (session.chat_tail(inner.session_policy.history_tail), text),
    };

    match adapter.execute(descriptor, &history, message).await {
        Ok(exchange) => {
            // Post-call check for refusal/limitation phrasing
            let post = detect(
                text,
                Some(&exchange.content),
                session.primary_model,
                &inner.catalog,
                &inner.escalation_policy,
            );

            if post.should_escalate && post.trigger == EscalationTrigger::BackendFailure {
                tracing::info!(
                    session_id = %session.session_id,
                    model = %session.primary_model,
                    "response admits a limitation, escalating"
                );

                let plan = inner.chains.plan(&post.target_capability);
                let chain = run_chain(inner, &plan, text).await;
                let cost = exchange.actual_cost + chain.cost;
                let tokens = u64::from(exchange.input_tokens) + u64::from(exchange.output_tokens) + chain.tokens;

                session.escalation_log.push(log_entry(&plan, &chain, post.trigger));

                // Fall back to the original (refusing) response if no
                // chain step produced anything better
                let response_text = chain.response.clone().unwrap_or_else(|| exchange.content.clone());
                let model_used = chain.answered_by.clone().unwrap_or(exchange.model_used);

                session.commit_exchange(text, &response_text, session.primary_model, cost, tokens);

                return TurnOutcome {
                    response_text,
                    model: session.primary_model,
                    model_used,
                    cost,
                    switched,
                    escalation: Some(report_from_chain(&post, &chain)),
                };
            }

            let tokens = u64::from(exchange.input_tokens) + u64::from(exchange.output_tokens);
            session.commit_exchange(text, &exchange.content, session.primary_model, exchange.actual_cost, tokens);

            TurnOutcome {
                response_text: exchange.content,
                model: session.primary_model,
                model_used: exchange.model_used,
                cost: exchange.actual_cost,
                switched,
                escalation: pending_escalation,
            }
        }
        Err(e) => {
            // Never retried on the same model: the failure becomes an
            // ordinary BackendFailure escalation
            tracing::warn!(
                session_id = %session.session_id,
                model = %session.primary_model,
                error = %e,
                "backend exchange failed, escalating"
            );

            let failure = EscalationDecision {
                should_escalate: true,
                trigger: EscalationTrigger::BackendFailure,
                target_capability: capability::WEB_CAPABILITIES.to_owned(),
                reasoning: format!("backend failure: {e}"),
                confidence: 0.95,
                estimated_cost: inner.escalation_policy.recovery_cost,
            };

            escalate_inner(inner, session, text, &failure, switched).await
        }
    }
}

/// Run an auto-approved escalation as the whole turn
async fn escalate(
    inner: &Inner,
    session: &mut ConversationSession,
    text: &str,
    decision: &EscalationDecision,
    switched: bool,
) -> TurnOutcome {
    tracing::info!(
        session_id = %session.session_id,
        trigger = %decision.trigger,
        capability = %decision.target_capability,
        "escalation triggered"
    );
    escalate_inner(inner, session, text, decision, switched).await
}

async fn escalate_inner(
    inner: &Inner,
    session: &mut ConversationSession,
    text: &str,
    decision: &EscalationDecision,
    switched: bool,
) -> TurnOutcome {
    let plan = inner.chains.plan(&decision.target_capability);
    let chain = run_chain(inner, &plan, text).await;

    session.escalation_log.push(log_entry(&plan, &chain, decision.trigger));

    let response_text = chain.response.clone().unwrap_or_else(|| exhausted_message(&chain, text));
    let model_used = chain
        .answered_by
        .clone()
        .unwrap_or_else(|| "escalation-exhausted".to_owned());

    // The turn still commits on failure, with whatever the attempts cost
    session.commit_exchange(text, &response_text, session.primary_model, chain.cost, chain.tokens);

    TurnOutcome {
        response_text,
        model: session.primary_model,
        model_used,
        cost: chain.cost,
        switched,
        escalation: Some(report_from_chain(decision, &chain)),
    }
}

/// Walk the chain steps in order, at most once each, until one succeeds
///
/// Cost accumulates across every attempted step regardless of outcome.
async fn run_chain(inner: &Inner, plan: &ChainPlan, query: &str) -> ChainOutcome {
    let mut run = EscalationChainRun {
        chain_id: plan.chain_id.clone(),
        ordered_steps: plan.steps.iter().map(|s| s.key.clone()).collect(),
        current_step_index: 0,
        accumulated_cost: 0.0,
        succeeded: false,
    };

    let mut steps_tried = Vec::new();
    let mut tokens: u64 = 0;

    for (index, step) in plan.steps.iter().enumerate() {
        run.current_step_index = index;
        steps_tried.push(step.key.clone());

        tracing::info!(
            chain_id = %run.chain_id,
            step = %step.key,
            attempt = index + 1,
            of = run.ordered_steps.len(),
            "executing escalation step"
        );

        match step.action {
            StepAction::LocalClock => {
                run.succeeded = true;
                return ChainOutcome {
                    succeeded: run.succeeded,
                    chain_id: run.chain_id,
                    response: Some(clock_answer(query)),
                    cost: run.accumulated_cost,
                    tokens,
                    steps_tried,
                    answered_by: Some(step.key.clone()),
                };
            }
            StepAction::LocalSynth { cost } => {
                run.accumulated_cost += cost;
                run.succeeded = true;
                return ChainOutcome {
                    succeeded: run.succeeded,
                    chain_id: run.chain_id,
                    response: Some(synth_answer(query)),
                    cost: run.accumulated_cost,
                    tokens,
                    steps_tried,
                    answered_by: Some(step.key.clone()),
                };
            }
            StepAction::Model(id) => {
                let descriptor = inner.catalog.get(id);
                let adapter = inner.providers.for_kind(descriptor.provider_kind);

                match adapter.execute(descriptor, &[], query).await {
                    Ok(exchange) => {
                        run.accumulated_cost += exchange.actual_cost;
                        tokens += u64::from(exchange.input_tokens) + u64::from(exchange.output_tokens);
                        run.succeeded = true;
                        return ChainOutcome {
                            succeeded: run.succeeded,
                            chain_id: run.chain_id,
                            response: Some(exchange.content),
                            cost: run.accumulated_cost,
                            tokens,
                            steps_tried,
                            answered_by: Some(exchange.model_used),
                        };
                    }
                    Err(e) => {
                        tracing::warn!(
                            chain_id = %run.chain_id,
                            step = %step.key,
                            error = %e,
                            "escalation step failed"
                        );
                    }
                }
            }
        }
    }

    tracing::warn!(
        chain_id = %run.chain_id,
        steps = run.current_step_index + 1,
        "escalation chain exhausted without success"
    );

    ChainOutcome {
        succeeded: run.succeeded,
        chain_id: run.chain_id,
        response: None,
        cost: run.accumulated_cost,
        tokens,
        steps_tried,
        answered_by: None,
    }
}

fn log_entry(plan: &ChainPlan, chain: &ChainOutcome, trigger: EscalationTrigger) -> EscalationOutcome {
    EscalationOutcome {
        chain_id: chain.chain_id.clone(),
        trigger,
        capability: plan.capability.clone(),
        succeeded: chain.succeeded,
        steps_tried: chain.steps_tried.clone(),
        cost: chain.cost,
    }
}

fn report_from_chain(decision: &EscalationDecision, chain: &ChainOutcome) -> EscalationReport {
    EscalationReport {
        trigger: decision.trigger,
        capability: decision.target_capability.clone(),
        reasoning: decision.reasoning.clone(),
        chain_id: Some(chain.chain_id.clone()),
        steps_tried: chain.steps_tried.clone(),
        succeeded: Some(chain.succeeded),
        approval_required: false,
    }
}

/// Answer a date/time query from the system clock
fn clock_answer(query: &str) -> String {
    let now = Zoned::now();
    if query.to_lowercase().contains("time") {
        format!("It is currently {}.", now.strftime("%H:%M %Z on %A, %B %d, %Y"))
    } else {
        format!("Today is {}.", now.strftime("%A, %B %d, %Y"))
    }
}

/// Synthesized stand-in for the live search backend
fn synth_answer(query: &str) -> String {
    format!("Web search result: this request would be resolved by the live search backend. Query: \"{query}\"")
}

fn exhausted_message(chain: &ChainOutcome, query: &str) -> String {
    format!(
        "Escalation chain failed after {} attempts; unable to process the request: \"{query}\"",
        chain.steps_tried.len()
    )
}
