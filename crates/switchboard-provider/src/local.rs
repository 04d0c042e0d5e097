//! In-process adapter for platform commands
//!
//! Resolves status and help queries from the catalog without any
//! network call; every exchange is free.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use switchboard_catalog::{Catalog, ModelDescriptor, ProviderKind};

use crate::error::ProviderError;
use crate::types::{ChatMessage, ExchangeResult};
use crate::ProviderAdapter;

/// Local platform command adapter
pub struct LocalProvider {
    catalog: Arc<Catalog>,
}

impl LocalProvider {
    /// Create a local adapter over the shared catalog
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn status_report(&self) -> String {
        let mut report = String::from("Switchboard platform status: operational\n\nAvailable model lanes:\n");
        for descriptor in self.catalog.descriptors() {
            let _ = writeln!(
                report,
                "  {} ({}): ${}/{} per 1k tokens in/out",
                descriptor.id,
                descriptor.id.lane(),
                descriptor.cost_per_1k_input,
                descriptor.cost_per_1k_output,
            );
        }
        report.push_str("\nConversations stay sticky to one model; premium switches and escalations are automatic.");
        report
    }

    fn help_text() -> String {
        "Switchboard commands: 'switchboard status' for the platform report, \
         'help' for this text. Anything else is routed to the best-fit model lane."
            .to_owned()
    }
}

#[async_trait]
impl ProviderAdapter for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn execute(
        &self,
        model: &ModelDescriptor,
        _history: &[ChatMessage],
        message: &str,
    ) -> Result<ExchangeResult, ProviderError> {
        let start = Instant::now();
        let lower = message.to_lowercase();

        let content = if lower.contains("status") {
            self.status_report()
        } else if lower.contains("help") {
            Self::help_text()
        } else {
            format!("Platform command processed locally: {message}")
        };

        Ok(ExchangeResult {
            input_tokens: message.split_whitespace().count() as u32,
            output_tokens: content.split_whitespace().count() as u32,
            model_used: model.upstream_id.clone(),
            actual_cost: 0.0,
            latency: start.elapsed(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_catalog::ModelId;

    fn provider() -> (LocalProvider, Arc<Catalog>) {
        let catalog = Arc::new(Catalog::builtin());
        (LocalProvider::new(Arc::clone(&catalog)), catalog)
    }

    #[tokio::test]
    async fn status_command_lists_lanes() {
        let (provider, catalog) = provider();
        let result = provider
            .execute(catalog.get(ModelId::Local), &[], "switchboard status")
            .await
            .unwrap();
        assert!(result.content.contains("premium-analysis"));
        assert!(result.actual_cost.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unknown_command_is_acknowledged() {
        let (provider, catalog) = provider();
        let result = provider
            .execute(catalog.get(ModelId::Local), &[], "deploy the thing")
            .await
            .unwrap();
        assert!(result.content.contains("deploy the thing"));
        assert_eq!(result.model_used, "switchboard-local");
    }
}
