//! Provider adapters: one exchange against a backend per call
//!
//! The core never talks HTTP directly; it hands a model descriptor and
//! message history to an adapter and gets back token counts and text,
//! or a distinguishable error. One implementation per
//! `ProviderKind`, selected by tag.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod anthropic;
mod error;
pub mod local;
pub mod openai;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_catalog::{Catalog, ModelDescriptor, ProviderKind};
use switchboard_config::ProvidersConfig;

pub use error::ProviderError;
pub use types::{ChatMessage, ExchangeResult, Role};

/// Trait implemented by each backend adapter
///
/// Adapters are stateless and reentrant; one instance serves concurrent
/// exchanges for different sessions without coordination.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which descriptor tag this adapter serves
    fn kind(&self) -> ProviderKind;

    /// Run one exchange: prior history plus a new user message
    async fn execute(
        &self,
        model: &ModelDescriptor,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<ExchangeResult, ProviderError>;
}

/// The full set of adapters, selected by `ProviderKind`
pub struct ProviderSet {
    anthropic: Arc<dyn ProviderAdapter>,
    openai_compat: Arc<dyn ProviderAdapter>,
    local: Arc<dyn ProviderAdapter>,
}

impl ProviderSet {
    /// Assemble a set from explicit adapters (used by tests to inject
    /// scripted backends)
    pub fn new(
        anthropic: Arc<dyn ProviderAdapter>,
        openai_compat: Arc<dyn ProviderAdapter>,
        local: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            anthropic,
            openai_compat,
            local,
        }
    }

    /// Build all adapters from configuration
    pub fn from_config(config: &ProvidersConfig, catalog: &Arc<Catalog>) -> Self {
        Self {
            anthropic: Arc::new(anthropic::AnthropicProvider::new(config.anthropic.as_ref())),
            openai_compat: Arc::new(openai::OpenAiCompatProvider::new(config.openai_compat.as_ref())),
            local: Arc::new(local::LocalProvider::new(Arc::clone(catalog))),
        }
    }

    /// Select the adapter serving a provider kind
    pub fn for_kind(&self, kind: ProviderKind) -> &dyn ProviderAdapter {
        match kind {
            ProviderKind::Anthropic => self.anthropic.as_ref(),
            ProviderKind::OpenAiCompat => self.openai_compat.as_ref(),
            ProviderKind::Local => self.local.as_ref(),
        }
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet").finish_non_exhaustive()
    }
}
