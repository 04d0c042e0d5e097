#![allow(clippy::must_use_candidate)]

pub mod catalog;
mod env;
pub mod escalation;
mod loader;
pub mod provider;
pub mod routing;
pub mod server;
pub mod session;

use serde::Deserialize;

pub use catalog::*;
pub use escalation::*;
pub use provider::*;
pub use routing::*;
pub use server::*;
pub use session::*;

/// Top-level Switchboard configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream provider credentials and endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Model catalog overrides
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Routing and model-switch policy
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Escalation detection and chain tables
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Session lifecycle policy
    #[serde(default)]
    pub session: SessionConfig,
}
