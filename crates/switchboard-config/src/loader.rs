use std::path::Path;

use crate::{CapabilityKind, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the escalation tables are inconsistent or
    /// policy values are out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_escalation_tables()?;
        self.validate_policy_values()?;
        Ok(())
    }

    /// Every chain step must resolve in the capability table, and each
    /// capability entry must carry the fields its kind requires
    fn validate_escalation_tables(&self) -> anyhow::Result<()> {
        for (capability, steps) in &self.escalation.chains {
            if steps.is_empty() {
                anyhow::bail!("escalation chain '{capability}' has no steps");
            }
            for step in steps {
                if !self.escalation.capabilities.contains_key(step) {
                    anyhow::bail!("escalation chain '{capability}' references unknown step '{step}'");
                }
            }
        }

        for (key, step) in &self.escalation.capabilities {
            match step.kind {
                CapabilityKind::ProviderModel => {
                    if step.model.as_deref().is_none_or(str::is_empty) {
                        anyhow::bail!("capability step '{key}' is provider_model but names no model");
                    }
                }
                CapabilityKind::LocalClock | CapabilityKind::LocalSynth => {
                    if step.model.is_some() {
                        anyhow::bail!("capability step '{key}' does not take a model");
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_policy_values(&self) -> anyhow::Result<()> {
        if self.escalation.auto_approve_threshold < 0.0 {
            anyhow::bail!("escalation.auto_approve_threshold must not be negative");
        }
        if self.routing.switch.auto_approve_threshold < 0.0 {
            anyhow::bail!("routing.switch.auto_approve_threshold must not be negative");
        }
        if self.session.idle_timeout_secs == 0 {
            anyhow::bail!("session.idle_timeout_secs must be greater than 0");
        }
        if self.session.history_tail == 0 {
            anyhow::bail!("session.history_tail must be greater than 0");
        }

        if let Some(ref provider) = self.providers.anthropic
            && provider.timeout_secs == 0
        {
            anyhow::bail!("providers.anthropic.timeout_secs must be greater than 0");
        }
        if let Some(ref provider) = self.providers.openai_compat
            && provider.timeout_secs == 0
        {
            anyhow::bail!("providers.openai_compat.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
