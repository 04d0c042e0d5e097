use serde::Deserialize;

/// Session lifecycle policy
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle duration after which a session is evicted, in seconds
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Interval between reaper sweeps, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// How many trailing history turns are replayed to the backend on
    /// each exchange
    #[serde(default = "default_history_tail")]
    pub history_tail: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            history_tail: default_history_tail(),
        }
    }
}

const fn default_idle_timeout_secs() -> u64 {
    3600
}

const fn default_sweep_interval_secs() -> u64 {
    300
}

const fn default_history_tail() -> usize {
    20
}
