use thiserror::Error;

/// Errors from a backend exchange
///
/// These are ordinary data consumed by the escalation detector; a
/// failed exchange is a routing signal, never a crash.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The call exceeded the configured deadline
    #[error("provider timed out after {seconds}s")]
    Timeout {
        /// Deadline that was exceeded
        seconds: u64,
    },

    /// The backend answered with a non-success status
    #[error("provider rejected the request with status {status}: {detail}")]
    Rejected {
        /// HTTP status code returned upstream
        status: u16,
        /// Response body or reason phrase
        detail: String,
    },

    /// The request never produced a response (DNS, TLS, connect errors)
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered but the payload was not usable
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// No credentials or endpoint configured for this backend
    #[error("provider '{provider}' is not configured")]
    NotConfigured {
        /// Backend kind missing configuration
        provider: &'static str,
    },
}

impl ProviderError {
    /// Map a reqwest failure onto the error taxonomy
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { seconds: timeout_secs }
        } else {
            Self::Transport(err.to_string())
        }
    }
}
