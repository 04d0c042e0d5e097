use http::StatusCode;
use switchboard_core::HttpError;
use thiserror::Error;

/// Errors surfaced by the session manager
///
/// Deliberately small: backend failures and exhausted escalation chains
/// are ordinary turn outcomes, not errors, so the session stays usable
/// after every turn.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Summary requested for an unknown or expired session
    ///
    /// Only read-only projections raise this; a turn against an unknown
    /// id transparently starts a fresh session instead.
    #[error("session not found: {session_id}")]
    NotFound {
        /// The id that was looked up
        session_id: String,
    },
}

impl HttpError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::NotFound { .. } => "session_not_found",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}
