use http::StatusCode;

/// Trait for domain errors that can be rendered as HTTP responses
///
/// Implemented by each feature crate's error type so the server layer
/// can map domain failures to wire responses without the feature crates
/// depending on axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `session_not_found`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Standard JSON error body shared by all endpoints
pub fn error_body(error: &dyn HttpError) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "type": error.error_type(),
            "message": error.client_message(),
        }
    })
}
