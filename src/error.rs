// Error types module

use std::fmt;

/// Pipeline stage in which an upstream failure occurred.
///
/// Attached to `ServiceError::Upstream` so that store and codec failures
/// always carry the phase that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Decode,
    Composite,
    Encode,
    Store,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Download => "download",
            Stage::Decode => "decode",
            Stage::Composite => "composite",
            Stage::Encode => "encode",
            Stage::Store => "store",
        }
    }
}

/// Centralized error type for the image service
///
/// Categorizes errors into the taxonomy used for HTTP status mapping:
/// caller mistakes, missing objects, rate limiting, upstream failures,
/// and request deadline overruns.
#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Malformed JSON, missing field, disallowed MIME type, invalid base64,
    /// oversize payload, or signature mismatch
    BadRequest(String),

    /// Referenced object path absent in the store
    NotFound(String),

    /// Request rejected by the rate-limit hook
    RateLimited,

    /// Store or codec failure not attributable to caller input
    Upstream { stage: Stage, message: String },

    /// Request exceeded its deadline
    Timeout { seconds: u64 },
}

impl ServiceError {
    pub fn upstream(stage: Stage, message: impl Into<String>) -> Self {
        ServiceError::Upstream {
            stage,
            message: message.into(),
        }
    }

    /// Maps errors to HTTP status codes
    ///
    /// Status mapping:
    /// - BadRequest → 400
    /// - NotFound → 404
    /// - RateLimited → 429
    /// - Upstream → 500
    /// - Timeout → 504
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::RateLimited => 429,
            ServiceError::Upstream { .. } => 500,
            ServiceError::Timeout { .. } => 504,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::BadRequest(msg) => write!(f, "{}", msg),
            ServiceError::NotFound(msg) => write!(f, "{}", msg),
            ServiceError::RateLimited => write!(f, "Too many requests"),
            ServiceError::Upstream { stage, message } => {
                write!(f, "{} failed: {}", stage.as_str(), message)
            }
            ServiceError::Timeout { seconds } => {
                write!(f, "Request timed out after {}s", seconds)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::BadRequest("bad".into()).status(), 400);
        assert_eq!(ServiceError::NotFound("gone".into()).status(), 404);
        assert_eq!(ServiceError::RateLimited.status(), 429);
        assert_eq!(ServiceError::upstream(Stage::Encode, "oops").status(), 500);
        assert_eq!(ServiceError::Timeout { seconds: 30 }.status(), 504);
    }

    #[test]
    fn test_upstream_display_names_stage() {
        let err = ServiceError::upstream(Stage::Download, "connection reset");
        assert_eq!(err.to_string(), "download failed: connection reset");

        let err = ServiceError::upstream(Stage::Store, "access denied");
        assert_eq!(err.to_string(), "store failed: access denied");
    }

    #[test]
    fn test_bad_request_display_is_message() {
        let err = ServiceError::BadRequest("Invalid image content".into());
        assert_eq!(err.to_string(), "Invalid image content");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServiceError>();
    }
}
