// Request pipeline module - per-request context for logging and hooks

use uuid::Uuid;

/// Context describing one HTTP request as it flows through the service.
///
/// Carries a unique request ID (UUID v4) used in structured log fields and
/// handed to the rate-limit hook.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    remote_addr: String,
}

impl RequestContext {
    pub fn new(method: &str, path: &str, remote_addr: &str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: method.to_string(),
            path: path.to_string(),
            remote_addr: remote_addr.to_string(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }
}
