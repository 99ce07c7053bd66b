// Rate limiting hook
//
// Extension point only: the service consults the limiter before doing any
// work on an upload, but ships no throttling policy. Deployments plug in
// their own implementation.

use crate::pipeline::RequestContext;

/// Decides whether a request should be rejected with 429.
pub trait RateLimiter: Send + Sync {
    fn is_rate_limited(&self, ctx: &RequestContext) -> bool;
}

/// Default limiter: never limits.
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn is_rate_limited(&self, _ctx: &RequestContext) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_limiter_never_limits() {
        let limiter = NoopRateLimiter;
        let ctx = RequestContext::new("POST", "/upload", "127.0.0.1:1");
        assert!(!limiter.is_rate_limited(&ctx));
    }
}
