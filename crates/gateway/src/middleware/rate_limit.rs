//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use payscope_common::{errors::AppError, metrics};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Shared limiter plus the configured rate for error reporting
#[derive(Clone)]
pub struct WriteLimiter {
    limiter: Arc<GlobalRateLimiter>,
    requests_per_second: u32,
}

/// Create a new rate limiter; zero values are raised to one
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> WriteLimiter {
    let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst).unwrap_or(rate);
    let quota = Quota::per_second(rate).allow_burst(burst);

    WriteLimiter {
        limiter: Arc::new(RateLimiter::direct(quota)),
        requests_per_second: rate.get(),
    }
}

/// Rate limiting middleware; safe methods pass through untouched
pub async fn rate_limit_middleware(
    State(limiter): State<WriteLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method().is_safe() {
        return Ok(next.run(request).await);
    }

    match limiter.limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            metrics::record_rate_limited("writes");
            Err(AppError::RateLimited {
                limit: limiter.requests_per_second,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = create_rate_limiter(100, 200);
        assert!(limiter.limiter.check().is_ok());
    }

    #[test]
    fn test_burst_exhaustion() {
        let limiter = create_rate_limiter(1, 2);
        assert!(limiter.limiter.check().is_ok());
        assert!(limiter.limiter.check().is_ok());
        assert!(limiter.limiter.check().is_err());
    }

    #[test]
    fn test_zero_rate_is_raised() {
        let limiter = create_rate_limiter(0, 0);
        assert_eq!(limiter.requests_per_second, 1);
        assert!(limiter.limiter.check().is_ok());
    }
}
