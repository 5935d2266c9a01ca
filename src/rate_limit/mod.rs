//! Rate limiting for outbound LLM requests.
//!
//! Free-tier backends throttle aggressively, so every client paces its own
//! requests and backs off exponentially between retries.

mod pacer;

pub use pacer::RequestPacer;

use std::time::Duration;

/// Longest delay any configured seconds value may produce (one hour).
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Convert configured seconds to a `Duration`.
///
/// Negative values and NaN become zero; anything past `MAX_DELAY_SECS`,
/// infinity included, is capped.
pub fn delay_from_secs(secs: f64) -> Duration {
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.clamp(0.0, MAX_DELAY_SECS))
}

/// Calculate exponential backoff delay for a given attempt.
///
/// `attempt` is zero-based; the result is clamped to `[min, max]`.
pub fn backoff_delay(attempt: u32, min: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    min.saturating_mul(factor).clamp(min, max.max(min))
}

/// Parse a `Retry-After` header value in seconds (capped at 60s).
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(60)))
}
