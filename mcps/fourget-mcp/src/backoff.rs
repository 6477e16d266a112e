//! Exponential backoff with jitter

use std::time::Duration;

use rand::Rng;

use crate::config::saturating_duration;

/// Smallest delay ever returned, so jitter can never produce a busy retry
pub const MIN_DELAY_SECS: f64 = 0.1;

/// Fraction of the capped delay added or removed as jitter
pub const JITTER_FRACTION: f64 = 0.25;

/// Delay before retry number `attempt` (0-based)
///
/// `base * 2^attempt`, capped at `max`, then scaled by a uniform factor in
/// `[0.75, 1.25]`, and never below [`MIN_DELAY_SECS`].
pub fn backoff_delay(attempt: u32, base_secs: f64, max_secs: f64) -> Duration {
    let unit = rand::rng().random_range(-1.0..=1.0);
    jittered_delay(attempt, base_secs, max_secs, unit)
}

/// Deterministic core of [`backoff_delay`]; `unit` is the jitter position in `[-1, 1]`
pub fn jittered_delay(attempt: u32, base_secs: f64, max_secs: f64, unit: f64) -> Duration {
    // 2^attempt saturates to infinity for large attempts, which the cap absorbs
    let raw = base_secs * 2f64.powi(attempt.min(i32::MAX as u32) as i32);
    let capped = raw.min(max_secs);
    let delay = capped + capped * JITTER_FRACTION * unit.clamp(-1.0, 1.0);
    saturating_duration(delay.max(MIN_DELAY_SECS))
}
