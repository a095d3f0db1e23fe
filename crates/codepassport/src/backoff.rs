//! Exponential backoff used by the generation worker after loop-level failures.

use std::time::Duration;

/// Returns the delay to use after `current`: twice `current`, clamped to `max`.
///
/// Overflowing the `Duration` range also yields `max`.
pub fn next_delay(current: Duration, max: Duration) -> Duration {
    match current.checked_mul(2) {
        Some(doubled) if doubled <= max => doubled,
        _ => max,
    }
}
