//! Lockout and cooldown arithmetic

use chrono::{DateTime, Duration, Utc};

/// Upper bound on a single lock (one year)
pub const MAX_LOCKOUT_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Whole seconds until `target`, rounded up and never 0 while still pending.
///
/// Returns 0 once `now >= target`.
pub fn remaining_seconds(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (target - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (((millis + 999) / 1000) as u64).max(1)
}

/// When a lock placed at `now` expires
pub fn lock_deadline(now: DateTime<Utc>, lockout_duration_seconds: u64) -> DateTime<Utc> {
    let seconds = lockout_duration_seconds.min(MAX_LOCKOUT_SECONDS) as i64;
    now + Duration::seconds(seconds)
}

/// Whether `failure_count` rejections reach the lockout threshold
pub fn reaches_lockout(failure_count: u32, max_attempts: u32) -> bool {
    failure_count >= max_attempts
}

pub fn remaining_attempts(failure_count: u32, max_attempts: u32) -> u32 {
    max_attempts.saturating_sub(failure_count)
}
