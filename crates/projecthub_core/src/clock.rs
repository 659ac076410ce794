//! Wall-clock helpers in epoch milliseconds.
//!
//! Services take `now_ms` as a parameter; only outer callers read the clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds in one UTC day.
pub const DAY_MS: i64 = 24 * HOUR_MS;
/// Milliseconds in one hour.
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
/// Milliseconds in one minute.
pub const MINUTE_MS: i64 = 60 * 1000;

/// Returns the current time as Unix epoch milliseconds.
///
/// Clocks set before 1970 read as `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Returns the start of the UTC day containing `epoch_ms`.
///
/// Returns `None` when that day starts before `i64::MIN`.
pub fn utc_day_start(epoch_ms: i64) -> Option<i64> {
    epoch_ms.checked_sub(epoch_ms.rem_euclid(DAY_MS))
}

#[cfg(test)]
mod tests {
    use super::{utc_day_start, DAY_MS};

    #[test]
    fn day_start_truncates_to_midnight() {
        assert_eq!(utc_day_start(0), Some(0));
        assert_eq!(utc_day_start(DAY_MS - 1), Some(0));
        assert_eq!(utc_day_start(3 * DAY_MS + 5), Some(3 * DAY_MS));
        assert_eq!(utc_day_start(-1), Some(-DAY_MS));
        assert_eq!(utc_day_start(i64::MIN), None);
    }
}
