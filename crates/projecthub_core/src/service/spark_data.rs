//! Daily analysis activity series for sparkline charts.
//!
//! # Invariants
//! - The series always has `SPARK_DAYS` points, oldest first.
//! - The last point is the UTC day containing `now_ms`.
//! - A `now_ms` whose window does not fit in `i64` is rejected, never wrapped.

use crate::clock::{utc_day_start, DAY_MS};
use crate::repo::analysis_repo::AnalysisRepository;
use crate::repo::{RepoError, RepoResult};
use std::collections::HashMap;

/// Number of daily points in one series.
pub const SPARK_DAYS: usize = 64;

/// One day of analysis activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparkPoint {
    /// Start of the UTC day, epoch milliseconds.
    pub day_start: i64,
    pub count: u32,
}

/// Builds the analysis activity series ending today.
pub fn generate<R: AnalysisRepository>(repo: &R, now_ms: i64) -> RepoResult<Vec<SparkPoint>> {
    let window = (SPARK_DAYS as i64 - 1) * DAY_MS;
    let bounds = utc_day_start(now_ms).and_then(|today| {
        Some((today.checked_sub(window)?, today.checked_add(DAY_MS)?))
    });
    let Some((first_day, until)) = bounds else {
        return Err(RepoError::InvalidData(format!(
            "spark window around {now_ms} is out of range"
        )));
    };
    let counts: HashMap<i64, u32> = repo
        .count_by_day(first_day, until)?
        .into_iter()
        .collect();

    Ok((0..SPARK_DAYS as i64)
        .map(|offset| {
            let day_start = first_day + offset * DAY_MS;
            SparkPoint {
                day_start,
                count: counts.get(&day_start).copied().unwrap_or(0),
            }
        })
        .collect())
}
