/// Gap detection over the trailing lookback window.
///
/// Computes which of the last N calendar days (yesterday back through
/// today−N) have no records in the silver table. Presence is checked at
/// date granularity: a day with partial hourly coverage still counts as
/// present. That tolerance is intentional — the loader re-fetches whole
/// contiguous spans and idempotence absorbs the overlap, so per-hour
/// completeness checking buys nothing here.

use crate::config::Config;
use crate::model::EtlError;
use chrono::{Duration, NaiveDate};
use postgres::Client;
use std::collections::HashSet;

/// Outcome of gap detection for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GapReport {
    /// Most recent date present in silver, None when the table is empty.
    pub last_day_in_db: Option<NaiveDate>,
    /// Dates in the expected window with no silver record, ascending.
    /// Empty means the window is fully populated and there is nothing
    /// to do.
    pub missing: Vec<NaiveDate>,
}

/// The expected window: exactly the `lookback_days` consecutive calendar
/// dates ending yesterday, ascending (today−N through today−1).
pub fn expected_window(today: NaiveDate, lookback_days: u32) -> Vec<NaiveDate> {
    (1..=i64::from(lookback_days))
        .rev()
        .map(|i| today - Duration::days(i))
        .collect()
}

/// Dates in `expected` that are absent from `existing`, ascending.
pub fn missing_dates(expected: &[NaiveDate], existing: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    let mut missing: Vec<NaiveDate> = expected
        .iter()
        .copied()
        .filter(|d| !existing.contains(d))
        .collect();
    missing.sort();
    missing
}

/// Queries the silver table and reports which dates in the lookback
/// window are missing.
///
/// Two queries: a MAX aggregate for the last known date, and a DISTINCT
/// date scan over the lookback span for presence.
pub fn detect(
    client: &mut Client,
    config: &Config,
    today: NaiveDate,
) -> Result<GapReport, EtlError> {
    let expected = expected_window(today, config.lookback_days);

    // Timestamps are stored as timestamptz; a bare ::date cast would
    // bucket in the session time zone. AT TIME ZONE 'UTC' pins the
    // bucketing so the same hours land on the same dates regardless of
    // the server's TimeZone setting.
    let max_query = format!(
        "SELECT MAX((weather_datetime AT TIME ZONE 'UTC')::date) FROM {}",
        config.silver_table
    );
    let row = client.query_one(&max_query, &[])?;
    let last_day_in_db: Option<NaiveDate> = row.get(0);

    // Window bounds are fixed relative to today, not to the data.
    let (start, end) = match (expected.first(), expected.last()) {
        (Some(start), Some(end)) => (*start, *end),
        _ => {
            return Ok(GapReport {
                last_day_in_db,
                missing: Vec::new(),
            });
        }
    };

    let presence_query = format!(
        "SELECT DISTINCT (weather_datetime AT TIME ZONE 'UTC')::date \
         FROM {} \
         WHERE (weather_datetime AT TIME ZONE 'UTC')::date >= $1 \
           AND (weather_datetime AT TIME ZONE 'UTC')::date <= $2",
        config.silver_table
    );
    let rows = client.query(&presence_query, &[&start, &end])?;

    let existing: HashSet<NaiveDate> = rows.iter().map(|r| r.get(0)).collect();

    Ok(GapReport {
        last_day_in_db,
        missing: missing_dates(&expected, &existing),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
