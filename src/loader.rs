/// Fetch → bronze-insert → silver-promote sequence for a missing-date
/// window.
///
/// The fetch window is the contiguous span [min, max] of the missing
/// set; interior dates that are already present get re-fetched and are
/// absorbed as duplicate skips. Bronze inserts tolerate duplicate keys
/// (ON CONFLICT DO NOTHING, skip counted) and commit as one
/// transaction; silver promotion is a single set-based insert-select
/// that excludes timestamps already promoted, so silver-side skips are
/// structurally zero.

use crate::config::Config;
use crate::ingest::open_meteo;
use crate::model::{EtlError, LoadCounts, Observation};
use chrono::NaiveDate;
use postgres::Client;

/// Inclusive fetch window covering the whole missing set.
/// None when there is nothing to fetch.
pub fn fetch_window(missing: &[NaiveDate]) -> Option<(NaiveDate, NaiveDate)> {
    match (missing.iter().min(), missing.iter().max()) {
        (Some(start), Some(end)) => Some((*start, *end)),
        _ => None,
    }
}

/// Fetches the inclusive window [start, end] from the archive API and
/// loads it through bronze into silver. Returns the insert/skip counts
/// and the range processed. Callers derive the window from the missing
/// set via [`fetch_window`].
///
/// Idempotent: a re-run over the same window inserts nothing new and
/// reports every fetched timestamp as a bronze skip.
pub fn load(
    client: &mut Client,
    http: &reqwest::blocking::Client,
    config: &Config,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<LoadCounts, EtlError> {
    println!("Fetching archive data ({} to {})...", start, end);
    let observations = open_meteo::fetch_archive(http, config, start, end)?;
    println!("API fetch successful: {} hourly observations.", observations.len());

    println!("Inserting into bronze...");
    let (bronze_inserted, bronze_skipped) = insert_bronze(client, config, &observations)?;
    println!(
        "Bronze complete: inserted {}, skipped {} duplicates.",
        bronze_inserted, bronze_skipped
    );

    println!("Promoting to silver...");
    let silver_inserted = promote_silver(client, config, start, end)?;
    println!("Silver complete: inserted {}.", silver_inserted);

    Ok(LoadCounts {
        bronze_inserted,
        bronze_skipped,
        silver_inserted,
        silver_skipped: 0,
        range_start: start,
        range_end: end,
    })
}

/// Inserts raw observations into bronze as one committed transaction,
/// returning (inserted, skipped).
///
/// Duplicate timestamps are expected (re-fetched interior dates, prior
/// partial runs) and resolve to a skip via ON CONFLICT DO NOTHING; a
/// row count of zero from the execute is the duplicate-key outcome.
/// Any other failure aborts the transaction and the attempt.
pub fn insert_bronze(
    client: &mut Client,
    config: &Config,
    observations: &[Observation],
) -> Result<(u64, u64), EtlError> {
    let insert = format!(
        "INSERT INTO {} \
         (weather_datetime, temperature, precipitation, wind_speed, humidity, \
          shortwave_radiation, direct_radiation, diffuse_radiation, source_type) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (weather_datetime) DO NOTHING",
        config.bronze_table
    );

    let mut inserted: u64 = 0;
    let mut skipped: u64 = 0;

    let mut tx = client.transaction()?;
    let stmt = tx.prepare(&insert)?;

    for obs in observations {
        let rows_affected = tx.execute(
            &stmt,
            &[
                &obs.timestamp,
                &obs.temperature,
                &obs.precipitation,
                &obs.wind_speed,
                &obs.humidity,
                &obs.shortwave_radiation,
                &obs.direct_radiation,
                &obs.diffuse_radiation,
                &"daily_fetch",
            ],
        )?;

        if rows_affected == 0 {
            skipped += 1;
        } else {
            inserted += 1;
        }
    }

    tx.commit()?;
    Ok((inserted, skipped))
}

/// Promotes every bronze row in the date range whose timestamp is not
/// already in silver. One set-based statement; the affected-row count
/// is the silver-inserted count. The range comparison buckets
/// timestamps in UTC so it does not drift with the session time zone.
pub fn promote_silver(
    client: &mut Client,
    config: &Config,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64, EtlError> {
    let promote = format!(
        "INSERT INTO {silver} \
         (weather_datetime, temperature, precipitation, wind_speed, humidity, \
          shortwave_radiation, direct_radiation, diffuse_radiation, ingestion_time) \
         SELECT \
             b.weather_datetime, b.temperature, b.precipitation, b.wind_speed, b.humidity, \
             b.shortwave_radiation, b.direct_radiation, b.diffuse_radiation, now() \
         FROM {bronze} b \
         WHERE (b.weather_datetime AT TIME ZONE 'UTC')::date >= $1 \
           AND (b.weather_datetime AT TIME ZONE 'UTC')::date <= $2 \
           AND NOT EXISTS ( \
               SELECT 1 FROM {silver} s \
               WHERE s.weather_datetime = b.weather_datetime \
           )",
        silver = config.silver_table,
        bronze = config.bronze_table,
    );

    let inserted = client.execute(&promote, &[&start, &end])?;
    Ok(inserted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
