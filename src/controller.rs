/// Run controller: drives one scheduled ETL run with a single bounded
/// retry.
///
/// State machine:
///   INIT -> RUNNING(1) -> SUCCESS
///                      -> RETRY_PENDING -> RUNNING(2) -> SUCCESS
///                                                     -> FAILED
///
/// Any failure during an attempt persists a FAILED summary and sends a
/// notification; only the first failure, and only for recoverable error
/// kinds, is followed by the fixed retry delay and a fresh attempt.
/// Attempt 2 restarts gap detection from scratch — committed bronze
/// writes from a failed attempt 1 are absorbed by idempotence.

use crate::config::Config;
use crate::model::{EtlError, LoadCounts, RunStatus, RunSummary};
use crate::{db, gaps, loader, report};
use chrono::Utc;
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: u32 = 2;

/// Whether a failed attempt should be retried.
///
/// Exactly one level of retry, and only for failures a second attempt
/// could plausibly fix (network, store); configuration problems are
/// terminal immediately.
pub fn should_retry(error: &EtlError, attempt: u32) -> bool {
    attempt < MAX_ATTEMPTS && error.is_recoverable()
}

/// Runs the full ETL with retry, reporting every attempt's outcome.
/// Returns the terminal status.
pub fn run(config: &Config) -> RunStatus {
    let http = reqwest::blocking::Client::new();

    let mut attempt = 1;
    loop {
        let started = Instant::now();

        match run_attempt(config, &http, attempt) {
            Ok(summary) => {
                report::notify_best_effort(&http, config, &summary);
                println!("ETL SUCCESS");
                println!("--------------------------------------------------");
                return RunStatus::Success;
            }
            Err(e) => {
                eprintln!("ETL FAILED (attempt {}): {}", attempt, e);

                let duration = started.elapsed().as_secs();
                let summary = RunSummary::failed(attempt, &e, duration);
                report::notify_best_effort(&http, config, &summary);

                if !should_retry(&e, attempt) {
                    println!("--------------------------------------------------");
                    return RunStatus::Failed;
                }

                println!(
                    "Retrying in {} minutes...",
                    config.retry_delay_seconds / 60
                );
                std::thread::sleep(Duration::from_secs(config.retry_delay_seconds));
                attempt += 1;
            }
        }
    }
}

/// One complete attempt: connect, detect gaps, load if needed, and
/// build the success summary. The connection is owned here and dropped
/// on every exit path.
fn run_attempt(
    config: &Config,
    http: &reqwest::blocking::Client,
    attempt: u32,
) -> Result<RunSummary, EtlError> {
    let started = Instant::now();

    println!("--------------------------------------------------");
    println!("Weather ETL STARTED");
    println!("Attempt: {}", attempt);

    println!("Connecting to DB...");
    let mut client =
        db::connect_and_verify(&["weather"]).map_err(|e| EtlError::Db(e.to_string()))?;
    println!("Connected.");

    let today = Utc::now().date_naive();
    let gap_report = gaps::detect(&mut client, config, today)?;

    let last_day_in_db = gap_report
        .last_day_in_db
        .map_or_else(|| "None".to_string(), |d| d.to_string());
    println!("Last recorded date in silver: {}", last_day_in_db);

    let Some((start, end)) = loader::fetch_window(&gap_report.missing) else {
        println!(
            "Data for the last {} days is already fully populated. No action needed.",
            config.lookback_days
        );
        return Ok(RunSummary::success(
            attempt,
            last_day_in_db,
            Vec::new(),
            None,
            started.elapsed().as_secs(),
        ));
    };

    println!("Missing dates detected: {:?}", gap_report.missing);
    let counts: LoadCounts = loader::load(&mut client, http, config, start, end)?;

    Ok(RunSummary::success(
        attempt,
        last_day_in_db,
        gap_report.missing,
        Some(&counts),
        started.elapsed().as_secs(),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
