/// Shared data types for the weather ETL service.
///
/// Defines the hourly observation record, the per-run load counters,
/// the run summary that feeds the notification side-channel, and the
/// error taxonomy used to decide whether a failed attempt is retried.

use chrono::{DateTime, NaiveDate, Utc};

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// A single hourly weather reading from the archive API.
///
/// All measurements are optional: the archive returns JSON null for hours
/// where a sensor value is unavailable, and those nulls are stored as-is.
/// Identity key is the timestamp — the location is fixed, so there is
/// exactly one observation per hour.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub shortwave_radiation: Option<f64>,
    pub direct_radiation: Option<f64>,
    pub diffuse_radiation: Option<f64>,
}

// ---------------------------------------------------------------------------
// Load accounting
// ---------------------------------------------------------------------------

/// Counters from one bronze-load + silver-promotion pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCounts {
    pub bronze_inserted: u64,
    /// Rows whose timestamp already existed in bronze (duplicate-key skips).
    pub bronze_skipped: u64,
    pub silver_inserted: u64,
    /// Structurally zero under set-difference promotion; kept so the run
    /// summary layout stays stable.
    pub silver_skipped: u64,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "SUCCESS"),
            RunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Flat record of one run attempt, built in memory by the controller and
/// handed directly to the reporter. Overwritten each run — this is the
/// last-run artifact, not a log.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: RunStatus,
    pub attempt: u32,
    pub run_time: DateTime<Utc>,
    /// Inclusive fetch range, e.g. "2026-08-18 to 2026-08-20", or "N/A"
    /// when the lookback window was already fully populated.
    pub target_date: String,
    /// Most recent date in silver before the run, or "None" when empty.
    pub last_day_in_db: String,
    /// Comma-joined missing dates that were filled, or "None".
    pub dates_filled: String,
    pub bronze_inserted: u64,
    pub bronze_skipped: u64,
    pub silver_inserted: u64,
    pub silver_skipped: u64,
    pub duration_seconds: u64,
    pub error: String,
}

impl RunSummary {
    /// Summary for an attempt that completed without error. `counts` is
    /// None when gap detection found nothing to load.
    pub fn success(
        attempt: u32,
        last_day_in_db: String,
        dates_filled: Vec<NaiveDate>,
        counts: Option<&LoadCounts>,
        duration_seconds: u64,
    ) -> Self {
        let (target_date, dates_filled) = match counts {
            Some(c) => (
                format!("{} to {}", c.range_start, c.range_end),
                dates_filled
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            None => ("N/A".to_string(), "None".to_string()),
        };

        Self {
            status: RunStatus::Success,
            attempt,
            run_time: Utc::now(),
            target_date,
            last_day_in_db,
            dates_filled,
            bronze_inserted: counts.map_or(0, |c| c.bronze_inserted),
            bronze_skipped: counts.map_or(0, |c| c.bronze_skipped),
            silver_inserted: counts.map_or(0, |c| c.silver_inserted),
            silver_skipped: counts.map_or(0, |c| c.silver_skipped),
            duration_seconds,
            error: String::new(),
        }
    }

    /// Summary for a failed attempt. Counts are zeroed — a failed attempt's
    /// already-committed bronze writes are absorbed by the next idempotent run.
    pub fn failed(attempt: u32, error: &EtlError, duration_seconds: u64) -> Self {
        Self {
            status: RunStatus::Failed,
            attempt,
            run_time: Utc::now(),
            target_date: String::new(),
            last_day_in_db: "Unknown".to_string(),
            dates_filled: "None".to_string(),
            bronze_inserted: 0,
            bronze_skipped: 0,
            silver_inserted: 0,
            silver_skipped: 0,
            duration_seconds,
            error: error.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Typed failure for one ETL attempt.
///
/// The controller inspects the variant to decide on retry: configuration
/// problems are terminal (a retry cannot fix them), everything touching
/// the network or the store gets exactly one retry.
#[derive(Debug)]
pub enum EtlError {
    /// Missing or invalid configuration. Terminal.
    Config(String),
    /// Store connectivity or query failure.
    Db(String),
    /// Upstream HTTP failure (transport error or non-2xx status).
    Fetch(String),
    /// Malformed or structurally unexpected API response.
    Parse(String),
}

impl EtlError {
    /// Whether a second attempt might succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EtlError::Config(_))
    }
}

impl std::fmt::Display for EtlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EtlError::Config(msg) => write!(f, "configuration error: {}", msg),
            EtlError::Db(msg) => write!(f, "database error: {}", msg),
            EtlError::Fetch(msg) => write!(f, "upstream fetch error: {}", msg),
            EtlError::Parse(msg) => write!(f, "response parse error: {}", msg),
        }
    }
}

impl std::error::Error for EtlError {}

impl From<postgres::Error> for EtlError {
    fn from(e: postgres::Error) -> Self {
        EtlError::Db(e.to_string())
    }
}

impl From<reqwest::Error> for EtlError {
    fn from(e: reqwest::Error) -> Self {
        EtlError::Fetch(e.to_string())
    }
}
