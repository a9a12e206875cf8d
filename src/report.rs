/// Run summary persistence and best-effort Telegram notification.
///
/// The controller hands the in-memory `RunSummary` straight to this
/// module: the key=value artifact on disk is a durable record for
/// external inspection, written once and never read back by the
/// service itself.
///
/// Everything here is best-effort. Artifact IO, message formatting and
/// the Telegram POST can all fail without failing the run — errors are
/// logged to stderr and swallowed.

use crate::config::{Config, TelegramConfig};
use crate::model::{RunStatus, RunSummary};
use serde::Serialize;
use std::fs;
use std::time::Duration;

/// Telegram enforces a message-size cap; error text is cut to fit.
pub const MAX_ERROR_CHARS: usize = 3500;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const TELEGRAM_TIMEOUT_SECS: u64 = 20;

// ---------------------------------------------------------------------------
// Summary artifact
// ---------------------------------------------------------------------------

/// Renders the summary as one key=value pair per line.
///
/// Format constraint: values must not contain '=' or embedded newlines —
/// the format does no escaping, and a consumer splitting on the first
/// '=' would mis-parse such values.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("status={}\n", summary.status));
    out.push_str(&format!("attempt={}\n", summary.attempt));
    out.push_str(&format!(
        "run_time={}\n",
        summary.run_time.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("target_date={}\n", summary.target_date));
    out.push_str(&format!("last_day_in_db={}\n", summary.last_day_in_db));
    out.push_str(&format!("dates_filled={}\n", summary.dates_filled));
    out.push_str(&format!("bronze_inserted={}\n", summary.bronze_inserted));
    out.push_str(&format!("bronze_skipped={}\n", summary.bronze_skipped));
    out.push_str(&format!("silver_inserted={}\n", summary.silver_inserted));
    out.push_str(&format!("silver_skipped={}\n", summary.silver_skipped));
    out.push_str(&format!("duration_seconds={}\n", summary.duration_seconds));
    out.push_str(&format!(
        "error={}\n",
        sanitize_value(&truncate_chars(&summary.error, MAX_ERROR_CHARS))
    ));
    out
}

/// Overwrites the single-slot summary artifact at the configured path.
pub fn write_summary(path: &str, summary: &RunSummary) -> std::io::Result<()> {
    fs::write(path, render_summary(summary))
}

/// Error text can contain anything; flatten it to keep the artifact
/// line-oriented.
fn sanitize_value(value: &str) -> String {
    value.replace('\n', " ").replace('=', ":")
}

// ---------------------------------------------------------------------------
// Notification formatting
// ---------------------------------------------------------------------------

/// Truncates to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Renders the plain-text notification body from the summary.
///
/// On failure the error text is appended, truncated to `MAX_ERROR_CHARS`
/// to respect the transport's message-size limit.
pub fn format_notification(summary: &RunSummary) -> String {
    let mut lines = vec![
        format!("Weather ETL: {}", summary.status),
        format!("Attempt: {}", summary.attempt),
        format!("Run Time: {}", summary.run_time.format("%Y-%m-%d %H:%M:%S")),
        format!("Last Day in DB: {}", summary.last_day_in_db),
        format!("Dates Filled: {}", summary.dates_filled),
        format!("Bronze Inserted: {}", summary.bronze_inserted),
        format!("Bronze Skipped: {}", summary.bronze_skipped),
        format!("Silver Inserted: {}", summary.silver_inserted),
        format!("Duration (sec): {}", summary.duration_seconds),
    ];

    if summary.status != RunStatus::Success {
        lines.push("Error:".to_string());
        lines.push(truncate_chars(&summary.error, MAX_ERROR_CHARS));
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Telegram transport
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// POSTs the message to the Telegram sendMessage endpoint. Fire and
/// forget: the response body is not inspected beyond the status line.
fn send_telegram(
    http: &reqwest::blocking::Client,
    telegram: &TelegramConfig,
    text: &str,
) -> Result<(), reqwest::Error> {
    let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, telegram.bot_token);

    http.post(&url)
        .timeout(Duration::from_secs(TELEGRAM_TIMEOUT_SECS))
        .json(&SendMessageBody {
            chat_id: &telegram.chat_id,
            text,
        })
        .send()?;

    Ok(())
}

/// Persists the summary artifact and sends the notification.
///
/// Never returns an error: every failure is logged to stderr and
/// swallowed so the notification side-channel cannot change a run's
/// outcome.
pub fn notify_best_effort(http: &reqwest::blocking::Client, config: &Config, summary: &RunSummary) {
    if let Err(e) = write_summary(&config.summary_path, summary) {
        eprintln!(
            "Failed to write run summary to {}: {}",
            config.summary_path, e
        );
    }

    match &config.telegram {
        Some(telegram) => {
            let message = format_notification(summary);
            if let Err(e) = send_telegram(http, telegram, &message) {
                eprintln!("Telegram alert failed: {}", e);
            }
        }
        None => {
            println!("Telegram credentials not configured; skipping notification.");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
