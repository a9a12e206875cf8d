//! Weather ETL Service - Scheduled Run Entry Point
//!
//! Invoked once per run by an external scheduler (cron, Task Scheduler).
//! Each run:
//! 1. Detects which of the last 10 calendar days are missing from silver
//! 2. Fetches exactly that window from the Open-Meteo archive API
//! 3. Lands raw rows in bronze (duplicate-tolerant), promotes new rows
//!    to silver via a set-difference insert
//! 4. Persists a run summary artifact and sends a Telegram notification
//!
//! A failed attempt is retried once after a fixed delay; a second
//! failure is terminal and surfaces through the exit status.
//!
//! Usage:
//!   cargo run --release        # no arguments
//!
//! Environment:
//!   DATABASE_URL        - PostgreSQL connection string
//!   TELEGRAM_BOT_TOKEN  - notification bot token (optional)
//!   TELEGRAM_CHAT_ID    - notification recipient (optional)

use wxload_service::config::Config;
use wxload_service::controller;
use wxload_service::model::RunStatus;

fn main() {
    println!("Weather ETL Service");
    println!("===================\n");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    // Terminal failure is visible to the scheduler via exit status.
    match controller::run(&config) {
        RunStatus::Success => {}
        RunStatus::Failed => std::process::exit(1),
    }
}
