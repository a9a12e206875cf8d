/// wxload_service: scheduled incremental weather ETL service.
///
/// # Module structure
///
/// ```text
/// wxload_service
/// ├── model       — shared data types (Observation, RunSummary, EtlError, …)
/// ├── config      — wxload.toml + environment configuration loader
/// ├── db          — PostgreSQL connection and schema validation
/// ├── ingest
/// │   ├── open_meteo — archive API: URL construction + JSON parsing
/// │   └── fixtures (test only) — representative API response payloads
/// ├── gaps        — missing-date detection over the trailing lookback window
/// ├── loader      — fetch → bronze-insert → silver-promote sequence
/// ├── report      — run summary artifact + best-effort Telegram notification
/// └── controller  — single-run orchestration with one bounded retry
/// ```

/// Public modules
pub mod config;
pub mod controller;
pub mod db;
pub mod gaps;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod report;
