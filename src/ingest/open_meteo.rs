/// Open-Meteo Archive API client.
///
/// Handles URL construction and JSON response parsing for the historical
/// weather archive endpoint:
///   https://archive-api.open-meteo.com/v1/archive
///
/// The archive returns the hourly section as parallel arrays: a `time`
/// array of ISO 8601 timestamps plus one value array per requested field,
/// where index `i` across all arrays describes one observation. See
/// `fixtures.rs` for annotated examples of the response structure.

use crate::config::Config;
use crate::model::{EtlError, Observation};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Hourly fields requested from the archive, in the order they map onto
/// `Observation`. These are Open-Meteo variable names, not column names.
pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "precipitation",
    "windspeed_10m",
    "relativehumidity_2m",
    "shortwave_radiation",
    "direct_radiation",
    "diffuse_radiation",
];

// ---------------------------------------------------------------------------
// Serde structures for archive JSON deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ArchiveResponse {
    hourly: Option<HourlySection>,
    // Open-Meteo signals request errors in-band: {"error": true, "reason": "..."}
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Deserialize)]
struct HourlySection {
    time: Vec<String>,
    temperature_2m: Option<Vec<Option<f64>>>,
    precipitation: Option<Vec<Option<f64>>>,
    windspeed_10m: Option<Vec<Option<f64>>>,
    relativehumidity_2m: Option<Vec<Option<f64>>>,
    shortwave_radiation: Option<Vec<Option<f64>>>,
    direct_radiation: Option<Vec<Option<f64>>>,
    diffuse_radiation: Option<Vec<Option<f64>>>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds an archive API URL for the given inclusive date range.
///
/// The hourly field list is comma-joined into a single `hourly` parameter,
/// and dates are rendered as `YYYY-MM-DD`.
pub fn build_archive_url(config: &Config, start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!(
        "{}?latitude={}&longitude={}&hourly={}&start_date={}&end_date={}&timezone={}",
        config.api_base_url,
        config.latitude,
        config.longitude,
        HOURLY_FIELDS.join(","),
        start_date,
        end_date,
        config.timezone
    )
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Fetches hourly observations for the inclusive date range `[start, end]`.
///
/// # Errors
/// - `EtlError::Fetch` — transport failure or non-2xx status.
/// - `EtlError::Parse` — structurally invalid response body.
pub fn fetch_archive(
    http: &reqwest::blocking::Client,
    config: &Config,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<Observation>, EtlError> {
    let url = build_archive_url(config, start_date, end_date);

    let response = http
        .get(&url)
        .timeout(Duration::from_secs(config.api_timeout_seconds))
        .send()?;

    if !response.status().is_success() {
        return Err(EtlError::Fetch(format!(
            "archive API returned status {}",
            response.status()
        )));
    }

    let body = response.text()?;
    parse_archive_response(&body)
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses an archive API JSON response body into a flat list of
/// `Observation`s, one per entry in the `time` array.
///
/// Null measurements pass through as `None`; a value array whose length
/// disagrees with the `time` array is a structural error.
///
/// # Errors
/// - `EtlError::Parse` — malformed JSON, in-band API error, missing
///   `hourly` section, array length mismatch, or unparseable timestamp.
pub fn parse_archive_response(json: &str) -> Result<Vec<Observation>, EtlError> {
    let response: ArchiveResponse = serde_json::from_str(json)
        .map_err(|e| EtlError::Parse(format!("JSON deserialization failed: {}", e)))?;

    if response.error {
        return Err(EtlError::Parse(format!(
            "archive API error: {}",
            response.reason.unwrap_or_else(|| "unspecified".to_string())
        )));
    }

    let hourly = response
        .hourly
        .ok_or_else(|| EtlError::Parse("missing hourly section in response".to_string()))?;

    let n = hourly.time.len();
    for (name, values) in [
        ("temperature_2m", &hourly.temperature_2m),
        ("precipitation", &hourly.precipitation),
        ("windspeed_10m", &hourly.windspeed_10m),
        ("relativehumidity_2m", &hourly.relativehumidity_2m),
        ("shortwave_radiation", &hourly.shortwave_radiation),
        ("direct_radiation", &hourly.direct_radiation),
        ("diffuse_radiation", &hourly.diffuse_radiation),
    ] {
        if let Some(v) = values {
            if v.len() != n {
                return Err(EtlError::Parse(format!(
                    "field {} has {} values but time has {}",
                    name,
                    v.len(),
                    n
                )));
            }
        }
    }

    let mut observations = Vec::with_capacity(n);

    for (i, raw_time) in hourly.time.iter().enumerate() {
        let timestamp = parse_hourly_timestamp(raw_time)?;

        observations.push(Observation {
            timestamp,
            temperature: value_at(&hourly.temperature_2m, i),
            precipitation: value_at(&hourly.precipitation, i),
            wind_speed: value_at(&hourly.windspeed_10m, i),
            humidity: value_at(&hourly.relativehumidity_2m, i),
            shortwave_radiation: value_at(&hourly.shortwave_radiation, i),
            direct_radiation: value_at(&hourly.direct_radiation, i),
            diffuse_radiation: value_at(&hourly.diffuse_radiation, i),
        });
    }

    Ok(observations)
}

fn value_at(values: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    values.as_ref().and_then(|v| v.get(i).copied().flatten())
}

/// The archive renders timestamps as minute-precision ISO 8601 without an
/// offset ("2026-08-18T14:00"); with timezone=UTC they are UTC wall times.
fn parse_hourly_timestamp(raw: &str) -> Result<DateTime<Utc>, EtlError> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| EtlError::Parse(format!("failed to parse timestamp '{}': {}", raw, e)))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use chrono::Timelike;

    // --- URL construction ---------------------------------------------------

    #[test]
    fn test_build_url_targets_archive_endpoint() {
        let config = Config::default();
        let url = build_archive_url(
            &config,
            NaiveDate::from_ymd_opt(2026, 8, 18).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        );
        assert!(
            url.starts_with("https://archive-api.open-meteo.com/v1/archive?"),
            "must target the archive endpoint, got: {}",
            url
        );
    }

    #[test]
    fn test_build_url_includes_all_params() {
        let config = Config::default();
        let url = build_archive_url(
            &config,
            NaiveDate::from_ymd_opt(2026, 8, 18).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        );
        assert!(url.contains("latitude=33.9519"), "must include latitude");
        assert!(url.contains("longitude=-83.3576"), "must include longitude");
        assert!(url.contains("start_date=2026-08-18"), "must include start date");
        assert!(url.contains("end_date=2026-08-20"), "must include end date");
        assert!(url.contains("timezone=UTC"), "must pin the timezone");
    }

    #[test]
    fn test_build_url_comma_joins_hourly_fields() {
        let config = Config::default();
        let url = build_archive_url(
            &config,
            NaiveDate::from_ymd_opt(2026, 8, 18).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 18).unwrap(),
        );
        // Open-Meteo expects a single comma-separated `hourly` param.
        assert!(
            url.contains("hourly=temperature_2m,precipitation,windspeed_10m"),
            "hourly fields should be comma-separated, got: {}",
            url
        );
        for field in HOURLY_FIELDS {
            assert!(url.contains(field), "URL must include field {}", field);
        }
    }

    // --- Parsing: happy path ------------------------------------------------

    #[test]
    fn test_parse_three_hour_fixture_values_and_timestamps() {
        let observations = parse_archive_response(fixture_three_hours_json())
            .expect("valid fixture should parse without error");

        assert_eq!(observations.len(), 3);

        let first = &observations[0];
        assert_eq!(first.timestamp.hour(), 0);
        assert_eq!(first.temperature, Some(22.4));
        assert_eq!(first.precipitation, Some(0.0));
        assert_eq!(first.wind_speed, Some(5.1));
        assert_eq!(first.humidity, Some(88.0));
        assert_eq!(first.shortwave_radiation, Some(0.0));

        let last = &observations[2];
        assert_eq!(last.timestamp.hour(), 2);
        assert_eq!(last.temperature, Some(21.6));
    }

    #[test]
    fn test_parse_timestamps_are_utc_hourly() {
        let observations =
            parse_archive_response(fixture_three_hours_json()).expect("should parse");

        for obs in &observations {
            assert_eq!(obs.timestamp.minute(), 0, "archive data is on the hour");
        }
        assert_eq!(
            observations[0].timestamp.to_rfc3339(),
            "2026-08-25T00:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_null_measurements_become_none() {
        let observations =
            parse_archive_response(fixture_with_nulls_json()).expect("nulls are valid data");

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].temperature, None);
        assert_eq!(observations[0].precipitation, Some(0.2));
        assert_eq!(observations[1].direct_radiation, None);
    }

    #[test]
    fn test_parse_missing_field_array_yields_none_values() {
        // A field absent from the response entirely (not requested, or
        // dropped by the API) must not fail the parse.
        let observations = parse_archive_response(fixture_missing_field_json())
            .expect("missing field array should not be fatal");

        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].diffuse_radiation, None);
        assert_eq!(observations[0].temperature, Some(20.0));
    }

    // --- Parsing: error and edge cases --------------------------------------

    #[test]
    fn test_parse_length_mismatch_returns_parse_error() {
        let result = parse_archive_response(fixture_length_mismatch_json());
        assert!(
            matches!(result, Err(EtlError::Parse(_))),
            "array length mismatch should yield Parse error, got {:?}",
            result
        );
    }

    #[test]
    fn test_parse_in_band_api_error_returns_parse_error() {
        let result = parse_archive_response(fixture_api_error_json());
        match result {
            Err(EtlError::Parse(msg)) => {
                assert!(msg.contains("out of allowed range"), "should carry the API reason");
            }
            other => panic!("in-band error should yield Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_hourly_section_returns_parse_error() {
        let result = parse_archive_response(r#"{ "latitude": 33.95, "longitude": -83.36 }"#);
        assert!(
            matches!(result, Err(EtlError::Parse(_))),
            "missing hourly section should yield Parse error"
        );
    }

    #[test]
    fn test_parse_malformed_json_returns_parse_error() {
        let result = parse_archive_response("{ this is not valid json }}}");
        assert!(matches!(result, Err(EtlError::Parse(_))));
    }

    #[test]
    fn test_parse_empty_string_returns_parse_error() {
        let result = parse_archive_response("");
        assert!(matches!(result, Err(EtlError::Parse(_))));
    }

    #[test]
    fn test_parse_empty_time_array_returns_no_observations() {
        let json = r#"{ "hourly": { "time": [] } }"#;
        let observations = parse_archive_response(json).expect("empty window is not an error");
        assert!(observations.is_empty());
    }

    #[test]
    fn test_parse_bad_timestamp_returns_parse_error() {
        let json = r#"{ "hourly": { "time": ["yesterday at noon"] } }"#;
        let result = parse_archive_response(json);
        assert!(
            matches!(result, Err(EtlError::Parse(_))),
            "unparseable timestamp should yield Parse error, got {:?}",
            result
        );
    }

    #[test]
    fn test_parse_seconds_precision_timestamp_accepted() {
        let json = r#"{ "hourly": { "time": ["2026-08-25T06:00:00"] } }"#;
        let observations = parse_archive_response(json).expect("seconds precision is valid");
        assert_eq!(observations[0].timestamp.hour(), 6);
    }

    #[test]
    fn test_parse_full_day_yields_24_observations() {
        let observations = parse_archive_response(&fixture_full_day_json())
            .expect("full day fixture should parse");
        assert_eq!(observations.len(), 24, "one observation per hour");

        let hours: Vec<u32> = observations.iter().map(|o| o.timestamp.hour()).collect();
        assert_eq!(hours, (0..24).collect::<Vec<u32>>());
    }
}
