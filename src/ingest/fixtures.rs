/// Test fixtures: representative JSON payloads from the Open-Meteo
/// archive API.
///
/// These fixtures are structurally complete but truncated to the minimum
/// needed to exercise the parser. They reflect the real envelope returned
/// by:
///   https://archive-api.open-meteo.com/v1/archive?hourly=...&timezone=UTC
///
/// Archive response shape:
///   response.hourly.time[]            — ISO 8601 minute-precision, no offset
///   response.hourly.<field>[]         — one parallel array per hourly field
///   index i across all arrays describes one observation
///
/// Request errors are reported in-band as {"error": true, "reason": "..."}
/// with an HTTP 400, so the parser must recognize that shape too.

/// Three consecutive hours with every requested field populated.
pub(crate) fn fixture_three_hours_json() -> &'static str {
    r#"{
      "latitude": 33.95,
      "longitude": -83.36,
      "generationtime_ms": 0.45,
      "utc_offset_seconds": 0,
      "timezone": "UTC",
      "hourly_units": {
        "time": "iso8601",
        "temperature_2m": "°C",
        "precipitation": "mm",
        "windspeed_10m": "km/h",
        "relativehumidity_2m": "%",
        "shortwave_radiation": "W/m²",
        "direct_radiation": "W/m²",
        "diffuse_radiation": "W/m²"
      },
      "hourly": {
        "time": ["2026-08-25T00:00", "2026-08-25T01:00", "2026-08-25T02:00"],
        "temperature_2m": [22.4, 22.0, 21.6],
        "precipitation": [0.0, 0.0, 0.1],
        "windspeed_10m": [5.1, 4.8, 4.3],
        "relativehumidity_2m": [88.0, 90.0, 92.0],
        "shortwave_radiation": [0.0, 0.0, 0.0],
        "direct_radiation": [0.0, 0.0, 0.0],
        "diffuse_radiation": [0.0, 0.0, 0.0]
      }
    }"#
}

/// Two hours where some sensors report null — the archive uses JSON null
/// for unavailable measurements, which must survive as None, not fail.
pub(crate) fn fixture_with_nulls_json() -> &'static str {
    r#"{
      "hourly": {
        "time": ["2026-08-25T10:00", "2026-08-25T11:00"],
        "temperature_2m": [null, 24.1],
        "precipitation": [0.2, 0.0],
        "windspeed_10m": [7.5, 8.0],
        "relativehumidity_2m": [70.0, 68.0],
        "shortwave_radiation": [412.0, 498.0],
        "direct_radiation": [300.0, null],
        "diffuse_radiation": [112.0, 140.0]
      }
    }"#
}

/// One hour with the diffuse_radiation array absent entirely.
pub(crate) fn fixture_missing_field_json() -> &'static str {
    r#"{
      "hourly": {
        "time": ["2026-08-25T12:00"],
        "temperature_2m": [20.0],
        "precipitation": [0.0],
        "windspeed_10m": [3.2],
        "relativehumidity_2m": [55.0],
        "shortwave_radiation": [610.0],
        "direct_radiation": [450.0]
      }
    }"#
}

/// Value array shorter than the time array — structurally invalid.
pub(crate) fn fixture_length_mismatch_json() -> &'static str {
    r#"{
      "hourly": {
        "time": ["2026-08-25T00:00", "2026-08-25T01:00", "2026-08-25T02:00"],
        "temperature_2m": [22.4, 22.0],
        "precipitation": [0.0, 0.0, 0.1]
      }
    }"#
}

/// In-band request error, as returned with HTTP 400 for a bad date range.
pub(crate) fn fixture_api_error_json() -> &'static str {
    r#"{
      "error": true,
      "reason": "Parameter 'start_date' is out of allowed range"
    }"#
}

/// A complete UTC day (24 hours), generated rather than hand-written.
pub(crate) fn fixture_full_day_json() -> String {
    let times: Vec<String> = (0..24)
        .map(|h| format!("\"2026-08-25T{:02}:00\"", h))
        .collect();
    let temps: Vec<String> = (0..24).map(|h| format!("{:.1}", 18.0 + h as f64 * 0.3)).collect();
    let zeros: Vec<String> = (0..24).map(|_| "0.0".to_string()).collect();

    format!(
        r#"{{
          "hourly": {{
            "time": [{}],
            "temperature_2m": [{}],
            "precipitation": [{}],
            "windspeed_10m": [{}],
            "relativehumidity_2m": [{}],
            "shortwave_radiation": [{}],
            "direct_radiation": [{}],
            "diffuse_radiation": [{}]
          }}
        }}"#,
        times.join(", "),
        temps.join(", "),
        zeros.join(", "),
        zeros.join(", "),
        zeros.join(", "),
        zeros.join(", "),
        zeros.join(", "),
        zeros.join(", ")
    )
}
