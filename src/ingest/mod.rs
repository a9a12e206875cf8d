/// Upstream data source clients.
///
/// Each external API gets its own file under ingest/; today that is
/// only the Open-Meteo archive endpoint.

pub mod open_meteo;

#[cfg(test)]
pub(crate) mod fixtures;
