use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

pub type Timestamp = DateTime<Utc>;

/// Length of `YYYY-MM-DDTHH:MM:SS`.
pub const SECONDS_PRECISION_LEN: usize = 19;

/// Current time at microsecond precision, the finest unit [`iso`] writes.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// ISO-8601 with microseconds, e.g. `2025-01-01T12:00:00.123456+00:00`.
pub fn iso(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Whole-second precision, the first 19 characters of [`iso`].
pub fn truncate_to_seconds(ts: &Timestamp) -> String {
    iso(ts).chars().take(SECONDS_PRECISION_LEN).collect()
}

/// Compact stamp used in export file names: `20250101_120000`.
pub fn compact(ts: &Timestamp) -> String {
    ts.format("%Y%m%d_%H%M%S").to_string()
}

/// `3:04:05` style uptime, dropping sub-second precision.
pub fn human_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// `#[serde(with = "time::iso_format")]` for timestamps written as [`iso`] strings.
pub mod iso_format {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
