// Data models for DayKountdown

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Table holding every kountdown
pub const TABLE_NAME: &str = "KountdownModel";

/// Canonical column names, in on-disk order
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const DATE: &str = "date";
    pub const DATE_IN_MS: &str = "date_in_ms";
    pub const COLOUR: &str = "colour";

    pub const ALL: [&str; 6] = [ID, NAME, DESCRIPTION, DATE, DATE_IN_MS, COLOUR];
}

/// Format used for the `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A persisted kountdown (one row of the store)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kountdown {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: String,
    pub date_in_ms: i64,
    pub colour: String,
}

impl Kountdown {
    /// Parsed form of `date`
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        parse_datetime(&self.date)
    }
}

/// User-supplied fields for creating or replacing a kountdown
#[derive(Debug, Clone, PartialEq)]
pub struct NewKountdown {
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub colour: String,
}

impl NewKountdown {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
        colour: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            date,
            colour: colour.into(),
        }
    }

    /// The `date` column value
    pub fn date_string(&self) -> String {
        self.date.trunc_subsecs(0).format(DATE_FORMAT).to_string()
    }

    /// The `date_in_ms` column value, always derived from `date`
    pub fn date_in_ms(&self) -> i64 {
        self.date.trunc_subsecs(0).timestamp_millis()
    }
}

/// Export projection of a kountdown: no `id`, no `date_in_ms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KountdownData {
    pub name: String,
    pub description: String,
    pub date: String,
    pub colour: String,
}

impl From<&Kountdown> for KountdownData {
    fn from(k: &Kountdown) -> Self {
        Self {
            name: k.name.clone(),
            description: k.description.clone(),
            date: k.date.clone(),
            colour: k.colour.clone(),
        }
    }
}

/// Orderings available for the visible list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortKind {
    AlphabeticalAsc,
    AlphabeticalDesc,
    DateAsc,
    DateDesc,
    #[default]
    CreationAsc,
    CreationDesc,
}

impl SortKind {
    /// Map a numeric sort code; anything unknown is creation order ascending
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SortKind::AlphabeticalAsc,
            1 => SortKind::AlphabeticalDesc,
            2 => SortKind::DateAsc,
            3 => SortKind::DateDesc,
            5 => SortKind::CreationDesc,
            _ => SortKind::CreationAsc,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            SortKind::AlphabeticalAsc => 0,
            SortKind::AlphabeticalDesc => 1,
            SortKind::DateAsc => 2,
            SortKind::DateDesc => 3,
            SortKind::CreationAsc => 4,
            SortKind::CreationDesc => 5,
        }
    }

    /// ORDER BY clause for this sort; ties break on creation order
    pub(crate) fn order_by(self) -> &'static str {
        match self {
            SortKind::AlphabeticalAsc => "name ASC, id ASC",
            SortKind::AlphabeticalDesc => "name DESC, id ASC",
            SortKind::DateAsc => "date_in_ms ASC, id ASC",
            SortKind::DateDesc => "date_in_ms DESC, id ASC",
            SortKind::CreationAsc => "id ASC",
            SortKind::CreationDesc => "id DESC",
        }
    }
}

/// Parse an ISO-8601 date-time as stored or imported
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC), RFC 3339 with an
/// offset, and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_naive_iso() {
        let dt = parse_datetime("2024-01-15T00:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_normalises_to_utc() {
        let dt = parse_datetime("2024-01-15T02:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());

        let dt = parse_datetime("2024-01-15T00:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_datetime("2024-12-25").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("next tuesday").is_none());
        assert!(parse_datetime("2024-13-01T00:00:00").is_none());
    }

    #[test]
    fn test_new_kountdown_columns_agree() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap() + chrono::Duration::milliseconds(750);
        let k = NewKountdown::new("Trip", "", date, "coral");

        assert_eq!(k.date_string(), "2024-01-15T12:30:00");
        assert_eq!(parse_datetime(&k.date_string()).unwrap().timestamp_millis(), k.date_in_ms());
    }

    #[test]
    fn test_sort_kind_codes() {
        for kind in [
            SortKind::AlphabeticalAsc,
            SortKind::AlphabeticalDesc,
            SortKind::DateAsc,
            SortKind::DateDesc,
            SortKind::CreationAsc,
            SortKind::CreationDesc,
        ] {
            assert_eq!(SortKind::from_code(kind.code()), kind);
        }
        assert_eq!(SortKind::from_code(-1), SortKind::CreationAsc);
        assert_eq!(SortKind::from_code(42), SortKind::CreationAsc);
    }

    #[test]
    fn test_sort_kind_serialization() {
        let json = serde_json::to_string(&SortKind::AlphabeticalDesc).unwrap();
        assert_eq!(json, "\"alphabetical-desc\"");
    }
}
