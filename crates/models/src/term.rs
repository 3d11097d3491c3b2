use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Academic season a term runs in
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Season {
    Fall,
    Spring,
}

impl Season {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Human readable name, e.g. "Fall"
    pub fn title(&self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Spring => "Spring",
        }
    }

    pub fn all() -> Vec<Season> {
        Season::iter().collect()
    }
}

/// An academic term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: String,
    pub season: Season,
    pub year: u16,
    #[serde(with = "calendar_date")]
    pub start_time: NaiveDate,
    #[serde(with = "calendar_date")]
    pub end_time: NaiveDate,
}

impl Term {
    /// Whether `date` falls inside the term, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_time <= date && date <= self.end_time
    }
}

impl FmtDisplay for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.season.title(), self.year)
    }
}

/// Serde adapter for term boundaries.
///
/// Dates are always written as `YYYY-MM-DD`. On input a full RFC 3339
/// timestamp is accepted as well, since the server stores the boundaries as
/// timestamps.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }

    /// Parses either a bare date or an RFC 3339 timestamp
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}
