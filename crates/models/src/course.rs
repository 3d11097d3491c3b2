use crate::{account::Account, days::DaySet, term::Term};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display as FmtDisplay, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

/// Department offering a course.
///
/// Two wire values carry the server's historical misspellings and are kept
/// verbatim so requests round-trip.
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
pub enum Department {
    ArtHistory,
    Biology,
    Chemistry,
    ClassicalStudies,
    Communication,
    ComputerScience,
    Economics,
    Education,
    EngineeringScience,
    English,
    Geosciences,
    HealthCareAdministration,
    History,
    #[serde(rename = "MATHMATICS")]
    #[strum(serialize = "MATHMATICS")]
    Mathematics,
    Music,
    #[serde(rename = "PHILLOSOPHY")]
    #[strum(serialize = "PHILLOSOPHY")]
    Philosophy,
}

impl Department {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    pub fn all() -> Vec<Department> {
        Department::iter().collect()
    }
}

/// Represents a time range for a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub begin: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// Creates a new `TimeRange` if `begin` is before `end`
    pub fn new(begin: NaiveTime, end: NaiveTime) -> Option<Self> {
        (begin < end).then_some(Self { begin, end })
    }

    /// Parses two time strings and creates a `TimeRange` if valid.
    ///
    /// Accepts 24-hour (`"13:30"`) and 12-hour (`"01:30PM"`) notation.
    /// # Returns
    /// `Some(TimeRange)` if parsing succeeds and `begin` is before `end`
    pub fn from_strings(begin: &str, end: &str) -> Option<Self> {
        let begin = wall_clock::parse(begin)?;
        let end = wall_clock::parse(end)?;

        Self::new(begin, end)
    }
}

impl FmtDisplay for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}-{}", self.begin.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Error returned when a meeting shorthand cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMeetingError {
    #[error("expected '<days> <start>-<end> <location>'")]
    Shape,
    #[error(transparent)]
    Days(#[from] crate::days::ParseDaysError),
    #[error("invalid time range '{0}'")]
    Time(String),
}

/// A weekly meeting of a course section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub days_of_week: DaySet,
    #[serde(with = "wall_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "wall_clock")]
    pub end_time: NaiveTime,
    pub location: String,
}

impl Meeting {
    /// The meeting's time span, `None` when it ends before it starts
    pub fn time_range(&self) -> Option<TimeRange> {
        TimeRange::new(self.start_time, self.end_time)
    }
}

impl FromStr for Meeting {
    type Err = ParseMeetingError;

    /// Parses the compact form `"MWF 09:00-10:50 GHC 4102"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(days), Some(times)) = (parts.next(), parts.next()) else {
            return Err(ParseMeetingError::Shape);
        };
        let location = parts.collect::<Vec<_>>().join(" ");
        if location.is_empty() {
            return Err(ParseMeetingError::Shape);
        }

        let days_of_week = DaySet::from_str(days)?;
        let range = times
            .split_once('-')
            .and_then(|(begin, end)| TimeRange::from_strings(begin, end))
            .ok_or_else(|| ParseMeetingError::Time(times.to_owned()))?;

        Ok(Self {
            days_of_week,
            start_time: range.begin,
            end_time: range.end,
            location,
        })
    }
}

impl FmtDisplay for Meeting {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let days = self
            .days_of_week
            .days()
            .map(|day| day.abbreviation())
            .collect::<Vec<_>>()
            .join(" ");

        write!(
            f,
            "{}-{} {}, {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
            days,
            self.location
        )
    }
}

/// A section of a course with its meetings and instructors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSection {
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub instructor_ids: Vec<String>,
    /// Read-only hydration of `instructor_ids`
    #[serde(default)]
    pub instructors: Vec<Account>,
    pub capacity: u32,
}

impl CourseSection {
    pub fn instructor_names(&self) -> String {
        self.instructors
            .iter()
            .map(Account::full_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the hydrated instructors match `instructor_ids` one to one
    pub fn instructors_in_sync(&self) -> bool {
        self.instructors.len() == self.instructor_ids.len()
            && self
                .instructors
                .iter()
                .all(|instructor| self.instructor_ids.contains(&instructor.id))
    }
}

/// A course offered in a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub term_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<Term>,
    pub department: Department,
    pub code: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub course_sections: Vec<CourseSection>,
}

impl Course {
    pub fn section(&self, section_id: &str) -> Option<&CourseSection> {
        self.course_sections.iter().find(|s| s.id == section_id)
    }

    /// Drops a section from the hydrated list.
    /// # Returns
    /// `true` if a section was removed
    pub fn remove_section(&mut self, section_id: &str) -> bool {
        let before = self.course_sections.len();
        self.course_sections.retain(|s| s.id != section_id);
        self.course_sections.len() != before
    }
}

impl FmtDisplay for Course {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}: {}", self.department, self.code, self.name)
    }
}

/// Serde adapter for wall-clock meeting times, written as `HH:MM`
pub mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%I:%M%p"];

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
    }
}
