use crate::account::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// A user's registration in a course section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub user_id: String,
    pub course_section_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: bool,
    /// Hydrated user, absent when the server does not expand it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Account>,
}

impl Registration {
    /// Name to show for the registrant, falling back to the user id
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .map(Account::full_name)
            .unwrap_or_else(|| self.user_id.clone())
    }
}

/// Which list of a roster a registration sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Student,
    Waitlist,
}

impl Display for Placement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Student => write!(f, "Registered"),
            Self::Waitlist => write!(f, "Waitlisted"),
        }
    }
}

/// Registrations of a section, partitioned by the server into enrolled
/// students and the waitlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<Registration>,
    #[serde(default)]
    pub waitlist: Vec<Registration>,
}

impl Roster {
    /// Finds the list holding `user_id`, if any
    pub fn placement_of(&self, user_id: &str) -> Option<Placement> {
        if self.students.iter().any(|r| r.user_id == user_id) {
            Some(Placement::Student)
        } else if self.waitlist.iter().any(|r| r.user_id == user_id) {
            Some(Placement::Waitlist)
        } else {
            None
        }
    }

    /// User ids across both lists
    pub fn members(&self) -> BTreeSet<&str> {
        self.entries().map(|(r, _)| r.user_id.as_str()).collect()
    }

    /// Every registration paired with its placement, students first
    pub fn entries(&self) -> impl Iterator<Item = (&Registration, Placement)> {
        self.students
            .iter()
            .map(|r| (r, Placement::Student))
            .chain(self.waitlist.iter().map(|r| (r, Placement::Waitlist)))
    }

    /// True when no registration appears in both lists
    pub fn is_partitioned(&self) -> bool {
        let students: BTreeSet<&str> = self.students.iter().map(|r| r.id.as_str()).collect();
        self.waitlist.iter().all(|r| !students.contains(r.id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.students.len() + self.waitlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
