use crate::registration::Registration;
use serde::{Deserialize, Serialize};
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Role of an account, which decides what the UI offers it
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
pub enum Role {
    Student,
    Professor,
    Administrator,
}

impl Role {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Professor => "Professor",
            Self::Administrator => "Administrator",
        }
    }

    pub fn all() -> Vec<Role> {
        Role::iter().collect()
    }
}

/// A user account as returned by `GET /account` and the user lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_mock: bool,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub instructing_ids: Vec<String>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

impl FmtDisplay for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} <{}> ({})", self.full_name(), self.email, self.role.title())
    }
}
