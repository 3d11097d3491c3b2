//! Form inputs and their validation.
//!
//! Every form is checked locally before anything is sent, so a rejected
//! form never produces a request.

use crate::{
    account::{Account, Role},
    course::{Department, Meeting},
    term::{Season, calendar_date},
};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// A validation failure attached to one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors of a rejected form
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First message recorded for `field`
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Implemented by every form input
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn check_email(errors: &mut ValidationErrors, field: &str, email: &str) {
    if !EMAIL.is_match(email.trim()) {
        errors.push(field, "Invalid email");
    }
}

fn check_present(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "Required");
    }
}

/// Mock login: e-mail only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

/// Account sign-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "email", &self.email);
        check_present(&mut errors, "firstName", &self.first_name);
        check_present(&mut errors, "lastName", &self.last_name);
        errors.into_result()
    }
}

/// Create or edit a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermForm {
    pub season: Season,
    pub year: u16,
    #[serde(with = "calendar_date")]
    pub start_time: NaiveDate,
    #[serde(with = "calendar_date")]
    pub end_time: NaiveDate,
}

impl Validate for TermForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(1900..=2999).contains(&self.year) {
            errors.push("year", "Year must be between 1900 and 2999");
        }
        if self.start_time >= self.end_time {
            errors.push("endTime", "End must be after start");
        }
        errors.into_result()
    }
}

/// Create or edit a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseForm {
    pub name: String,
    /// Sent under the `term` key, which is what the course endpoints read
    #[serde(rename = "term")]
    pub term_id: String,
    pub department: Department,
    pub code: u32,
    pub description: String,
}

impl Validate for CourseForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_present(&mut errors, "name", &self.name);
        check_present(&mut errors, "term", &self.term_id);
        if self.code == 0 {
            errors.push("code", "Code must be positive");
        }
        errors.into_result()
    }
}

/// Create or edit a course section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionForm {
    pub instructor_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub meetings: Vec<Meeting>,
}

impl Validate for SectionForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.instructor_ids.is_empty() {
            errors.push("instructorIds", "At least one instructor is required");
        }
        if self.capacity == Some(0) {
            errors.push("capacity", "Capacity must be positive");
        }
        if self.meetings.is_empty() {
            errors.push("meetings", "At least one meeting is required");
        }

        for (i, meeting) in self.meetings.iter().enumerate() {
            if meeting.days_of_week.is_empty() {
                errors.push(format!("meetings[{i}].daysOfWeek"), "Pick at least one day");
            }
            if meeting.time_range().is_none() {
                errors.push(format!("meetings[{i}].endTime"), "End must be after start");
            }
            check_present(&mut errors, &format!("meetings[{i}].location"), &meeting.location);
        }

        errors.into_result()
    }
}

/// Course search filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSearch {
    pub search: String,
    pub term_id: Option<String>,
    pub department: Option<Department>,
}

impl CourseSearch {
    /// Query string pairs: one `q` per word, then `termId` and `dept`
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .search
            .split_whitespace()
            .map(|word| ("q".to_owned(), word.to_owned()))
            .collect();

        if let Some(term_id) = self.term_id.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("termId".to_owned(), term_id.to_owned()));
        }
        if let Some(department) = self.department {
            pairs.push(("dept".to_owned(), department.to_string()));
        }

        pairs
    }
}

/// Instructor lookup by e-mail for the people picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleLookup {
    pub email_address: String,
}

impl PeopleLookup {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![("email".to_owned(), self.email_address.trim().to_owned())]
    }
}

impl Validate for PeopleLookup {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, "emailAddress", &self.email_address);
        errors.into_result()
    }
}

/// Reasons the people picker refuses a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("User Not Found")]
    NotFound,
    #[error("User already included")]
    AlreadyIncluded,
    #[error("Cannot Remove")]
    CannotRemove,
}

/// Instructor selection with a lower bound on how many must remain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeoplePicker {
    min: usize,
    users: Vec<Account>,
}

impl PeoplePicker {
    pub fn new(min: usize, users: Vec<Account>) -> Self {
        Self { min, users }
    }

    pub fn users(&self) -> &[Account] {
        &self.users
    }

    pub fn ids(&self) -> Vec<String> {
        self.users.iter().map(|u| u.id.clone()).collect()
    }

    /// Adds the first account of a lookup result
    pub fn pick(&mut self, found: Vec<Account>) -> Result<&Account, PickerError> {
        let user = found.into_iter().next().ok_or(PickerError::NotFound)?;
        if self.users.iter().any(|u| u.id == user.id) {
            return Err(PickerError::AlreadyIncluded);
        }

        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<(), PickerError> {
        if self.users.len() <= self.min {
            return Err(PickerError::CannotRemove);
        }

        self.users.retain(|u| u.id != id);
        Ok(())
    }
}
