//! Form submission: validate, send, then bring the cache in line.

use crate::{
    context::AppContext,
    error::Result,
    keys,
    notify::Notice,
};
use models::{
    Account, Course, Term,
    forms::{CourseForm, CourseSearch, PeopleLookup, PeoplePicker, PickerError, TermForm, Validate},
};
use serde_json::Value;

impl AppContext {
    /// Creates a course and caches it under its own key
    pub async fn create_course(&self, form: &CourseForm) -> Result<Course> {
        form.validate()?;
        let client = self.authed_client()?;

        let result = client.post::<_, Value>(keys::COURSES, form).await;
        let value = self.report(result, "Submission Error")?;
        let course: Course = serde_json::from_value(value.clone())?;

        self.cache().set(&keys::course(&course.id), Some(value));
        self.notify(Notice::success("Course Created"));
        Ok(course)
    }

    /// Creates a term, caches it under its own key and adds it to the
    /// cached term list before refreshing that list
    pub async fn create_term(&self, form: &TermForm) -> Result<Term> {
        form.validate()?;
        let client = self.authed_client()?;

        let result = client.post::<_, Value>(keys::TERMS, form).await;
        let value = self.report(result, "Submission Error")?;
        let term: Term = serde_json::from_value(value.clone())?;

        let cache = self.cache();
        cache.set(&keys::term(&term.id), Some(value.clone()));
        cache.update(keys::TERMS, |list| match list {
            Value::Array(mut terms) => {
                terms.retain(|t| t.get("id").and_then(Value::as_str) != Some(term.id.as_str()));
                terms.push(value);
                Value::Array(terms)
            }
            other => other,
        });
        cache.revalidate(keys::TERMS).await;

        self.notify(Notice::success("Term Created"));
        Ok(term)
    }

    /// Runs a course search. Results are not cached.
    pub async fn search_courses(&self, search: &CourseSearch) -> Result<Vec<Course>> {
        let result = self
            .client()
            .get_with_query(keys::COURSES, search.query_pairs())
            .await;
        self.report(result, "Submission Error")
    }

    /// Looks up accounts by e-mail
    pub async fn find_users(&self, lookup: &PeopleLookup) -> Result<Vec<Account>> {
        lookup.validate()?;
        let result = self
            .client()
            .get_with_query(keys::USERS, lookup.query_pairs())
            .await;
        self.report(result, "Submission Error")
    }
}

/// Instructor selection backed by the user lookup
pub struct InstructorPicker {
    ctx: AppContext,
    picker: PeoplePicker,
}

impl InstructorPicker {
    /// At least one instructor always remains selected
    pub fn new(ctx: &AppContext, selected: Vec<Account>) -> Self {
        Self {
            ctx: ctx.clone(),
            picker: PeoplePicker::new(1, selected),
        }
    }

    pub fn selected(&self) -> &[Account] {
        self.picker.users()
    }

    pub fn ids(&self) -> Vec<String> {
        self.picker.ids()
    }

    /// Looks up `lookup` and adds the account found
    ///
    /// # Returns
    /// Whether an account was added. Refusals are reported to the notifier.
    pub async fn add(&mut self, lookup: &PeopleLookup) -> Result<bool> {
        let found = self.ctx.find_users(lookup).await?;

        match self.picker.pick(found) {
            Ok(_) => Ok(true),
            Err(PickerError::AlreadyIncluded) => {
                self.ctx.notify(Notice::warning(PickerError::AlreadyIncluded.to_string()));
                Ok(false)
            }
            Err(e) => {
                self.ctx.notify(Notice::error(e.to_string(), lookup.email_address.trim()));
                Ok(false)
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.picker.remove(id) {
            Ok(()) => true,
            Err(e) => {
                self.ctx.notify(Notice::error(e.to_string(), "An instructor is required"));
                false
            }
        }
    }

    pub fn into_picker(self) -> PeoplePicker {
        self.picker
    }
}
