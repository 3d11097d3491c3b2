use super::{Busy, require_id};
use crate::{
    context::AppContext,
    error::Result,
    keys,
    notify::Notice,
    resource::{Access, Resource},
};
use models::{Registration, Roster};
use serde::Serialize;
use serde_json::Value;
use std::ops::Deref;

/// Registrations of a section, unsplit
pub type RegistrationsHook = Resource<Vec<Registration>>;

/// A section's students and waitlist
#[derive(Clone)]
pub struct RosterHook {
    resource: Resource<Roster>,
    course_id: Option<String>,
    section_id: Option<String>,
    is_updating_priority: Busy,
}

#[derive(Serialize)]
struct PriorityUpdate {
    priority: bool,
}

fn section_path(
    course_id: Option<&str>,
    section_id: Option<&str>,
    path: fn(&str, &str) -> String,
) -> Option<String> {
    match (course_id, section_id) {
        (Some(c), Some(s)) if !c.is_empty() && !s.is_empty() => Some(path(c, s)),
        _ => None,
    }
}

impl AppContext {
    pub fn roster(&self, course_id: Option<&str>, section_id: Option<&str>) -> RosterHook {
        RosterHook {
            resource: Resource::new(
                self.clone(),
                section_path(course_id, section_id, keys::roster),
                Access::Authenticated,
            ),
            course_id: course_id.map(str::to_owned),
            section_id: section_id.map(str::to_owned),
            is_updating_priority: Busy::default(),
        }
    }

    pub fn registrations(&self, course_id: Option<&str>, section_id: Option<&str>) -> RegistrationsHook {
        Resource::new(
            self.clone(),
            section_path(course_id, section_id, keys::registrations),
            Access::Authenticated,
        )
    }
}

impl Deref for RosterHook {
    type Target = Resource<Roster>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl RosterHook {
    pub fn is_updating_priority(&self) -> bool {
        self.is_updating_priority.get()
    }

    /// Flags or unflags a registration as priority, then refetches the
    /// roster since priority can move people off the waitlist
    pub async fn set_priority(&self, registration_id: &str, priority: bool) -> Result<()> {
        let ctx = self.context();
        let course_id = require_id(&self.course_id, "course")?;
        let section_id = require_id(&self.section_id, "section")?;
        let client = ctx.authed_client()?;

        let _busy = self.is_updating_priority.enter();
        let path = keys::registration(course_id, section_id, registration_id);
        let result = client
            .put::<_, Option<Value>>(&path, &PriorityUpdate { priority })
            .await;
        ctx.report(result, "Error Prioritizing Registration")?;

        self.resource.revalidate().await;
        ctx.notify(Notice::success("Registration Updated"));
        Ok(())
    }
}
