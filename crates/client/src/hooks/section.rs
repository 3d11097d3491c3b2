use super::{Busy, require_id, store};
use crate::{
    context::AppContext,
    error::Result,
    keys,
    notify::Notice,
    resource::{Access, Resource, ResourceState},
};
use futures::join;
use models::{
    CourseSection, Placement, Roster,
    forms::{SectionForm, Validate},
};
use reqwest::Method;
use serde_json::Value;
use std::ops::Deref;

/// One section of a course, with registration and admin actions.
///
/// Each action has its own busy flag so that, say, a pending registration
/// does not disable the delete button.
#[derive(Clone)]
pub struct CourseSectionHook {
    resource: Resource<CourseSection>,
    course_id: Option<String>,
    section_id: Option<String>,
    is_registering: Busy,
    is_unregistering: Busy,
    is_removing: Busy,
    is_updating: Busy,
}

impl AppContext {
    pub fn course_section(&self, course_id: Option<&str>, section_id: Option<&str>) -> CourseSectionHook {
        let course_id = course_id.filter(|id| !id.is_empty()).map(str::to_owned);
        let section_id = section_id.filter(|id| !id.is_empty()).map(str::to_owned);
        let path = match (&course_id, &section_id) {
            (Some(c), Some(s)) => Some(keys::section(c, s)),
            _ => None,
        };

        CourseSectionHook {
            resource: Resource::new(self.clone(), path, Access::Authenticated),
            course_id,
            section_id,
            is_registering: Busy::default(),
            is_unregistering: Busy::default(),
            is_removing: Busy::default(),
            is_updating: Busy::default(),
        }
    }
}

impl Deref for CourseSectionHook {
    type Target = Resource<CourseSection>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl CourseSectionHook {
    pub fn is_registering(&self) -> bool {
        self.is_registering.get()
    }

    pub fn is_unregistering(&self) -> bool {
        self.is_unregistering.get()
    }

    pub fn is_removing(&self) -> bool {
        self.is_removing.get()
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating.get()
    }

    fn ids(&self) -> Result<(&str, &str)> {
        Ok((
            require_id(&self.course_id, "course")?,
            require_id(&self.section_id, "section")?,
        ))
    }

    /// Where the account sits in the cached roster, if anywhere
    pub fn is_registered(&self, account_id: &str) -> Option<Placement> {
        let (course_id, section_id) = self.ids().ok()?;
        let snapshot = self.context().cache().peek(&keys::roster(course_id, section_id));
        ResourceState::<Roster>::from_snapshot(snapshot)
            .data?
            .placement_of(account_id)
    }

    /// Registers the current user. Whether they land on the roster or the
    /// waitlist is up to the server.
    pub async fn register(&self) -> Result<()> {
        let ctx = self.context();
        let (course_id, section_id) = self.ids()?;
        let client = ctx.authed_client()?;

        let _busy = self.is_registering.enter();
        let result = client
            .send(Method::POST, &keys::registrations(course_id, section_id), Vec::new(), None)
            .await;
        ctx.report(result, "Error Registering for Course Section")?;

        self.refresh_membership(course_id, section_id).await;
        ctx.notify(Notice::success("Registered for Course Section"));
        Ok(())
    }

    /// Drops the current user's registration
    pub async fn unregister(&self) -> Result<()> {
        let ctx = self.context();
        let (course_id, section_id) = self.ids()?;
        let client = ctx.authed_client()?;

        let _busy = self.is_unregistering.enter();
        let result = client.delete(&keys::registrations(course_id, section_id)).await;
        ctx.report(result, "Error Unregistering for Course Section")?;

        self.refresh_membership(course_id, section_id).await;
        ctx.notify(Notice::success("Unregistered for Course Section"));
        Ok(())
    }

    async fn refresh_membership(&self, course_id: &str, section_id: &str) {
        let cache = self.context().cache();
        let roster = keys::roster(course_id, section_id);
        let registrations = keys::registrations(course_id, section_id);
        join!(
            cache.revalidate(&roster),
            cache.revalidate(&registrations),
            cache.revalidate(keys::ACCOUNT),
        );
    }

    /// Deletes the section. The owning course is patched in the cache
    /// rather than refetched.
    pub async fn remove(&self) -> Result<()> {
        let ctx = self.context();
        let (course_id, section_id) = self.ids()?;
        let client = ctx.authed_client()?;

        let _busy = self.is_removing.enter();
        let key = keys::section(course_id, section_id);
        ctx.report(client.delete(&key).await, "Error Deleting Course Section")?;

        let cache = ctx.cache();
        cache.update(&keys::course(course_id), |mut course| {
            if let Some(sections) = course
                .get_mut("courseSections")
                .and_then(Value::as_array_mut)
            {
                sections.retain(|s| s.get("id").and_then(Value::as_str) != Some(section_id));
            }
            course
        });
        cache.tombstone(&key);
        cache.tombstone(&keys::roster(course_id, section_id));
        cache.tombstone(&keys::registrations(course_id, section_id));

        ctx.notify(Notice::success("Course Section Deleted"));
        Ok(())
    }

    /// Saves an edited section, then refetches the owning course
    pub async fn update(&self, form: &SectionForm) -> Result<Option<CourseSection>> {
        form.validate()?;
        let ctx = self.context();
        let (course_id, section_id) = self.ids()?;
        let client = ctx.authed_client()?;

        let _busy = self.is_updating.enter();
        let key = keys::section(course_id, section_id);
        let body = ctx.report(client.put::<_, Option<Value>>(&key, form).await, "Submission Error")?;

        let section = store::<CourseSection>(ctx.cache(), &key, body).await;
        ctx.cache().revalidate(&keys::course(course_id)).await;

        ctx.notify(Notice::success("Course Section Updated"));
        Ok(section)
    }
}
