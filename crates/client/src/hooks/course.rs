use super::{Busy, require_id, store};
use crate::{
    context::AppContext,
    error::Result,
    keys,
    notify::Notice,
    resource::{Access, Resource},
};
use models::{
    Course, CourseSection,
    forms::{CourseForm, SectionForm, Validate},
};
use serde_json::Value;
use std::ops::Deref;

/// A course with its sections and its admin actions
#[derive(Clone)]
pub struct CourseHook {
    resource: Resource<Course>,
    course_id: Option<String>,
    is_updating: Busy,
    is_removing: Busy,
    is_creating_section: Busy,
}

impl AppContext {
    pub fn course(&self, course_id: Option<&str>) -> CourseHook {
        let course_id = course_id.filter(|id| !id.is_empty()).map(str::to_owned);
        CourseHook {
            resource: Resource::new(
                self.clone(),
                course_id.as_deref().map(keys::course),
                Access::Authenticated,
            ),
            course_id,
            is_updating: Busy::default(),
            is_removing: Busy::default(),
            is_creating_section: Busy::default(),
        }
    }
}

impl Deref for CourseHook {
    type Target = Resource<Course>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl CourseHook {
    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating.get()
    }

    pub fn is_removing(&self) -> bool {
        self.is_removing.get()
    }

    pub fn is_creating_section(&self) -> bool {
        self.is_creating_section.get()
    }

    pub async fn update(&self, form: &CourseForm) -> Result<Option<Course>> {
        form.validate()?;
        let ctx = self.context();
        let key = keys::course(require_id(&self.course_id, "course")?);
        let client = ctx.authed_client()?;

        let _busy = self.is_updating.enter();
        let body = ctx.report(client.put::<_, Option<Value>>(&key, form).await, "Submission Error")?;
        let course = store::<Course>(ctx.cache(), &key, body).await;

        ctx.notify(Notice::success("Course Updated"));
        Ok(course)
    }

    /// Deletes the course and tombstones it along with every cached key
    /// beneath it (sections, rosters, registrations)
    pub async fn remove(&self) -> Result<()> {
        let ctx = self.context();
        let key = keys::course(require_id(&self.course_id, "course")?);
        let client = ctx.authed_client()?;

        let _busy = self.is_removing.enter();
        ctx.report(client.delete(&key).await, "Error Deleting Course")?;

        let cache = ctx.cache();
        for cached in cache.keys() {
            if keys::is_under(&cached, &key) {
                cache.tombstone(&cached);
            }
        }
        cache.tombstone(&key);

        ctx.notify(Notice::success("Course Deleted"));
        Ok(())
    }

    /// Adds a section to the course, then refetches the course
    ///
    /// # Returns
    /// The created section when the server echoes it back
    pub async fn create_section(&self, form: &SectionForm) -> Result<Option<CourseSection>> {
        form.validate()?;
        let ctx = self.context();
        let course_id = require_id(&self.course_id, "course")?;
        let client = ctx.authed_client()?;

        let _busy = self.is_creating_section.enter();
        let body = ctx.report(
            client
                .post::<_, Option<Value>>(&keys::sections(course_id), form)
                .await,
            "Submission Error",
        )?;

        let section = body.and_then(|value| {
            let section: CourseSection = serde_json::from_value(value.clone()).ok()?;
            ctx.cache()
                .set(&keys::section(course_id, &section.id), Some(value));
            Some(section)
        });
        self.resource.revalidate().await;

        ctx.notify(Notice::success("Course Section Created"));
        Ok(section)
    }
}
