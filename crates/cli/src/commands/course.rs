use crate::{args::CourseCommand, output};
use client::{AppContext, Result};
use models::forms::{CourseForm, CourseSearch};

pub async fn run(ctx: &AppContext, command: CourseCommand) -> Result<()> {
    match command {
        CourseCommand::Search {
            words,
            term,
            department,
        } => {
            let search = CourseSearch {
                search: words.join(" "),
                term_id: term,
                department,
            };
            let courses = ctx.search_courses(&search).await?;
            output::print_courses(&courses);
        }
        CourseCommand::Show { id } => {
            let hook = ctx.course(Some(&id));
            let course = ctx.report(hook.fetch().await, "Error Loading Course")?;
            output::print_course(&course);
        }
        CourseCommand::Create {
            name,
            term,
            department,
            code,
            description,
        } => {
            let form = CourseForm {
                name,
                term_id: term,
                department,
                code,
                description,
            };
            let course = ctx.create_course(&form).await?;
            output::print_course(&course);
        }
        CourseCommand::Edit {
            id,
            name,
            term,
            department,
            code,
            description,
        } => {
            let hook = ctx.course(Some(&id));
            let current = ctx.report(hook.fetch().await, "Error Loading Course")?;

            let form = CourseForm {
                name: name.unwrap_or(current.name),
                term_id: term.unwrap_or(current.term_id),
                department: department.unwrap_or(current.department),
                code: code.unwrap_or(current.code),
                description: description.unwrap_or(current.description),
            };
            if let Some(course) = hook.update(&form).await? {
                output::print_course(&course);
            }
        }
        CourseCommand::Delete { id } => ctx.course(Some(&id)).remove().await?,
    }
    Ok(())
}
