use crate::{
    args::{SectionCommand, SectionRef},
    output,
    utils::shutdown::cancel_on_signal,
};
use client::{AppContext, ClientError, InstructorPicker, Result};
use models::{
    Meeting,
    forms::{PeopleLookup, SectionForm},
};
use std::time::Duration;

pub async fn run(ctx: &AppContext, command: SectionCommand) -> Result<()> {
    match command {
        SectionCommand::Show(target) => {
            let section = ctx.course_section(Some(&target.course), Some(&target.section));
            let section = ctx.report(section.fetch().await, "Error Loading Course Section")?;
            output::print_section(&section);
        }
        SectionCommand::Create {
            course,
            instructors,
            capacity,
            meetings,
        } => {
            let mut picker = InstructorPicker::new(ctx, Vec::new());
            add_instructors(&mut picker, instructors).await?;

            let form = SectionForm {
                instructor_ids: picker.ids(),
                capacity,
                meetings,
            };
            if let Some(section) = ctx.course(Some(&course)).create_section(&form).await? {
                output::print_section(&section);
            }
        }
        SectionCommand::Edit {
            target,
            add,
            remove,
            capacity,
            meetings,
        } => edit(ctx, target, add, remove, capacity, meetings).await?,
        SectionCommand::Delete(target) => {
            ctx.course_section(Some(&target.course), Some(&target.section))
                .remove()
                .await?
        }
        SectionCommand::Register(target) => {
            let section = ctx.course_section(Some(&target.course), Some(&target.section));
            section.register().await?;
            print_placement(ctx, &target).await?;
        }
        SectionCommand::Unregister(target) => {
            ctx.course_section(Some(&target.course), Some(&target.section))
                .unregister()
                .await?
        }
        SectionCommand::Roster(target) => roster(ctx, &target).await?,
        SectionCommand::Prioritize {
            target,
            registration,
            off,
        } => {
            let roster = ctx.roster(Some(&target.course), Some(&target.section));
            roster.set_priority(&registration, !off).await?;
        }
        SectionCommand::Watch { target, interval } => watch(ctx, &target, interval).await?,
    }
    Ok(())
}

async fn add_instructors(picker: &mut InstructorPicker, emails: Vec<String>) -> Result<()> {
    for email in emails {
        let lookup = PeopleLookup {
            email_address: email,
        };
        // Refusals are already reported
        picker.add(&lookup).await?;
    }
    Ok(())
}

async fn edit(
    ctx: &AppContext,
    target: SectionRef,
    add: Vec<String>,
    remove: Vec<String>,
    capacity: Option<u32>,
    meetings: Vec<Meeting>,
) -> Result<()> {
    let hook = ctx.course_section(Some(&target.course), Some(&target.section));
    let current = ctx.report(hook.fetch().await, "Error Loading Course Section")?;

    let mut picker = InstructorPicker::new(ctx, current.instructors.clone());
    add_instructors(&mut picker, add).await?;
    for id in &remove {
        picker.remove(id);
    }

    let instructor_ids = if current.instructors_in_sync() || !picker.selected().is_empty() {
        picker.ids()
    } else {
        log::warn!("section {} has no hydrated instructors, keeping ids", current.id);
        current.instructor_ids.clone()
    };
    let form = SectionForm {
        instructor_ids,
        capacity: capacity.or(Some(current.capacity)),
        meetings: if meetings.is_empty() {
            current.meetings
        } else {
            meetings
        },
    };

    if let Some(section) = hook.update(&form).await? {
        output::print_section(&section);
    }
    Ok(())
}

/// Tells the user which list the server put them on
async fn print_placement(ctx: &AppContext, target: &SectionRef) -> Result<()> {
    let account = ctx.report(ctx.account().fetch().await, "Error Loading Account")?;
    let section = ctx.course_section(Some(&target.course), Some(&target.section));
    ctx.roster(Some(&target.course), Some(&target.section)).load().await;

    match section.is_registered(&account.id) {
        Some(placement) => println!("{placement}"),
        None => log::debug!("{} not found on the roster", account.id),
    }
    Ok(())
}

async fn roster(ctx: &AppContext, target: &SectionRef) -> Result<()> {
    let roster = ctx.roster(Some(&target.course), Some(&target.section));
    let section = ctx.course_section(Some(&target.course), Some(&target.section));

    let (students, section) = tokio::join!(roster.fetch(), section.load());
    let students = ctx.report(students, "Error Loading Roster")?;
    output::print_roster(&students, section.data.map(|s| s.capacity));
    Ok(())
}

/// Prints the roster on every change and refreshes it every `interval`
/// seconds, until a shutdown signal arrives
async fn watch(ctx: &AppContext, target: &SectionRef, interval: u64) -> Result<()> {
    let page = ctx.child();
    let roster = page.roster(Some(&target.course), Some(&target.section));
    tokio::spawn(cancel_on_signal(page.scope().clone()));
    tokio::spawn({
        let page = page.clone();
        async move {
            let mut ticks = tokio::time::interval(Duration::from_secs(interval.max(1)));
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = page.scope().cancelled() => break,
                    _ = ticks.tick() => {
                        page.cache().revalidate_active().await;
                    }
                }
            }
        }
    });

    let first = roster.load().await;
    if let Some(e) = first.error {
        return page.report(Err(e), "Error Loading Roster");
    }
    if let Some(current) = first.data {
        output::print_roster(&current, None);
    }

    // Only changes after the first load
    let mut subscription = roster.subscribe().ok_or(ClientError::Unauthenticated)?;
    while let Some(state) = subscription.changed().await {
        match (state.data, state.error) {
            (_, Some(e)) => log::warn!("roster refresh failed: {e}"),
            (Some(current), None) if !state.is_validating => {
                println!();
                output::print_roster(&current, None);
            }
            _ => {}
        }
    }
    Ok(())
}
