use super::load;
use crate::{
    args::{TermArgs, TermCommand, TermPatch},
    output,
};
use client::{AppContext, Result};
use models::forms::TermForm;

pub async fn run(ctx: &AppContext, command: TermCommand) -> Result<()> {
    match command {
        TermCommand::List => {
            let terms = load(&ctx.terms(), "Error Loading Terms").await?;
            output::print_terms(&terms);
        }
        TermCommand::Current => {
            let term = load(&ctx.current_term(), "Error Loading Term").await?;
            output::print_term(&term);
        }
        TermCommand::Create(TermArgs {
            season,
            year,
            start,
            end,
        }) => {
            let form = TermForm {
                season,
                year,
                start_time: start,
                end_time: end,
            };
            let term = ctx.create_term(&form).await?;
            output::print_term(&term);
        }
        TermCommand::Edit { id, patch } => edit(ctx, &id, patch).await?,
        TermCommand::Delete { id } => ctx.term(Some(&id)).remove().await?,
    }
    Ok(())
}

/// Applies the given fields on top of the stored term
async fn edit(ctx: &AppContext, id: &str, patch: TermPatch) -> Result<()> {
    let hook = ctx.term(Some(id));
    let current = ctx.report(hook.fetch().await, "Error Loading Term")?;

    let form = TermForm {
        season: patch.season.unwrap_or(current.season),
        year: patch.year.unwrap_or(current.year),
        start_time: patch.start.unwrap_or(current.start_time),
        end_time: patch.end.unwrap_or(current.end_time),
    };
    if let Some(term) = hook.update(&form).await? {
        output::print_term(&term);
    }
    Ok(())
}
