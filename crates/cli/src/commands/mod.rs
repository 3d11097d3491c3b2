mod account;
mod course;
mod section;
mod term;

use crate::{
    args::{Command, UserCommand},
    output,
};
use client::{AppContext, Resource, Result, RoleGate};
use models::forms::PeopleLookup;
use serde::de::DeserializeOwned;

pub async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Login { email, token } => account::login(ctx, email, token).await,
        Command::Logout => {
            ctx.auth().logout();
            Ok(())
        }
        Command::Whoami => account::whoami(ctx).await,
        Command::Signup {
            email,
            first_name,
            last_name,
            role,
        } => account::sign_up(ctx, email, first_name, last_name, role).await,
        Command::Options => {
            let options = load(&ctx.options(), "Error Loading Options").await?;
            output::print_options(&options);
            Ok(())
        }
        Command::Actions => actions(ctx).await,
        Command::Terms(command) => term::run(ctx, command).await,
        Command::Courses(command) => course::run(ctx, command).await,
        Command::Section(command) => section::run(ctx, command).await,
        Command::Users(UserCommand::Find { email }) => {
            let lookup = PeopleLookup { email_address: email };
            let users = ctx.find_users(&lookup).await?;
            if users.is_empty() {
                println!("No user with that email address");
            }
            for user in users {
                println!("{:<10} {user}", user.id);
            }
            Ok(())
        }
    }
}

/// Fetches a resource, reporting request failures under `title`
async fn load<T: DeserializeOwned>(resource: &Resource<T>, title: &str) -> Result<T> {
    resource.context().report(resource.fetch().await, title)
}

async fn actions(ctx: &AppContext) -> Result<()> {
    ctx.auth().require_session()?;
    let account = ctx.account().load().await;
    if let Some(e) = account.error.clone() {
        return ctx.report(Err(e), "Error Loading Account");
    }

    let gate = RoleGate::new(&account);
    for surface in gate.visible() {
        println!("{surface}");
    }
    Ok(())
}
