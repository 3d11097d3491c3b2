use super::load;
use crate::output;
use client::{AppContext, ClientError, Result};
use models::{
    Role,
    forms::{LoginForm, NewUser},
};

pub async fn login(ctx: &AppContext, email: Option<String>, token: Option<String>) -> Result<()> {
    let auth = ctx.auth();
    match (email, token) {
        (_, Some(token)) => {
            auth.login(&token);
            Ok(())
        }
        (Some(email), None) => auth.login_with_email(&LoginForm { email }).await,
        (None, None) => Err(ClientError::Config("an email or --token is required".to_owned())),
    }
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    ctx.auth().require_session()?;
    let account = load(&ctx.account(), "Error Loading Account").await?;
    output::print_account(&account);
    Ok(())
}

pub async fn sign_up(
    ctx: &AppContext,
    email: String,
    first_name: String,
    last_name: String,
    role: Role,
) -> Result<()> {
    let form = NewUser {
        email,
        first_name,
        last_name,
        role,
    };

    if let Some(account) = ctx.auth().sign_up(&form).await? {
        println!("{account}");
    }
    Ok(())
}
