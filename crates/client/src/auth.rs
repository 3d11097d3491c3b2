//! Login, logout and sign-up. The only writer of the session.

use crate::{
    context::AppContext,
    error::{ClientError, Result},
    keys,
    notify::Notice,
};
use models::{
    Account,
    forms::{LoginForm, NewUser, Validate},
};
use serde::Deserialize;
use serde_json::Value;

/// `POST /tokens` answers with either a bare string or an object
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Bare(String),
    Wrapped { token: String },
}

impl TokenResponse {
    fn into_token(self) -> String {
        match self {
            TokenResponse::Bare(token) | TokenResponse::Wrapped { token } => token,
        }
    }
}

#[derive(Clone)]
pub struct Auth {
    ctx: AppContext,
}

impl AppContext {
    pub fn auth(&self) -> Auth {
        Auth { ctx: self.clone() }
    }
}

impl Auth {
    pub fn is_authenticated(&self) -> bool {
        self.ctx.session().is_authenticated()
    }

    /// Errors with `Unauthenticated` when nobody is logged in, which front
    /// ends treat as a redirect to login
    pub fn require_session(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::Unauthenticated)
        }
    }

    /// Starts a session with `token`. Cached data belonging to whoever was
    /// logged in before is dropped first.
    pub fn login(&self, token: &str) {
        let purged = self.purge();
        self.ctx.session().set(Some(token.to_owned()));
        log::debug!("logged in, purged {purged} cached keys");
        self.ctx.notify(Notice::success("Login Success"));
    }

    /// Exchanges an e-mail address for a token, then logs in with it
    pub async fn login_with_email(&self, form: &LoginForm) -> Result<()> {
        form.validate()?;

        let result = self
            .ctx
            .client()
            .post::<_, TokenResponse>(keys::TOKENS, form)
            .await;
        let token = self.ctx.report(result, "Submission Error")?.into_token();
        if token.trim().is_empty() {
            return Err(ClientError::Decode("empty token".to_owned()));
        }

        self.login(&token);
        Ok(())
    }

    pub fn logout(&self) {
        self.ctx.session().set(None);
        let purged = self.purge();
        log::debug!("logged out, purged {purged} cached keys");
        self.ctx.notify(Notice::success("Logout Success"));
    }

    /// Creates an account. Does not log in.
    ///
    /// # Returns
    /// The new account when the server echoes it back
    pub async fn sign_up(&self, form: &NewUser) -> Result<Option<Account>> {
        form.validate()?;

        let result = self
            .ctx
            .client()
            .post::<_, Option<Value>>(keys::USERS, form)
            .await;
        let body = self.ctx.report(result, "Submission Error")?;

        self.ctx.notify(Notice::success("User Created"));
        Ok(body.and_then(|v| serde_json::from_value(v).ok()))
    }

    fn purge(&self) -> usize {
        self.ctx.cache().invalidate_all(keys::is_user_scoped)
    }
}
