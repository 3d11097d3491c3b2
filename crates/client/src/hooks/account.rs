use crate::{
    context::AppContext,
    keys,
    resource::{Access, Resource},
};
use models::Account;

/// The logged-in user
pub type AccountHook = Resource<Account>;

impl AppContext {
    pub fn account(&self) -> AccountHook {
        Resource::new(self.clone(), Some(keys::ACCOUNT.to_owned()), Access::Authenticated)
    }
}
