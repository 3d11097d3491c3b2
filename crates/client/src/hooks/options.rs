use crate::{
    context::AppContext,
    keys,
    resource::{Access, Resource},
};
use models::Options;

/// Dropdown values; readable without a session
pub type OptionsHook = Resource<Options>;

impl AppContext {
    pub fn options(&self) -> OptionsHook {
        Resource::new(self.clone(), Some(keys::OPTIONS.to_owned()), Access::Public)
    }
}
