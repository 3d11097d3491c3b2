//! Typed resources with their mutation actions.
//!
//! Every action runs the same way: send the request, on failure notify and
//! return the error with the cache untouched, otherwise update the cache,
//! wait for it to settle, then notify success.

pub mod account;
pub mod course;
pub mod options;
pub mod roster;
pub mod section;
pub mod term;

pub use account::AccountHook;
pub use course::CourseHook;
pub use options::OptionsHook;
pub use roster::{RegistrationsHook, RosterHook};
pub use section::CourseSectionHook;
pub use term::{CurrentTermHook, TermHook, TermsHook};

use crate::{
    cache::ResourceCache,
    error::{ClientError, Result},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Whether an action is running. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct Busy(Arc<AtomicBool>);

impl Busy {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raises the flag until the guard drops
    pub(crate) fn enter(&self) -> BusyGuard {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(Arc::clone(&self.0))
    }
}

pub(crate) struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub(crate) fn require_id<'a>(id: &'a Option<String>, what: &'static str) -> Result<&'a str> {
    id.as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(ClientError::MissingId(what))
}

/// Caches a response body under `key` when it decodes as `T`; otherwise
/// refetches the key so the cache does not keep the old value
pub(crate) async fn store<T: DeserializeOwned>(
    cache: &ResourceCache,
    key: &str,
    body: Option<Value>,
) -> Option<T> {
    if let Some(value) = body {
        if let Ok(decoded) = serde_json::from_value::<T>(value.clone()) {
            cache.set(key, Some(value));
            return Some(decoded);
        }
    }

    log::debug!("response for {key} was not a full resource, refetching");
    let snapshot = cache.revalidate(key).await;
    snapshot.data.and_then(|v| serde_json::from_value(v).ok())
}
