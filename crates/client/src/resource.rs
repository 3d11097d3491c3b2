use crate::{
    cache::{Fetcher, Snapshot, fetcher},
    context::AppContext,
    error::ClientError,
    scope::Scope,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tokio::sync::watch;

/// Who may read a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Inactive while logged out
    Authenticated,
}

/// Typed view of one cache entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub error: Option<ClientError>,
    pub is_loading: bool,
    pub is_validating: bool,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_validating: false,
        }
    }
}

impl<T: DeserializeOwned> ResourceState<T> {
    /// Data that fails to decode surfaces as a decode error
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let (data, error) = match snapshot.data {
            Some(value) => match serde_json::from_value(value) {
                Ok(data) => (Some(data), snapshot.error),
                Err(e) => (None, Some(ClientError::from(e))),
            },
            None => (None, snapshot.error),
        };

        Self {
            data,
            error,
            is_loading: snapshot.is_loading,
            is_validating: snapshot.is_validating,
        }
    }
}

/// A cache key paired with the type stored under it.
///
/// The key is derived on every call, so a resource built while logged out
/// becomes active as soon as a session exists.
pub struct Resource<T> {
    ctx: AppContext,
    path: Option<String>,
    access: Access,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            path: self.path.clone(),
            access: self.access,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    /// # Arguments
    /// * `ctx` - Context the resource reads through
    /// * `path` - Request path, or `None` when a required id is missing
    /// * `access` - Whether the session is required
    pub fn new(ctx: AppContext, path: Option<String>, access: Access) -> Self {
        Self {
            ctx,
            path,
            access,
            _marker: PhantomData,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// The cache key, or `None` while the resource is inactive
    pub fn key(&self) -> Option<&str> {
        let path = self.path.as_deref()?;
        match self.access {
            Access::Authenticated if !self.ctx.session().is_authenticated() => None,
            _ => Some(path),
        }
    }

    pub fn is_active(&self) -> bool {
        self.key().is_some()
    }

    /// The session is checked again on every call, so a revalidation that
    /// outlives a logout never sends a request without a token
    fn fetcher(&self, key: &str) -> Fetcher {
        let ctx = self.ctx.clone();
        let path = key.to_owned();
        let access = self.access;
        fetcher(move || {
            let client = ctx.client();
            let path = path.clone();
            async move {
                if access == Access::Authenticated && !client.is_authenticated() {
                    return Err(ClientError::Unauthenticated);
                }
                client.get::<Value>(&path).await
            }
        })
    }

    /// Reads the resource, fetching it unless a recent copy is cached
    pub async fn load(&self) -> ResourceState<T> {
        if self.ctx.scope().is_cancelled() {
            return ResourceState::default();
        }
        let Some(key) = self.key() else {
            return ResourceState::default();
        };

        let snapshot = self.ctx.cache().get(Some(key), self.fetcher(key)).await;
        ResourceState::from_snapshot(snapshot)
    }

    /// Loads and returns the data, turning a missing value into its error
    pub async fn fetch(&self) -> Result<T, ClientError> {
        let state = self.load().await;
        match (state.data, state.error) {
            (Some(data), _) => Ok(data),
            (None, Some(e)) => Err(e),
            (None, None) if !self.is_active() => Err(ClientError::Unauthenticated),
            (None, None) => Err(ClientError::Decode("no data".to_owned())),
        }
    }

    /// Cached state without fetching
    pub fn state(&self) -> ResourceState<T> {
        self.key()
            .map(|key| ResourceState::from_snapshot(self.ctx.cache().peek(key)))
            .unwrap_or_default()
    }

    /// Forces a refetch and waits for it
    pub async fn revalidate(&self) -> ResourceState<T> {
        let Some(key) = self.key() else {
            return ResourceState::default();
        };

        let snapshot = self.ctx.cache().refresh(key, self.fetcher(key)).await;
        ResourceState::from_snapshot(snapshot)
    }

    /// Observes the resource until the context's scope ends
    pub fn subscribe(&self) -> Option<Subscription<T>> {
        let key = self.key()?;
        Some(Subscription {
            rx: self.ctx.cache().subscribe(key),
            scope: self.ctx.scope().clone(),
            _marker: PhantomData,
        })
    }
}

/// Stream of state changes for one resource
pub struct Subscription<T> {
    rx: watch::Receiver<Snapshot>,
    scope: Scope,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Subscription<T> {
    pub fn current(&self) -> ResourceState<T> {
        ResourceState::from_snapshot(self.rx.borrow().clone())
    }

    /// Waits for the next change
    ///
    /// # Returns
    /// The new state, or `None` once the scope is cancelled
    pub async fn changed(&mut self) -> Option<ResourceState<T>> {
        if self.scope.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.scope.cancelled() => None,
            changed = self.rx.changed() => match changed {
                Ok(()) => Some(ResourceState::from_snapshot(self.rx.borrow_and_update().clone())),
                Err(_) => None,
            },
        }
    }
}
