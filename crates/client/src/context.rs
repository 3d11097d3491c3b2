use crate::{
    api::{ApiClient, ClientFactory},
    cache::ResourceCache,
    config::ClientConfig,
    error::{ClientError, Result},
    notify::{LogNotifier, Notice, Notifier},
    scope::Scope,
    session::{FileSessionStore, Session},
    transport::{HttpTransport, Transport},
};
use std::sync::Arc;

struct Shared {
    session: Session,
    factory: ClientFactory,
    cache: ResourceCache,
    notifier: Arc<dyn Notifier>,
}

/// Everything a hook or command needs, passed down explicitly.
///
/// Clones share the session, cache and notifier. [`AppContext::child`]
/// shares them too but gets its own [`Scope`].
#[derive(Clone)]
pub struct AppContext {
    shared: Arc<Shared>,
    scope: Scope,
}

impl AppContext {
    pub fn new(
        session: Session,
        factory: ClientFactory,
        cache: ResourceCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                session,
                factory,
                cache,
                notifier,
            }),
            scope: Scope::new(),
        }
    }

    /// Wires the production transport, the file-backed session and the
    /// logging notifier
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Like [`AppContext::from_config`], over any transport
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let session = Session::new(Arc::new(FileSessionStore::new(&config.session_file)));
        Self::new(
            session,
            ClientFactory::new(transport, config.api_url.clone()),
            ResourceCache::new(config.dedupe_interval),
            Arc::new(LogNotifier),
        )
    }

    /// Same context, scope included, with a different notification sink
    pub fn with_notifier(self, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            shared: Arc::new(Shared {
                session: self.shared.session.clone(),
                factory: self.shared.factory.clone(),
                cache: self.shared.cache.clone(),
                notifier,
            }),
            scope: self.scope,
        }
    }

    pub fn session(&self) -> &Session {
        &self.shared.session
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.shared.cache
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// A context whose scope ends with this one
    pub fn child(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            scope: self.scope.child(),
        }
    }

    /// Client for the token that is current right now
    pub fn client(&self) -> ApiClient {
        self.shared.factory.client(self.session().token().as_deref())
    }

    /// Client for the current token, or `Unauthenticated` when logged out
    pub fn authed_client(&self) -> Result<ApiClient> {
        let token = self.session().token().ok_or(ClientError::Unauthenticated)?;
        Ok(self.shared.factory.client(Some(&token)))
    }

    pub fn notify(&self, notice: Notice) {
        self.shared.notifier.notify(notice);
    }

    /// Notifies the user of a failed request and passes the result through.
    /// Other errors are returned silently.
    pub fn report<T>(&self, result: Result<T>, title: &str) -> Result<T> {
        if let Err(e) = &result {
            if e.is_request() {
                self.notify(Notice::error(title, e.user_message()));
            } else {
                log::debug!("{title}: {e}");
            }
        }
        result
    }
}
