use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::watch;

/// Key the token is persisted under
pub const TOKEN_KEY: &str = "token";

/// Durable home of the session token.
///
/// Implementations never fail: storage problems are logged and the store
/// degrades to keeping the token in memory.
pub trait SessionStore: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, token: Option<&str>);
}

/// Token kept only for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn write(&self, token: Option<&str>) {
        *self.token.lock() = token.map(str::to_owned);
    }
}

#[derive(Debug)]
enum Backing {
    File,
    /// The file could not be used; the token lives here until exit
    Memory(Option<String>),
}

/// Token persisted as `{"token": ...}` in a JSON file
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    backing: Mutex<Backing>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backing: Mutex::new(Backing::File),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store has given up on the file for this process
    pub fn is_degraded(&self) -> bool {
        matches!(*self.backing.lock(), Backing::Memory(_))
    }

    fn read_file(&self) -> Result<Option<String>, std::io::Error> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => Ok(map
                .get(TOKEN_KEY)
                .and_then(Value::as_str)
                .map(str::to_owned)),
            Err(e) => {
                log::warn!("ignoring corrupt session file {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }

    fn write_file(&self, token: Option<&str>) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut map = Map::new();
        map.insert(
            TOKEN_KEY.to_owned(),
            token.map_or(Value::Null, |t| Value::String(t.to_owned())),
        );
        fs::write(&self.path, Value::Object(map).to_string())
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Option<String> {
        let mut backing = self.backing.lock();
        if let Backing::Memory(token) = &*backing {
            return token.clone();
        }

        match self.read_file() {
            Ok(token) => token,
            Err(e) => {
                log::warn!(
                    "session file {} unreadable, keeping the session in memory: {e}",
                    self.path.display()
                );
                *backing = Backing::Memory(None);
                None
            }
        }
    }

    fn write(&self, token: Option<&str>) {
        let mut backing = self.backing.lock();
        if let Backing::Memory(stored) = &mut *backing {
            *stored = token.map(str::to_owned);
            return;
        }

        if let Err(e) = self.write_file(token) {
            log::warn!(
                "session file {} unwritable, keeping the session in memory: {e}",
                self.path.display()
            );
            *backing = Backing::Memory(token.map(str::to_owned));
        }
    }
}

/// Whether a token is currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

struct SessionInner {
    store: Arc<dyn SessionStore>,
    token: watch::Sender<Option<String>>,
}

/// The current session, shared by every reader of the token.
///
/// Only [`crate::auth::Auth`] writes to it.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let initial = normalize(store.read());
        let (token, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SessionInner { store, token }),
        }
    }

    /// A session that is never persisted
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        if self.inner.token.borrow().is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::LoggedIn
    }

    /// Receiver notified on every login and logout
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.token.subscribe()
    }

    pub(crate) fn set(&self, token: Option<String>) {
        let token = normalize(token);
        self.inner.store.write(token.as_deref());
        self.inner.token.send_replace(token);
    }
}

/// Empty tokens mean logged out
fn normalize(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}
