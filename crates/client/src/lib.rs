//! Client core for the registrar service: a persisted session, a
//! revalidating resource cache, typed resources with their actions, and the
//! role gate that decides which actions a user is offered.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod gate;
pub mod hooks;
pub mod keys;
pub mod notify;
pub mod resource;
pub mod scope;
pub mod session;
pub mod transport;

pub use api::{ApiClient, ClientFactory};
pub use auth::Auth;
pub use cache::{ResourceCache, Snapshot};
pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{ClientError, Result};
pub use forms::InstructorPicker;
pub use gate::{RoleGate, Surface, permits};
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier};
pub use resource::{Access, Resource, ResourceState, Subscription};
pub use scope::Scope;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionState, SessionStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
