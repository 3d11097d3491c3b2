use crate::error::{ClientError, Result};
use std::{env, path::PathBuf, time::Duration};

/// Environment variable holding the API base URL
pub const API_URL_VAR: &str = "REGISTRAR_API_URL";
/// Environment variable overriding the session file location
pub const SESSION_FILE_VAR: &str = "REGISTRAR_SESSION_FILE";
/// Environment variable overriding the cache dedupe window, in milliseconds
pub const DEDUPE_MS_VAR: &str = "REGISTRAR_DEDUPE_MS";
/// Environment variable overriding the request timeout, in seconds
pub const TIMEOUT_SECS_VAR: &str = "REGISTRAR_TIMEOUT_SECS";

const DEFAULT_DEDUPE: Duration = Duration::from_millis(2000);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings for the registrar client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub api_url: String,
    /// Where the session token is persisted
    pub session_file: PathBuf,
    /// Window in which a repeated read of the same key reuses the cache
    pub dedupe_interval: Duration,
    /// Per-request timeout handed to the HTTP layer
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            session_file: default_session_file(),
            dedupe_interval: DEFAULT_DEDUPE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Loads `.env` (if present) and reads the `REGISTRAR_*` variables
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("no .env loaded: {e}");
        }

        let api_url = env::var(API_URL_VAR)
            .map_err(|_| ClientError::Config(format!("{API_URL_VAR} is not set")))?;
        let mut config = Self::new(api_url);

        if let Ok(path) = env::var(SESSION_FILE_VAR) {
            config.session_file = PathBuf::from(path);
        }
        if let Some(ms) = parse_var::<u64>(DEDUPE_MS_VAR)? {
            config.dedupe_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(TIMEOUT_SECS_VAR)? {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// `<data dir>/registrar/session.json`, or the working directory when the
/// platform has no data directory
fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("registrar")
        .join("session.json")
}
