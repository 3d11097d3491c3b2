use crate::{
    error::{ClientError, Result},
    transport::{ApiRequest, ApiResponse, Transport},
};
use reqwest::{
    Method, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

/// Builds [`ApiClient`]s bound to whatever token is current.
///
/// Clients are cheap and meant to be derived again for every request, so a
/// login or logout is picked up immediately.
#[derive(Clone)]
pub struct ClientFactory {
    transport: Arc<dyn Transport>,
    base_url: Arc<str>,
}

impl ClientFactory {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a client for the given token
    ///
    /// # Arguments
    /// * `token` - The session token, if any. Empty tokens are ignored.
    ///
    /// # Returns
    /// A client that sends `Authorization: Bearer <token>` iff the token is
    /// non-empty and forms a valid header value
    pub fn client(&self, token: Option<&str>) -> ApiClient {
        let mut headers = HeaderMap::new();

        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => log::warn!("session token is not a valid header value, sending without it"),
            }
        }

        ApiClient {
            transport: Arc::clone(&self.transport),
            base_url: Arc::clone(&self.base_url),
            headers,
        }
    }
}

/// JSON client for the registrar API
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: Arc<str>,
    headers: HeaderMap,
}

impl ApiClient {
    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, Vec::new()).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let body = self.send(Method::GET, path, query, None).await?;
        decode(body)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        decode(self.send(Method::POST, path, Vec::new(), Some(body)).await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        decode(self.send(Method::PUT, path, Vec::new(), Some(body)).await?)
    }

    /// Deletes `path`, returning whatever body the server sent back
    pub async fn delete(&self, path: &str) -> Result<Option<Value>> {
        self.send(Method::DELETE, path, Vec::new(), None).await
    }

    /// Sends a request and returns the raw body of a 2xx response
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path relative to the base URL, starting with `/`
    /// * `query` - Query string pairs, in order
    /// * `body` - JSON body, if any
    ///
    /// # Returns
    /// The decoded body, or a [`ClientError::Request`] for any non-2xx status
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: self.headers.clone(),
            query,
            body,
        };

        let response = self.transport.execute(request).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(request_error(response))
        }
    }
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T> {
    Ok(serde_json::from_value(body.unwrap_or(Value::Null))?)
}

/// Prefers the server's `message`, then a plain-text body, then the reason
/// phrase of the status
fn request_error(response: ApiResponse) -> ClientError {
    let message = match response.body {
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    };

    let message = message.unwrap_or_else(|| {
        StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_owned()
    });

    ClientError::Request {
        status: response.status,
        message,
    }
}
