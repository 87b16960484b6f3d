//! API client with bearer auth and session purge.

use std::fmt;
use std::sync::Arc;

use http::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use stuffies_cache::Session;

use crate::error::FetchError;
use crate::retry::RetryPolicy;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Where the backend listens unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Client for the storefront backend.
///
/// Every request carries `Authorization: Bearer <token>` while a token is
/// stored in the session. A 401 or 403 answer wipes the stored session so
/// the shopper is treated as signed out from then on.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: Option<Session>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: impl HttpTransport + 'static) -> Self {
        Self::from_shared(base_url, Arc::new(transport))
    }

    pub fn from_shared(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            session: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Native HTTP against `base_url`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn native(base_url: impl Into<String>) -> Self {
        Self::new(base_url, crate::transport::ReqwestTransport::new())
    }

    /// Spin outbound HTTP against `base_url`.
    #[cfg(target_arch = "wasm32")]
    pub fn spin(base_url: impl Into<String>) -> Self {
        Self::new(base_url, crate::transport::SpinTransport)
    }

    /// Read the bearer token from, and purge on rejection, this session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Retry policy for GET requests. Without one, every failure is
    /// returned as is.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET and decode JSON, retrying transient failures when a policy allows it.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        let mut attempt = 0;
        loop {
            match self.execute(Method::GET, &url, None).await {
                Ok(body) => return decode(&url, &body),
                Err(e) if self.retry.should_retry(&e, attempt) => {
                    tracing::debug!(url = %url, attempt, error = %e, "retrying request");
                    self.retry.pause(attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// POST a JSON body once and decode the answer.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    /// PUT a JSON body once and decode the answer.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let bytes = serde_json::to_vec(body).map_err(|e| FetchError::Request(e.to_string()))?;
        let answer = self.execute(method, &url, Some(bytes)).await?;
        decode(&url, &answer)
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, FetchError> {
        let request = self.build_request(method.clone(), url, body)?;
        let response = self.transport.send(request).await?;
        self.check(&method, url, response)
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpRequest, FetchError> {
        let mut builder = http::Request::builder()
            .method(method)
            .uri(url)
            .header(header::ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = self.session.as_ref().and_then(Session::token) {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(body.unwrap_or_default())
            .map_err(|e| FetchError::Request(e.to_string()))
    }

    fn check(&self, method: &Method, url: &str, response: HttpResponse) -> Result<Vec<u8>, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.into_body());
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            if let Some(session) = &self.session {
                tracing::warn!(%method, url, status = status.as_u16(), "credentials rejected, clearing session");
                if let Err(e) = session.clear() {
                    tracing::warn!(error = %e, "failed to clear session");
                }
            }
        }

        Err(FetchError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.session.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}

/// Decode a JSON body. An empty body reads as `null`.
fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, FetchError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| FetchError::Deserialization(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_body_as_null() {
        let value: serde_json::Value = decode("/x", b"").unwrap();
        assert!(value.is_null());
        let value: Option<u32> = decode("/x", b"  \n").unwrap();
        assert_eq!(value, None);
        assert!(matches!(
            decode::<u32>("/x", b"{"),
            Err(FetchError::Deserialization(_))
        ));
    }
}
