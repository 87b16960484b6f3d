//! The seam outbound requests go through: Spin's outbound HTTP inside a
//! component, `reqwest` everywhere else.

use async_trait::async_trait;

use crate::error::FetchError;

pub type HttpRequest = http::Request<Vec<u8>>;
pub type HttpResponse = http::Response<Vec<u8>>;

/// Sends one request and returns whatever the server answered.
///
/// Implementations report only transport failures as errors; non-2xx
/// statuses come back as responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

#[cfg(target_arch = "wasm32")]
pub use spin::SpinTransport;

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use async_trait::async_trait;

    use super::{HttpRequest, HttpResponse, HttpTransport};
    use crate::error::FetchError;

    /// Outbound HTTP through a pooled `reqwest` client.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            let client = reqwest::Client::builder()
                .user_agent(concat!("stuffies/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new());
            Self::with_client(client)
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl Default for ReqwestTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
            let request =
                reqwest::Request::try_from(request).map_err(|e| FetchError::Request(e.to_string()))?;
            let response = self
                .client
                .execute(request)
                .await
                .map_err(|e| FetchError::Connection(e.to_string()))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Connection(e.to_string()))?;

            let mut answer = http::Response::new(body.to_vec());
            *answer.status_mut() = status;
            *answer.headers_mut() = headers;
            Ok(answer)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_relative_uri_is_a_request_error() {
            let request = http::Request::builder()
                .uri("/api/products")
                .body(Vec::new())
                .unwrap();
            let err = ReqwestTransport::new().send(request).await.unwrap_err();
            assert!(matches!(err, FetchError::Request(_)));
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod spin {
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use async_trait::async_trait;

    use super::{HttpRequest, HttpResponse, HttpTransport};
    use crate::error::FetchError;

    /// Spin's outbound HTTP.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SpinTransport;

    #[async_trait]
    impl HttpTransport for SpinTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
            SingleThreaded(spin_sdk::http::send::<_, HttpResponse>(request))
                .await
                .map_err(|e| FetchError::Connection(e.to_string()))
        }
    }

    // Spin components run on one thread, so the outbound future never
    // crosses threads even though its type is not `Send`.
    struct SingleThreaded<F>(F);

    unsafe impl<F> Send for SingleThreaded<F> {}

    impl<F: Future> Future for SingleThreaded<F> {
        type Output = F::Output;

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            // SAFETY: the inner future is never moved out of the pinned wrapper.
            unsafe { self.map_unchecked_mut(|s| &mut s.0) }.poll(cx)
        }
    }
}
