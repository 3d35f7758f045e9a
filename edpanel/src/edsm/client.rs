//! HTTP transport abstraction for testability.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::RemoteError;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches raw response bodies from the remote service.
///
/// The cache talks to EDSM only through this trait so tests can substitute a
/// counting mock.
pub trait RemoteFetcher: Send + Sync {
    /// Perform an HTTP GET and return the body of a successful response.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RemoteError>>;
}

/// Real fetcher using an async reqwest client.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("edpanel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl RemoteFetcher for ReqwestFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RemoteError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| RemoteError::Transport(format!("Request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(RemoteError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                });
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| RemoteError::Transport(format!("Failed to read response: {}", e)))
        })
    }
}
