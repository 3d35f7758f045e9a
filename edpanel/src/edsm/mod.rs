//! EDSM (Elite: Dangerous Star Map) lookups.
//!
//! System body data, value estimates and station lists are fetched from
//! `edsm.net` by 64-bit system address and cached for the rest of the run.

mod cache;
mod client;
mod types;

use thiserror::Error;

pub use cache::{RemoteCache, RemoteCacheStats, DEFAULT_BASE_URL};
pub use client::{BoxFuture, RemoteFetcher, ReqwestFetcher};
pub use types::{Material, RemoteBody, RemoteStation, RemoteSystem, SystemQuery, ValuableBody};

#[cfg(test)]
pub(crate) use client::tests::MockFetcher;

/// Failures talking to EDSM. All of them mean "unavailable now, retry later".
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Connection, timeout or body read failure.
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response was not the expected JSON.
    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    /// EDSM does not know the system.
    #[error("no EDSM data for system address {0}")]
    NoData(u64),
}
