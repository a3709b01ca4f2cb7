use crate::retry::{Backoff, Retriable};
use std::error::Error as StdError;
use thiserror::Error;

/// Backoff for transport failures and 5xx responses.
pub const NETWORK_BACKOFF: Backoff = Backoff::new(3_000, 15_000);

/// Backoff after the server reset the connection.
pub const RESET_BACKOFF: Backoff = Backoff::new(5_000, 30_000);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("connection reset by server ({url})")]
    ConnectionReset { url: String },

    #[error("request timed out ({url})")]
    Timeout { url: String },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("unreadable response body from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("circuit breaker '{0}' is open")]
    CircuitOpen(String),
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if is_connection_reset(&err) {
            FetchError::ConnectionReset { url }
        } else if err.is_connect() {
            FetchError::Connect {
                url,
                message: err.to_string(),
            }
        } else if err.is_decode() {
            FetchError::Decode {
                url,
                message: err.to_string(),
            }
        } else {
            FetchError::Network {
                url,
                message: err.to_string(),
            }
        }
    }

    /// Whether the upstream itself looks unhealthy. A completed 4xx answer
    /// (e.g. 404 for a match without commentary yet) does not count.
    pub fn is_upstream_failure(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::ConnectionReset { .. }
            | FetchError::Timeout { .. }
            | FetchError::Connect { .. }
            | FetchError::Network { .. } => true,
            FetchError::Decode { .. } | FetchError::CircuitOpen(_) => false,
        }
    }
}

fn is_connection_reset(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = e.source();
    }
    false
}

impl Retriable for FetchError {
    fn is_retriable(&self) -> bool {
        !matches!(self, FetchError::Decode { .. } | FetchError::CircuitOpen(_))
    }

    fn backoff_override(&self) -> Option<Backoff> {
        match self {
            // Non-success status below 500 uses the configured window.
            FetchError::Status { status, .. } if *status < 500 => None,
            FetchError::ConnectionReset { .. } => Some(RESET_BACKOFF),
            _ => Some(NETWORK_BACKOFF),
        }
    }
}
