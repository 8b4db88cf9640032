//! Fragment loading: fetch the server-rendered HTML for a tab's route.
//!
//! The contract is deliberately small: one blocking attempt per call, raw
//! markup on success, a typed failure otherwise. The tab manager owns
//! retry policy (there is none: a failed tab stays open until the user
//! closes it) and runs fetches on the runtime's blocking pool so they never
//! stall tab operations.

use std::time::Duration;
use thiserror::Error;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Global timeout for fragment requests (30 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum fragment body size (4 MB). Admin screens are small; anything
/// larger is a server bug or the wrong endpoint.
const MAX_FRAGMENT_SIZE: u64 = 4 * 1024 * 1024;

/// Why a fragment could not be loaded.
///
/// Always recovered locally: the failing tab renders the error inline and
/// stays open, other tabs are unaffected.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// The server answered with a non-success status.
    #[error("fragment request for '{route}' returned HTTP {status}")]
    Status {
        /// Route that was requested.
        route: String,
        /// HTTP status code the server answered with.
        status: u16,
    },

    /// The request never produced a response (DNS, connection, TLS,
    /// timeout).
    #[error("fragment request for '{route}' failed: {message}")]
    Transport {
        /// Route that was requested.
        route: String,
        /// Human-readable transport failure description.
        message: String,
    },

    /// The response body could not be read or exceeded the size limit.
    #[error("failed to read fragment body for '{route}': {message}")]
    Body {
        /// Route that was requested.
        route: String,
        /// Human-readable read failure description.
        message: String,
    },
}

/// Fetches the HTML fragment for a route. Blocking, single attempt per
/// call.
pub trait FragmentLoader: Send + Sync {
    /// Fetch the fragment markup for `route`.
    fn fetch(&self, route: &str) -> Result<String, FragmentError>;
}

/// HTTP fragment loader over a configured base URL.
pub struct HttpFragmentLoader {
    agent: Agent,
    base_url: String,
}

impl HttpFragmentLoader {
    /// Create a loader rooted at `base_url` (scheme plus host plus any
    /// context path, without a trailing slash).
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: agent(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn full_url(&self, route: &str) -> String {
        if route.starts_with('/') {
            format!("{}{}", self.base_url, route)
        } else {
            format!("{}/{}", self.base_url, route)
        }
    }
}

impl FragmentLoader for HttpFragmentLoader {
    fn fetch(&self, route: &str) -> Result<String, FragmentError> {
        let url = self.full_url(route);
        log::debug!("Fetching fragment {url}");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "text/html")
            .call()
            .map_err(|err| match err {
                ureq::Error::StatusCode(status) => FragmentError::Status {
                    route: route.to_string(),
                    status,
                },
                other => FragmentError::Transport {
                    route: route.to_string(),
                    message: other.to_string(),
                },
            })?;

        response
            .into_body()
            .with_config()
            .limit(MAX_FRAGMENT_SIZE)
            .read_to_string()
            .map_err(|err| FragmentError::Body {
                route: route.to_string(),
                message: err.to_string(),
            })
    }
}

/// Create an HTTP agent configured with native-tls and a global timeout.
///
/// native-tls uses the system TLS library (Schannel on Windows, OpenSSL on
/// Linux, Security.framework on macOS) with the platform's built-in root
/// certificates.
fn agent() -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(HTTP_TIMEOUT))
        .build()
        .into()
}
