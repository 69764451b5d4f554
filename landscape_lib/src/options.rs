//! Functional options for building a [`Client`](crate::Client).
//!
//! Each option is a closure over the [`ClientConfig`] being assembled. They run
//! strictly in the order given, so on conflicting fields the last one wins.
//!
//! ```
//! use landscape_lib::options::{with_debug, with_insecure_skip_verify, with_login_auth};
//! use landscape_lib::Client;
//!
//! let client = Client::new(
//!     "https://landscape.example.com",
//!     [
//!         with_login_auth("me@example.com", "secret", None),
//!         with_insecure_skip_verify(),
//!         with_debug(),
//!     ],
//! )
//! .unwrap();
//! assert!(client.config().debug);
//! ```

use crate::credentials::CredentialSet;
use crate::observer::{RequestObserver, TracingObserver};
use std::sync::Arc;
use std::time::Duration;

/// Request timeout applied when no option overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP-layer behaviour of a client. Fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub base_endpoint: String,
    pub insecure_skip_verify: bool,
    pub debug: bool,
    pub trace: bool,
    pub generate_curl_command: bool,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_endpoint: String::new(),
            insecure_skip_verify: false,
            debug: false,
            trace: false,
            generate_curl_command: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Root of the versioned REST API, `{endpoint}/api/v2`.
    pub fn api_base(&self) -> String {
        format!("{}/api/v2", self.base_endpoint.trim_end_matches('/'))
    }

    /// Whether exchanges are reported to the observer at all.
    pub fn observing(&self) -> bool {
        self.debug || self.trace || self.generate_curl_command
    }
}

/// Everything a client is built from.
#[derive(Clone)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    pub credentials: CredentialSet,
    pub observer: Arc<dyn RequestObserver>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            transport: TransportConfig {
                base_endpoint: endpoint.into(),
                ..TransportConfig::default()
            },
            credentials: CredentialSet::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Apply `options` in order.
    pub fn apply(mut self, options: impl IntoIterator<Item = ClientOption>) -> Self {
        for option in options {
            option(&mut self);
        }
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("transport", &self.transport)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// A single configuration step.
pub type ClientOption = Box<dyn FnOnce(&mut ClientConfig) + Send>;

/// Override the endpoint given to [`Client::new`](crate::Client::new).
pub fn with_endpoint(endpoint: impl Into<String>) -> ClientOption {
    let endpoint = endpoint.into();
    Box::new(move |c| c.transport.base_endpoint = endpoint)
}

/// Authenticate with email and password; without `account` the server picks the default one.
pub fn with_login_auth(
    email: impl Into<String>,
    password: impl Into<String>,
    account: Option<String>,
) -> ClientOption {
    let (email, password) = (email.into(), password.into());
    Box::new(move |c| {
        c.credentials = std::mem::take(&mut c.credentials).with_login(email, password, account)
    })
}

/// Authenticate by signing every request with an access key and secret.
pub fn with_sso_auth(
    key: impl Into<String>,
    secret: impl Into<String>,
    expiry: Option<Duration>,
) -> ClientOption {
    let (key, secret) = (key.into(), secret.into());
    Box::new(move |c| {
        c.credentials = std::mem::take(&mut c.credentials).with_access_key(key, secret, expiry)
    })
}

/// Replace the whole credential set.
pub fn with_credentials(credentials: CredentialSet) -> ClientOption {
    Box::new(move |c| c.credentials = credentials)
}

/// Log request and response bodies.
pub fn with_debug() -> ClientOption {
    Box::new(|c| {
        tracing::debug!("activating debug mode");
        c.transport.debug = true;
    })
}

/// Log round-trip timing of every request.
pub fn with_trace() -> ClientOption {
    Box::new(|c| {
        tracing::debug!("activating trace mode");
        c.transport.trace = true;
    })
}

/// Skip verification of the server's certificate chain and host name, like
/// `curl --insecure`. For testing only.
pub fn with_insecure_skip_verify() -> ClientOption {
    Box::new(|c| {
        tracing::debug!("skipping TLS certificate verification");
        c.transport.insecure_skip_verify = true;
    })
}

/// Emit the curl command equivalent to each request.
pub fn with_generate_curl_command() -> ClientOption {
    Box::new(|c| c.transport.generate_curl_command = true)
}

pub fn with_timeout(timeout: Duration) -> ClientOption {
    Box::new(move |c| c.transport.timeout = timeout)
}

/// Route request/response observation to `observer` instead of `tracing`.
pub fn with_observer(observer: Arc<dyn RequestObserver>) -> ClientOption {
    Box::new(move |c| c.observer = observer)
}
