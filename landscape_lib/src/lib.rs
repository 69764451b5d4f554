//! Landscape API client library.
//!
//! Authenticates against a Landscape server, either by email/password login
//! (bearer token) or by signing each request with an access key, and issues
//! authenticated requests to the versioned REST API.

pub mod activities;
pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod helpers;
pub mod observer;
pub mod options;
pub mod signing;

pub use activities::{ActivitiesService, ActivityQuery};
pub use auth::{AuthState, AuthStrategy, Session};
pub use client::{ApiRequest, Client};
pub use credentials::CredentialSet;
pub use error::{ApiError, AuthError, Error};
pub use helpers::parse_duration;
pub use options::{ClientConfig, ClientOption, TransportConfig};

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
