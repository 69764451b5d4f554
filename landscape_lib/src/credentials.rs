//! The credential set a client authenticates with.
//!
//! A set may carry an email/password pair (with an optional account), an
//! access-key/secret pair (with an optional token expiry), both, or neither.
//! Which strategy is used is decided at login time, see
//! [`AuthStrategy::select`](crate::auth::AuthStrategy::select).

use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

/// Immutable bundle of identity material supplied to a [`Client`](crate::Client).
#[derive(Clone, Default)]
pub struct CredentialSet {
    email: Option<String>,
    password: Option<SecretString>,
    account: Option<String>,
    access_key: Option<String>,
    secret_key: Option<SecretString>,
    token_expiry: Option<Duration>,
}

/// Empty strings count as "not supplied".
fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interactive login credentials.
    pub fn with_login(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        account: Option<String>,
    ) -> Self {
        self.email = non_empty(email);
        self.password = non_empty(password).map(SecretString::from);
        self.account = account.and_then(non_empty);
        self
    }

    /// Set the access-key credentials used for signed requests.
    pub fn with_access_key(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        token_expiry: Option<Duration>,
    ) -> Self {
        self.access_key = non_empty(access_key);
        self.secret_key = non_empty(secret_key).map(SecretString::from);
        self.token_expiry = token_expiry;
        self
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }

    pub fn secret_key(&self) -> Option<&SecretString> {
        self.secret_key.as_ref()
    }

    pub fn token_expiry(&self) -> Option<Duration> {
        self.token_expiry
    }

    /// Both email and password are present.
    pub fn has_login(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    /// Both access key and secret key are present.
    pub fn has_access_key(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("account", &self.account)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}
