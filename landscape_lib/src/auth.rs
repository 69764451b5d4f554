//! Authentication strategies, sessions and login payloads.
//!
//! A client authenticates in exactly one of two ways:
//! - **Password login**: `POST /login` with email/password, yielding a bearer token.
//! - **Key signing**: no login round-trip; every request is signed with the
//!   access key and secret (see [`crate::signing`]).
//!
//! When a credential set carries both pairs, password login wins.

use crate::credentials::CredentialSet;
use crate::error::AuthError;
use crate::helpers::{mask, REDACTED};
use crate::signing::SigningContext;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::form_urlencoded;

/// The authentication strategy chosen for a credential set.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    PasswordLogin(PasswordLogin),
    KeySigned(KeySignedAuth),
}

impl AuthStrategy {
    /// Pick the strategy for `credentials`: password pair first, then key pair.
    pub fn select(credentials: &CredentialSet) -> Result<Self, AuthError> {
        if credentials.has_login() {
            return PasswordLogin::from_credentials(credentials).map(Self::PasswordLogin);
        }
        if credentials.has_access_key() {
            return KeySignedAuth::from_credentials(credentials).map(Self::KeySigned);
        }
        Err(AuthError::NoCredentials)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::PasswordLogin(_) => "password",
            AuthStrategy::KeySigned(_) => "key-signed",
        }
    }
}

/// Interactive email/password login.
#[derive(Clone)]
pub struct PasswordLogin {
    email: String,
    password: SecretString,
    account: Option<String>,
}

impl PasswordLogin {
    pub fn from_credentials(credentials: &CredentialSet) -> Result<Self, AuthError> {
        match (credentials.email(), credentials.password()) {
            (Some(email), Some(password)) => Ok(Self {
                email: email.to_string(),
                password: password.clone(),
                account: credentials.account().map(String::from),
            }),
            _ => Err(AuthError::NoCredentials),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Form-encoded login body. `account` is only sent when one was given,
    /// otherwise the server picks the default account.
    pub(crate) fn form_body(&self, redact_password: bool) -> String {
        let password = if redact_password {
            REDACTED
        } else {
            self.password.expose_secret()
        };
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("email", &self.email);
        form.append_pair("password", password);
        if let Some(account) = &self.account {
            form.append_pair("account", account);
        }
        form.finish()
    }
}

impl fmt::Debug for PasswordLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordLogin")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("account", &self.account)
            .finish()
    }
}

/// Access-key authentication where every request is signed.
#[derive(Clone)]
pub struct KeySignedAuth {
    access_key: String,
    secret_key: SecretString,
    token_expiry: Option<Duration>,
}

impl KeySignedAuth {
    pub fn from_credentials(credentials: &CredentialSet) -> Result<Self, AuthError> {
        match (credentials.access_key(), credentials.secret_key()) {
            (Some(key), Some(secret)) => Ok(Self {
                access_key: key.to_string(),
                secret_key: secret.clone(),
                token_expiry: credentials.token_expiry(),
            }),
            _ => Err(AuthError::MissingCredentials),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Establish a signing context valid from `now`.
    pub fn establish(&self, now: DateTime<Utc>) -> SigningContext {
        SigningContext::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            self.token_expiry,
            now,
        )
    }
}

impl fmt::Debug for KeySignedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySignedAuth")
            .field("access_key", &mask(&self.access_key))
            .field("secret_key", &REDACTED)
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

/// One account the logged-in user may act on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub default: bool,
    pub name: String,
    pub title: String,
}

/// JSON body returned by `POST /login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub accounts: Vec<Account>,
    pub current_account: String,
    pub email: String,
    pub name: String,
    pub self_hosted: bool,
    pub token: String,
}

/// Session established by a successful password login.
#[derive(Clone)]
pub struct TokenSession {
    token: SecretString,
    pub account: String,
    pub email: String,
    pub name: String,
    pub self_hosted: bool,
    pub accounts: Vec<Account>,
}

impl TokenSession {
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl From<LoginResponse> for TokenSession {
    fn from(res: LoginResponse) -> Self {
        Self {
            token: SecretString::from(res.token),
            account: res.current_account,
            email: res.email,
            name: res.name,
            self_hosted: res.self_hosted,
            accounts: res.accounts,
        }
    }
}

impl fmt::Debug for TokenSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSession")
            .field("token", &REDACTED)
            .field("account", &self.account)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("self_hosted", &self.self_hosted)
            .field("accounts", &self.accounts)
            .finish()
    }
}

/// The authenticated context a client uses to authorize requests.
#[derive(Debug, Clone)]
pub enum Session {
    /// Bearer token from password login.
    Token(TokenSession),
    /// Per-request signing with an access key.
    Signed(SigningContext),
}

impl Session {
    pub fn kind(&self) -> &'static str {
        match self {
            Session::Token(_) => "token",
            Session::Signed(_) => "signed",
        }
    }
}

/// Where a client is in its login lifecycle.
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(Session),
    /// Last login failed; the message is the error it returned.
    Failed(String),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}
