//! Request signing for access-key authentication.
//!
//! Scheme (signature version 2):
//!
//! 1. Add `access_key_id`, `action`, `nonce`, `signature_method`,
//!    `signature_version`, `timestamp` and `version` to the request's query
//!    parameters. `timestamp` has millisecond precision and `nonce` is a fresh
//!    UUID, so no two signed requests share a signature.
//! 2. Sort all parameters by name (then value) and join them as
//!    `name=value` pairs with `&`, both sides RFC 3986 percent-encoded.
//! 3. Build the string to sign: `METHOD\nhost[:port]\npath\ncanonical_query`.
//! 4. HMAC-SHA256 it with the secret key and base64-encode the digest into
//!    the `signature` parameter.

use crate::error::AuthError;
use crate::helpers::{format_time, mask, REDACTED};
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::fmt;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";
pub const API_VERSION: &str = "2011-08-01";

/// Signing capability held by a client authenticated with an access key.
///
/// `validity` is a client-side bound only: once it elapses the client
/// re-establishes the context; the server never sees it.
#[derive(Clone)]
pub struct SigningContext {
    access_key: String,
    secret_key: SecretString,
    established_at: DateTime<Utc>,
    validity: Option<Duration>,
}

impl SigningContext {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: SecretString,
        validity: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key,
            established_at: now,
            validity,
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    pub fn validity(&self) -> Option<Duration> {
        self.validity
    }

    /// True once the validity window has elapsed. Contexts without a window never go stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.validity {
            Some(validity) => (now - self.established_at)
                .to_std()
                .map(|age| age >= validity)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Same credentials, fresh establishment time.
    pub fn renewed(&self, now: DateTime<Utc>) -> Self {
        Self {
            established_at: now,
            ..self.clone()
        }
    }

    /// Return `params` extended with the authentication parameters and the
    /// signature, ready to be used as the request's query string.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        action: &str,
        params: &[(String, String)],
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, AuthError> {
        let nonce = Uuid::new_v4().to_string();
        self.sign_with_nonce(method, url, action, params, now, &nonce)
    }

    fn sign_with_nonce(
        &self,
        method: &str,
        url: &Url,
        action: &str,
        params: &[(String, String)],
        now: DateTime<Utc>,
        nonce: &str,
    ) -> Result<Vec<(String, String)>, AuthError> {
        let mut signed: Vec<(String, String)> = params.to_vec();
        signed.push(("access_key_id".to_string(), self.access_key.clone()));
        signed.push(("action".to_string(), action.to_string()));
        signed.push(("nonce".to_string(), nonce.to_string()));
        signed.push(("signature_method".to_string(), SIGNATURE_METHOD.to_string()));
        signed.push(("signature_version".to_string(), SIGNATURE_VERSION.to_string()));
        signed.push(("timestamp".to_string(), format_time(now)));
        signed.push(("version".to_string(), API_VERSION.to_string()));

        let canonical = canonical_query(&signed);
        let payload = string_to_sign(method, url, &canonical)?;
        let signature = hmac_base64(self.secret_key.expose_secret(), &payload)?;
        signed.push(("signature".to_string(), signature));
        Ok(signed)
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("access_key", &mask(&self.access_key))
            .field("secret_key", &REDACTED)
            .field("established_at", &self.established_at)
            .field("validity", &self.validity)
            .finish()
    }
}

/// Sorted, percent-encoded `name=value&...` rendering of `params`.
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn string_to_sign(method: &str, url: &Url, canonical: &str) -> Result<String, AuthError> {
    let host = url
        .host_str()
        .ok_or_else(|| AuthError::SigningFailed(format!("URL has no host: {}", url)))?;
    let host = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Ok(format!(
        "{}\n{}\n{}\n{}",
        method.to_uppercase(),
        host.to_lowercase(),
        url.path(),
        canonical
    ))
}

fn hmac_base64(secret: &str, payload: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
