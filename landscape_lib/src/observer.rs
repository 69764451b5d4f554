//! Request/response observation for debug, trace and curl-echo modes.
//!
//! The client hands every exchange to a [`RequestObserver`] when any of those
//! modes is on. The default [`TracingObserver`] logs at debug level; tests and
//! embedders can plug in their own. Observation never changes the request.

use std::time::Duration;

/// What is about to be sent. Secrets are already redacted.
#[derive(Debug, Clone)]
pub struct RequestEvent<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub headers: Vec<(String, String)>,
    /// Present in debug mode only.
    pub body: Option<&'a str>,
    /// Present when curl-command generation is enabled.
    pub curl: Option<String>,
}

/// What came back.
#[derive(Debug, Clone)]
pub struct ResponseEvent<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub status: u16,
    /// Present in debug mode only.
    pub body: Option<&'a str>,
    /// Round-trip time, present in trace mode only.
    pub elapsed: Option<Duration>,
}

/// Interceptor invoked around every request the client dispatches.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent<'_>);

    fn on_response(&self, event: &ResponseEvent<'_>);

    /// The request never produced a response (connection, timeout, TLS).
    fn on_failure(&self, _method: &str, _url: &str, _error: &str) {}
}

/// Logs exchanges through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent<'_>) {
        tracing::debug!(
            method = event.method,
            url = event.url,
            headers = ?event.headers,
            body = event.body,
            "request"
        );
        if let Some(curl) = &event.curl {
            tracing::debug!(curl = %curl, "equivalent curl command");
        }
    }

    fn on_response(&self, event: &ResponseEvent<'_>) {
        tracing::debug!(
            method = event.method,
            url = event.url,
            status = event.status,
            body = event.body,
            "response"
        );
        if let Some(elapsed) = event.elapsed {
            tracing::debug!(
                method = event.method,
                url = event.url,
                elapsed = ?elapsed,
                "trace"
            );
        }
    }

    fn on_failure(&self, method: &str, url: &str, error: &str) {
        tracing::debug!(method, url, error, "request failed");
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Build the curl invocation equivalent to a request.
pub fn curl_command(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<&str>,
) -> String {
    let mut parts = vec!["curl".to_string(), "-X".to_string(), method.to_string()];
    for (name, value) in headers {
        parts.push("-H".to_string());
        parts.push(shell_quote(&format!("{}: {}", name, value)));
    }
    if let Some(body) = body {
        parts.push("-d".to_string());
        parts.push(shell_quote(body));
    }
    parts.push(shell_quote(url));
    parts.join(" ")
}
