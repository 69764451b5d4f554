//! HTTP client for the Landscape REST API.
//!
//! Every request goes through [`Client::send`], which attaches the bearer
//! token or request signature of the active session before dispatch.
//!
//! The client is `Send + Sync` and can serve concurrent requests once logged
//! in. Concurrent calls to [`Client::login`] are not serialised against each
//! other; whichever finishes last decides the session.

use crate::activities::ActivitiesService;
use crate::auth::{
    AuthState, AuthStrategy, KeySignedAuth, LoginResponse, PasswordLogin, Session, TokenSession,
};
use crate::credentials::CredentialSet;
use crate::error::{ApiError, AuthError, Error};
use crate::helpers::REDACTED;
use crate::observer::{curl_command, RequestEvent, RequestObserver, ResponseEvent};
use crate::options::{ClientConfig, ClientOption, TransportConfig};
use crate::signing::SigningContext;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// A request to one of the versioned API endpoints, relative to `{endpoint}/api/v2`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API root, starting with `/`.
    pub path: String,
    /// Action name used when the request is signed.
    pub action: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            action: action.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(Method::GET, path, action)
    }

    pub fn post(path: impl Into<String>, action: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Method::POST, path, action)
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }
}

/// Landscape API client.
pub struct Client {
    config: TransportConfig,
    credentials: CredentialSet,
    observer: Arc<dyn RequestObserver>,
    user_agent: String,
    http: HttpClient,
    state: Mutex<AuthState>,
}

impl Client {
    /// Create a client for `endpoint`, applying `options` in order.
    ///
    /// The endpoint is not validated here; a missing or malformed one is
    /// reported by the first operation that needs it. This only fails when the
    /// HTTP stack itself cannot be initialised.
    pub fn new(
        endpoint: impl Into<String>,
        options: impl IntoIterator<Item = ClientOption>,
    ) -> Result<Self, Error> {
        Self::from_config(ClientConfig::new(endpoint).apply(options))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, Error> {
        let ClientConfig {
            transport,
            credentials,
            observer,
        } = config;
        let http = HttpClient::builder()
            .timeout(transport.timeout)
            .danger_accept_invalid_certs(transport.insecure_skip_verify)
            .build()?;
        tracing::debug!(api = %transport.api_base(), "client created");
        Ok(Self {
            config: transport,
            credentials,
            observer,
            user_agent: format!("landscape-cli/{}", crate::VERSION),
            http,
            state: Mutex::new(AuthState::Unauthenticated),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// Snapshot of the login lifecycle.
    pub fn state(&self) -> AuthState {
        self.state.lock().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.lock().session().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated()
    }

    pub fn activities(&self) -> ActivitiesService<'_> {
        ActivitiesService::new(self)
    }

    /// Authenticate with whichever credential pair is present, preferring
    /// email/password over access keys. Calling it again re-authenticates.
    pub async fn login(&self) -> Result<(), Error> {
        let strategy = match AuthStrategy::select(&self.credentials) {
            Ok(strategy) => strategy,
            Err(e) => {
                tracing::error!(error = %e, "error logging in");
                *self.state.lock() = AuthState::Failed(e.to_string());
                return Err(e.into());
            }
        };
        tracing::debug!(strategy = strategy.name(), "logging in");
        *self.state.lock() = AuthState::Authenticating;

        let result = match &strategy {
            AuthStrategy::PasswordLogin(login) => self
                .login_with_password(login)
                .await
                .map(Session::Token),
            AuthStrategy::KeySigned(auth) => self.login_with_key(auth, Utc::now()),
        };

        match result {
            Ok(session) => {
                tracing::debug!(session = session.kind(), "login successful");
                *self.state.lock() = AuthState::Authenticated(session);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, status = ?e.status_code(), "error logging in");
                *self.state.lock() = AuthState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn login_with_password(&self, login: &PasswordLogin) -> Result<TokenSession, Error> {
        let url = self.url("/login")?;
        let request = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(USER_AGENT, &self.user_agent)
            .body(login.form_body(false))
            .build()?;

        let redacted = login.form_body(true);
        let (status, body) = self.execute(request, Some(redacted.as_str())).await?;
        if status != StatusCode::OK {
            let data = serde_json::from_str::<Value>(&body).ok();
            return Err(Error::Rejected(ApiError::new(
                status.to_string(),
                Some(status.as_u16()),
                data,
            )));
        }

        let res: LoginResponse = serde_json::from_str(&body)?;
        tracing::info!(
            email = %res.email,
            account = %res.current_account,
            self_hosted = res.self_hosted,
            "logged in"
        );
        Ok(TokenSession::from(res))
    }

    fn login_with_key(&self, auth: &KeySignedAuth, now: DateTime<Utc>) -> Result<Session, Error> {
        // No round-trip, but a bad endpoint must still fail here rather than on first use.
        self.url("/")?;
        let context = auth.establish(now);
        tracing::debug!(context = ?context, "signing context established");
        Ok(Session::Signed(context))
    }

    /// Issue an authenticated request and decode the JSON response.
    ///
    /// Fails locally with [`AuthError::NotAuthenticated`] unless the last
    /// login succeeded.
    pub async fn send(&self, req: ApiRequest) -> Result<Value, Error> {
        let session = self.session().ok_or(AuthError::NotAuthenticated)?;
        let mut url = self.url(&req.path)?;

        let query = match &session {
            Session::Token(_) => req.query.clone(),
            Session::Signed(context) => {
                let now = Utc::now();
                let context = self.current_signing_context(context, now);
                context.sign(req.method.as_str(), &url, &req.action, &req.query, now)?
            }
        };
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let mut builder = self
            .http
            .request(req.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent);
        if let Session::Token(token) = &session {
            builder = builder.bearer_auth(token.token());
        }
        let body = req.body.as_ref().map(serde_json::to_string).transpose()?;
        if let Some(body) = &body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let (status, text) = self.execute(builder.build()?, body.as_deref()).await?;
        if !status.is_success() {
            let data = serde_json::from_str::<Value>(&text).ok();
            let msg = data
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| status.to_string());
            return Err(Error::Api(ApiError::new(msg, Some(status.as_u16()), data)));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// The signing context to use at `now`, re-established once its validity window is over.
    fn current_signing_context(
        &self,
        context: &SigningContext,
        now: DateTime<Utc>,
    ) -> SigningContext {
        if !context.is_stale(now) {
            return context.clone();
        }
        tracing::debug!("signing context expired, re-establishing");
        let renewed = context.renewed(now);
        let mut state = self.state.lock();
        if let AuthState::Authenticated(Session::Signed(_)) = &*state {
            *state = AuthState::Authenticated(Session::Signed(renewed.clone()));
        }
        renewed
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        let endpoint = self.config.base_endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::Config("no Landscape endpoint configured".to_string()));
        }
        let url = Url::parse(&format!("{}{}", self.config.api_base(), path))
            .map_err(|e| Error::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "unsupported endpoint scheme: {}",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Dispatch `request`, reporting it to the observer. `log_body` is the
    /// (redacted) body shown in debug output and curl echoes.
    async fn execute(
        &self,
        request: reqwest::Request,
        log_body: Option<&str>,
    ) -> Result<(StatusCode, String), Error> {
        let observing = self.config.observing();
        let method = request.method().to_string();
        let url = request.url().to_string();

        if observing {
            let headers = redacted_headers(request.headers());
            let curl = self
                .config
                .generate_curl_command
                .then(|| curl_command(&method, &url, &headers, log_body));
            self.observer.on_request(&RequestEvent {
                method: &method,
                url: &url,
                headers,
                body: if self.config.debug { log_body } else { None },
                curl,
            });
        }

        let started = Instant::now();
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                if observing {
                    self.observer.on_failure(&method, &url, &e.to_string());
                }
                return Err(e.into());
            }
        };
        let status = response.status();
        let text = response.text().await?;

        if observing {
            self.observer.on_response(&ResponseEvent {
                method: &method,
                url: &url,
                status: status.as_u16(),
                body: if self.config.debug { Some(text.as_str()) } else { None },
                elapsed: self.config.trace.then(|| started.elapsed()),
            });
        }
        Ok((status, text))
    }
}

fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name == AUTHORIZATION {
                format!("Bearer {}", REDACTED)
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{
        with_debug, with_generate_curl_command, with_login_auth, with_observer, with_sso_auth,
        with_trace,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn login_body(token: &str) -> Value {
        serde_json::json!({
            "accounts": [{"default": true, "name": "acct1", "title": "Account One"}],
            "current_account": "acct1",
            "email": "a@b.com",
            "name": "Alice",
            "self_hosted": false,
            "token": token,
        })
    }

    async fn mount_login(server: &MockServer, status: u16, token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(login_body(token)))
            .mount(server)
            .await;
    }

    fn password_client(server: &MockServer) -> Client {
        Client::new(server.uri(), [with_login_auth("a@b.com", "hunter2", None)]).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        requests: parking_lot::Mutex<Vec<(Option<String>, Option<String>)>>,
        responses: parking_lot::Mutex<Vec<(u16, bool)>>,
    }

    impl RequestObserver for Recorder {
        fn on_request(&self, event: &RequestEvent<'_>) {
            self.requests
                .lock()
                .push((event.body.map(String::from), event.curl.clone()));
        }

        fn on_response(&self, event: &ResponseEvent<'_>) {
            self.responses
                .lock()
                .push((event.status, event.elapsed.is_some()));
        }
    }

    #[tokio::test]
    async fn login_without_credentials_is_a_configuration_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Client::new(server.uri(), []).unwrap();
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NoCredentials)));
        assert!(err.is_configuration());
        assert!(matches!(client.state(), AuthState::Failed(_)));
    }

    #[tokio::test]
    async fn login_without_endpoint_is_a_configuration_error() {
        let client = Client::new("", [with_login_auth("a@b.com", "pw", None)]).unwrap();
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn password_login_yields_token_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .and(header("accept", "application/json"))
            .and(body_string_contains("email=a%40b.com"))
            .and(body_string_contains("password=hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "abc123",
                "current_account": "acct1",
                "email": "a@b.com",
                "self_hosted": false,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = password_client(&server);
        client.login().await.unwrap();

        match client.session() {
            Some(Session::Token(session)) => {
                assert_eq!(session.token(), "abc123");
                assert_eq!(session.account, "acct1");
                assert_eq!(session.email, "a@b.com");
                assert!(!session.self_hosted);
            }
            other => panic!("unexpected session: {:?}", other),
        }
    }

    #[tokio::test]
    async fn account_is_sent_only_when_given() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .and(body_string_contains("account=acct2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body("tok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(
            server.uri(),
            [with_login_auth("a@b.com", "pw", Some("acct2".to_string()))],
        )
        .unwrap();
        client.login().await.unwrap();
    }

    #[tokio::test]
    async fn password_wins_when_both_pairs_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body("abc123")))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(
            server.uri(),
            [
                with_sso_auth("KEY", "SECRET", None),
                with_login_auth("a@b.com", "pw", None),
            ],
        )
        .unwrap();
        client.login().await.unwrap();
        assert_eq!(client.session().map(|s| s.kind()), Some("token"));
    }

    #[tokio::test]
    async fn rejected_login_blocks_later_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(serde_json::json!({"error": "forbidden"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = password_client(&server);
        let err = client.login().await.unwrap_err();
        match &err {
            Error::Rejected(api) => {
                assert_eq!(api.status_code, Some(403));
                assert_eq!(api.message, "403 Forbidden");
                assert_eq!(
                    api.response_data,
                    Some(serde_json::json!({"error": "forbidden"}))
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(client.state(), AuthState::Failed(_)));

        let err = client.activities().list(&Default::default()).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn malformed_login_body_is_a_decoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = password_client(&server);
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn repeated_login_replaces_session() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        Mock::given(method("POST"))
            .and(path("/api/v2/login"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(login_body(&format!("token-{}", n)))
            })
            .expect(2)
            .mount(&server)
            .await;

        let client = password_client(&server);
        client.login().await.unwrap();
        let first = match client.session() {
            Some(Session::Token(t)) => t.token().to_string(),
            other => panic!("unexpected session: {:?}", other),
        };
        client.login().await.unwrap();
        let second = match client.session() {
            Some(Session::Token(t)) => t.token().to_string(),
            other => panic!("unexpected session: {:?}", other),
        };
        assert_eq!(first, "token-0");
        assert_eq!(second, "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn token_is_attached_as_bearer() {
        let server = MockServer::start().await;
        mount_login(&server, 200, "abc123").await;
        Mock::given(method("GET"))
            .and(path("/api/v2/activities"))
            .and(header("authorization", "Bearer abc123"))
            .and(query_param("limit", "5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = password_client(&server);
        client.login().await.unwrap();
        let query = crate::activities::ActivityQuery {
            limit: Some(5),
            ..Default::default()
        };
        let res = client.activities().list(&query).await.unwrap();
        assert_eq!(res, serde_json::json!({"results": []}));
    }

    #[tokio::test]
    async fn json_body_is_sent_with_content_type() {
        let server = MockServer::start().await;
        mount_login(&server, 200, "abc123").await;
        Mock::given(method("POST"))
            .and(path("/api/v2/activities/cancel"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Bearer abc123"))
            .and(body_string_contains("\"ids\":[1,2]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
            .expect(1)
            .mount(&server)
            .await;

        let client = password_client(&server);
        client.login().await.unwrap();
        let req = ApiRequest::post(
            "/activities/cancel",
            "CancelActivities",
            serde_json::json!({"ids": [1, 2]}),
        );
        assert_eq!(client.send(req).await.unwrap(), serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let server = MockServer::start().await;
        mount_login(&server, 200, "abc123").await;
        Mock::given(method("GET"))
            .and(path("/api/v2/activities/42"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "Activity not found"})),
            )
            .mount(&server)
            .await;

        let client = password_client(&server);
        client.login().await.unwrap();
        let err = client.activities().get(42).await.unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.status_code, Some(404));
                assert_eq!(api.message, "Activity not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn key_login_signs_every_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/activities"))
            .and(query_param("access_key_id", "KEY"))
            .and(query_param("action", "GetActivities"))
            .and(query_param("signature_method", "HmacSHA256"))
            .and(query_param("signature_version", "2"))
            .and(query_param("version", "2011-08-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let client = Client::new(server.uri(), [with_sso_auth("KEY", "SECRET", None)]).unwrap();
        client.login().await.unwrap();
        assert_eq!(client.session().map(|s| s.kind()), Some("signed"));

        client.activities().list(&Default::default()).await.unwrap();
        client.activities().list(&Default::default()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            let names: Vec<String> = request
                .url
                .query_pairs()
                .map(|(k, _)| k.into_owned())
                .collect();
            assert!(names.contains(&"timestamp".to_string()));
            assert!(names.contains(&"signature".to_string()));
            assert!(request.headers.get("authorization").is_none());
        }
    }

    fn signed_params(request: &wiremock::Request) -> (String, String, String) {
        let get = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        };
        (get("timestamp"), get("nonce"), get("signature"))
    }

    #[tokio::test]
    async fn consecutive_signed_requests_never_share_a_signature() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/activities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(3)
            .mount(&server)
            .await;

        let client = Client::new(server.uri(), [with_sso_auth("KEY", "SECRET", None)]).unwrap();
        client.login().await.unwrap();
        for _ in 0..3 {
            client.activities().list(&Default::default()).await.unwrap();
        }

        let requests = server.received_requests().await.unwrap();
        let signed: Vec<_> = requests.iter().map(signed_params).collect();
        assert_eq!(signed.len(), 3);
        for (i, (timestamp, nonce, signature)) in signed.iter().enumerate() {
            assert!(timestamp.ends_with('Z'));
            assert!(!nonce.is_empty());
            for (_, other_nonce, other_signature) in &signed[i + 1..] {
                assert_ne!(nonce, other_nonce);
                assert_ne!(signature, other_signature);
            }
        }
    }

    #[tokio::test]
    async fn expired_signing_context_is_renewed_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/activities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let established_at = |client: &Client| match client.session() {
            Some(Session::Signed(context)) => context.established_at(),
            other => panic!("unexpected session: {:?}", other),
        };

        let client = Client::new(
            server.uri(),
            [with_sso_auth("KEY", "SECRET", Some(std::time::Duration::ZERO))],
        )
        .unwrap();
        client.login().await.unwrap();
        let at_login = established_at(&client);

        std::thread::sleep(std::time::Duration::from_millis(5));
        client.activities().list(&Default::default()).await.unwrap();
        let after_first = established_at(&client);
        assert!(after_first > at_login);

        std::thread::sleep(std::time::Duration::from_millis(5));
        client.activities().list(&Default::default()).await.unwrap();
        let after_second = established_at(&client);
        assert!(after_second > after_first);
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn unbounded_signing_context_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = Client::new(server.uri(), [with_sso_auth("KEY", "SECRET", None)]).unwrap();
        client.login().await.unwrap();
        let before = client.session().map(|s| match s {
            Session::Signed(context) => context.established_at(),
            other => panic!("unexpected session: {:?}", other),
        });
        client.activities().list(&Default::default()).await.unwrap();
        let after = client.session().map(|s| match s {
            Session::Signed(context) => context.established_at(),
            other => panic!("unexpected session: {:?}", other),
        });
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client =
            Client::new("http://127.0.0.1:1", [with_login_auth("a@b.com", "pw", None)]).unwrap();
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!err.is_configuration());
        match client.state() {
            AuthState::Failed(reason) => assert!(reason.starts_with("Transport error")),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn observer_sees_redacted_exchange() {
        let server = MockServer::start().await;
        mount_login(&server, 200, "abc123").await;

        let recorder = Arc::new(Recorder::default());
        let client = Client::new(
            server.uri(),
            [
                with_login_auth("a@b.com", "hunter2", None),
                with_debug(),
                with_trace(),
                with_generate_curl_command(),
                with_observer(recorder.clone()),
            ],
        )
        .unwrap();
        client.login().await.unwrap();

        let requests = recorder.requests.lock();
        assert_eq!(requests.len(), 1);
        let (body, curl) = &requests[0];
        let body = body.as_deref().unwrap();
        let curl = curl.as_deref().unwrap();
        assert!(body.contains("password=********"));
        assert!(!body.contains("hunter2"));
        assert!(curl.starts_with("curl -X POST"));
        assert!(curl.contains("/api/v2/login"));
        assert!(!curl.contains("hunter2"));

        assert_eq!(*recorder.responses.lock(), vec![(200, true)]);
    }

    #[tokio::test]
    async fn observer_is_silent_by_default() {
        let server = MockServer::start().await;
        mount_login(&server, 200, "abc123").await;

        let recorder = Arc::new(Recorder::default());
        let client = Client::new(
            server.uri(),
            [
                with_login_auth("a@b.com", "hunter2", None),
                with_observer(recorder.clone()),
            ],
        )
        .unwrap();
        client.login().await.unwrap();
        assert!(recorder.requests.lock().is_empty());
        assert!(recorder.responses.lock().is_empty());
    }
}
