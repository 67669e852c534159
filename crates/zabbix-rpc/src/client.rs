//! Zabbix API client: request framing, session token and version cache.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, RwLock};

use crate::envelope::{Request, Response};
use crate::error::{CallError, Cause, ClientFault, Error, Result};
use crate::login::LoginRules;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::version::ApiVersion;
use crate::{CONTENT_TYPE, ENDPOINT, LOGIN_METHOD, VERSION_METHOD};

const REDACTED: &str = "********";

/// Wire traffic as seen by the client, handed to a [`DebugHook`].
#[derive(Debug, Clone, Copy)]
pub enum DebugEvent<'a> {
    Request { id: u64, method: &'a str, body: &'a str },
    Response { id: u64, body: &'a str },
}

pub type DebugHook = Arc<dyn Fn(DebugEvent<'_>) + Send + Sync>;

/// Hook that logs wire traffic at debug level under `zabbix_rpc::wire`.
pub fn tracing_hook() -> DebugHook {
    Arc::new(|event: DebugEvent<'_>| match event {
        DebugEvent::Request { id, method, body } => {
            tracing::debug!(target: "zabbix_rpc::wire", id, method, body, "request");
        }
        DebugEvent::Response { id, body } => {
            tracing::debug!(target: "zabbix_rpc::wire", id, body, "response");
        }
    })
}

pub struct ClientBuilder {
    url: String,
    host: Option<String>,
    api_token: Option<String>,
    login_rules: LoginRules,
    debug_hook: Option<DebugHook>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// `url` is the frontend base, e.g. `http://example.com/zabbix/`, not
    /// the `index.php` or `api_jsonrpc.php` page.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            host: None,
            api_token: None,
            login_rules: LoginRules::default(),
            debug_hook: None,
            http: None,
        }
    }

    /// Send this value as the `Host` header.
    pub fn virtual_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Authenticate with a pre-provisioned API token instead of `user.login`.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn login_rules(mut self, rules: LoginRules) -> Self {
        self.login_rules = rules;
        self
    }

    pub fn debug_hook(mut self, hook: DebugHook) -> Self {
        self.debug_hook = Some(hook);
        self
    }

    /// HTTP client for the default transport. Ignored by
    /// [`build_with_transport`](Self::build_with_transport).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(mut self) -> Result<Client<ReqwestTransport>> {
        let transport = ReqwestTransport::new(self.http.take().unwrap_or_default());
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: HttpTransport>(self, transport: T) -> Result<Client<T>> {
        let api_url = api_url(&self.url)?;
        Ok(Client {
            transport,
            api_url,
            host: self.host,
            next_id: AtomicU64::new(1),
            session: RwLock::new(self.api_token.filter(|t| !t.is_empty())),
            api_version: OnceLock::new(),
            version_query: Mutex::new(None),
            login_rules: self.login_rules,
            debug_hook: self.debug_hook,
        })
    }
}

/// `<base>/api_jsonrpc.php`, whether or not `base` ends with `/`.
fn api_url(base: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: base.to_string(),
        reason,
    };
    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base url".into()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(ENDPOINT).map_err(|e| invalid(e.to_string()))
}

/// Client for one Zabbix server.
///
/// Share across tasks behind an `Arc`. Request ids, the session token and
/// the cached API version are per client.
pub struct Client<T = ReqwestTransport> {
    transport: T,
    api_url: Url,
    host: Option<String>,
    next_id: AtomicU64,
    session: RwLock<Option<String>>,
    api_version: OnceLock<ApiVersion>,
    /// Outcome of the version query in progress, if any.
    version_query: Mutex<Option<VersionWatch>>,
    login_rules: LoginRules,
    debug_hook: Option<DebugHook>,
}

type VersionWatch = watch::Receiver<Option<Result<ApiVersion>>>;

enum VersionTurn {
    Query(watch::Sender<Option<Result<ApiVersion>>>),
    Join(VersionWatch),
}

/// The running version query. Dropping it unfinished frees the slot so a
/// waiter can start over.
struct VersionQuery<'a> {
    slot: &'a Mutex<Option<VersionWatch>>,
    tx: watch::Sender<Option<Result<ApiVersion>>>,
}

impl VersionQuery<'_> {
    fn finish(&self, cache: &OnceLock<ApiVersion>, outcome: Result<ApiVersion>) {
        let mut slot = lock(self.slot);
        if let Ok(version) = &outcome {
            let _ = cache.set(*version);
        }
        *slot = None;
        self.tx.send_replace(Some(outcome));
    }
}

impl Drop for VersionQuery<'_> {
    fn drop(&mut self) {
        if self.tx.borrow().is_none() {
            *lock(self.slot) = None;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url.as_str())
            .field("host", &self.host)
            .field("api_version", &self.api_version.get())
            .finish_non_exhaustive()
    }
}

impl Client<ReqwestTransport> {
    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }
}

impl<T: HttpTransport> Client<T> {
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current session token, if logged in or built with an API token.
    pub async fn token(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Send one request and decode its `result` into `R`.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match serde_json::to_value(params) {
            Ok(params) => self.dispatch(id, method, params, None).await,
            Err(e) => Err(CallError {
                request_id: id,
                method: method.to_string(),
                params: Value::Null,
                cause: Cause::Client(ClientFault::encode(e)),
            }
            .into()),
        }
    }

    /// Server API version. Queried once; later calls return the cached value.
    ///
    /// Callers arriving while the query runs wait for it and get its result,
    /// error included. A failed query is not cached.
    pub async fn api_version(&self) -> Result<ApiVersion> {
        loop {
            let turn = {
                let mut slot = lock(&self.version_query);
                if let Some(version) = self.api_version.get() {
                    return Ok(*version);
                }
                let turn = match slot.as_ref() {
                    Some(rx) => VersionTurn::Join(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        *slot = Some(rx);
                        VersionTurn::Query(tx)
                    }
                };
                turn
            };

            match turn {
                VersionTurn::Query(tx) => {
                    let query = VersionQuery {
                        slot: &self.version_query,
                        tx,
                    };
                    let outcome = self.query_version().await;
                    query.finish(&self.api_version, outcome.clone());
                    return outcome;
                }
                VersionTurn::Join(mut rx) => {
                    let seen = rx.wait_for(Option::is_some).await.map(|v| (*v).clone());
                    // Closed before a result: the querying caller was dropped.
                    if let Ok(Some(outcome)) = seen {
                        return outcome;
                    }
                }
            }
        }
    }

    async fn query_version(&self) -> Result<ApiVersion> {
        let text: String = self.call(VERSION_METHOD, &[0u8; 0]).await?;
        ApiVersion::parse(&text)
    }

    /// Exchange credentials for a session token used by later calls.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let version = self.api_version().await?;
        let params = self.login_rules.params(&version, username, password);
        let shown = self.login_rules.params(&version, username, REDACTED);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token: String = self
            .dispatch(id, LOGIN_METHOD, params, Some(shown.clone()))
            .await?;
        if token.is_empty() {
            return Err(CallError {
                request_id: id,
                method: LOGIN_METHOD.to_string(),
                params: shown,
                cause: Cause::Client(ClientFault::EmptyToken),
            }
            .into());
        }

        *self.session.write().await = Some(token);
        Ok(())
    }

    async fn dispatch<R: DeserializeOwned>(
        &self,
        id: u64,
        method: &str,
        params: Value,
        shown: Option<Value>,
    ) -> Result<R> {
        let auth = if sends_auth(method) {
            self.session.read().await.clone()
        } else {
            None
        };
        match self
            .round_trip(id, method, &params, shown.as_ref(), auth.as_deref())
            .await
        {
            Ok(result) => Ok(result),
            Err(cause) => Err(CallError {
                request_id: id,
                method: method.to_string(),
                params: shown.unwrap_or(params),
                cause,
            }
            .into()),
        }
    }

    async fn round_trip<R: DeserializeOwned>(
        &self,
        id: u64,
        method: &str,
        params: &Value,
        shown: Option<&Value>,
        auth: Option<&str>,
    ) -> std::result::Result<R, Cause> {
        let encode = |params: &Value| {
            serde_json::to_vec(&Request::new(method, params, id, auth))
                .map_err(|e| Cause::Client(ClientFault::encode(e)))
        };
        let body = encode(params)?;

        if let Some(hook) = &self.debug_hook {
            let logged = match shown {
                Some(shown) => encode(shown)?,
                None => body.clone(),
            };
            hook(DebugEvent::Request {
                id,
                method,
                body: &String::from_utf8_lossy(&logged),
            });
        }

        let resp = self
            .transport
            .post(HttpRequest {
                url: &self.api_url,
                host: self.host.as_deref(),
                content_type: CONTENT_TYPE,
                body,
            })
            .await
            .map_err(|e| Cause::Client(ClientFault::Transport(e)))?;

        if let Some(hook) = &self.debug_hook {
            hook(DebugEvent::Response {
                id,
                body: &String::from_utf8_lossy(&resp),
            });
        }

        Response::from_slice(&resp)
            .map_err(Cause::Client)?
            .into_result(id)
    }
}

/// `user.login` and `apiinfo.version` are rejected by the server when they
/// carry `auth`.
fn sends_auth(method: &str) -> bool {
    method != LOGIN_METHOD && method != VERSION_METHOD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::login::{LoginField, LoginRule};
    use crate::mock::{self, MockTransport};
    use crate::transport::TransportError;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn client(transport: MockTransport) -> Client<MockTransport> {
        ClientBuilder::new("http://zabbix.example.com/zabbix/")
            .build_with_transport(transport)
            .unwrap()
    }

    fn echo_hosts() -> MockTransport {
        MockTransport::zabbix("6.4.3", "0424bd59b807674191e7d77572075f33", |req| {
            Ok(mock::ok(req, json!([{ "hostid": "10084", "host": "web01" }])))
        })
    }

    #[test]
    fn test_endpoint_joining() {
        for base in ["http://example.com/zabbix", "http://example.com/zabbix/"] {
            assert_eq!(
                api_url(base).unwrap().as_str(),
                "http://example.com/zabbix/api_jsonrpc.php"
            );
        }
        assert_eq!(
            api_url("https://example.com").unwrap().as_str(),
            "https://example.com/api_jsonrpc.php"
        );
        assert!(matches!(api_url("not a url"), Err(Error::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_ids_increase_from_one() {
        let c = client(echo_hosts());
        let _: Value = c.call("host.get", &json!({})).await.unwrap();
        let _: Value = c.call("host.get", &json!({})).await.unwrap();
        let _: Value = c.call("hostgroup.get", &json!({})).await.unwrap();

        let ids: Vec<u64> = c
            .transport()
            .requests()
            .iter()
            .map(|r| r.body["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_request_framing() {
        let c = ClientBuilder::new("http://127.0.0.1/zabbix")
            .virtual_host("zabbix.internal")
            .build_with_transport(echo_hosts())
            .unwrap();
        let _: Value = c
            .call("host.get", &json!({ "output": ["host"] }))
            .await
            .unwrap();

        let req = &c.transport().requests()[0];
        assert_eq!(req.url, "http://127.0.0.1/zabbix/api_jsonrpc.php");
        assert_eq!(req.host.as_deref(), Some("zabbix.internal"));
        assert_eq!(req.content_type, "application/json-rpc");
        assert_eq!(req.body["jsonrpc"], "2.0");
        assert_eq!(req.body["method"], "host.get");
        assert_eq!(req.body["params"], json!({ "output": ["host"] }));
    }

    #[tokio::test]
    async fn test_auth_attached_only_after_login() {
        let c = client(echo_hosts());
        let _: Value = c.call("host.get", &json!({})).await.unwrap();
        assert!(!c.is_authenticated().await);

        c.login("Admin", "zabbix").await.unwrap();
        assert_eq!(
            c.token().await.as_deref(),
            Some("0424bd59b807674191e7d77572075f33")
        );
        let _: Value = c.call("host.get", &json!({})).await.unwrap();

        let requests = c.transport().requests();
        let methods: Vec<&str> = requests.iter().map(|r| r.method()).collect();
        assert_eq!(
            methods,
            vec!["host.get", "apiinfo.version", "user.login", "host.get"]
        );
        assert!(requests[0].body.get("auth").is_none());
        assert!(requests[1].body.get("auth").is_none());
        assert!(requests[2].body.get("auth").is_none());
        assert_eq!(requests[3].body["auth"], "0424bd59b807674191e7d77572075f33");
    }

    #[tokio::test]
    async fn test_login_field_follows_version() {
        for (version, field) in [
            ("6.4.0beta4", "user"),
            ("6.4.0beta5", "username"),
            ("6.0.21", "user"),
            ("7.0.0", "username"),
        ] {
            let c = client(MockTransport::zabbix(version, "tok", |req| {
                Ok(mock::ok(req, Value::Null))
            }));
            c.login("Admin", "zabbix").await.unwrap();

            let login = &c.transport().requests_for("user.login")[0];
            let params = login.body["params"].as_object().unwrap();
            assert_eq!(params.len(), 2, "{version}");
            assert_eq!(params[field], "Admin", "{version}");
            assert_eq!(params["password"], "zabbix");
        }
    }

    #[tokio::test]
    async fn test_configured_login_rules() {
        let rules = LoginRules::new(vec![LoginRule {
            since: ApiVersion::new(5, 4, 0),
            field: LoginField::Username,
        }]);
        let c = ClientBuilder::new("http://example.com/")
            .login_rules(rules)
            .build_with_transport(MockTransport::zabbix("6.0.0", "tok", |req| {
                Ok(mock::ok(req, Value::Null))
            }))
            .unwrap();
        c.login("Admin", "zabbix").await.unwrap();
        let login = &c.transport().requests_for("user.login")[0];
        assert_eq!(login.body["params"]["username"], "Admin");
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let c = client(MockTransport::zabbix("6.4.3", "", |req| {
            Ok(mock::ok(req, Value::Null))
        }));
        let err = c.login("Admin", "zabbix").await.unwrap_err();
        assert!(matches!(err.client_fault(), Some(ClientFault::EmptyToken)));
        assert!(!c.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_error_redacts_password() {
        let c = client(MockTransport::new(|req| match mock::method(req) {
            "apiinfo.version" => Ok(mock::ok(req, json!("6.4.3"))),
            _ => Ok(mock::api_error(
                req,
                ErrorCode::InvalidParams,
                "Invalid params.",
                "Incorrect user name or password or account is temporarily blocked.",
            )),
        }));
        let err = c.login("Admin", "hunter2").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);

        let call = err.as_call().unwrap();
        assert_eq!(call.method, "user.login");
        assert_eq!(call.request_id, 2);
        assert_eq!(call.params["username"], "Admin");
        assert!(!err.to_string().contains("hunter2"));
        assert!(!c.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_debug_hook_sees_redacted_login() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = seen.clone();
        let hook: DebugHook = Arc::new(move |event: DebugEvent<'_>| {
            let line = match event {
                DebugEvent::Request { body, .. } => format!("> {body}"),
                DebugEvent::Response { body, .. } => format!("< {body}"),
            };
            sink.lock().unwrap().push(line);
        });
        let c = ClientBuilder::new("http://example.com/")
            .debug_hook(hook)
            .build_with_transport(echo_hosts())
            .unwrap();
        c.login("Admin", "hunter2").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|l| !l.contains("hunter2")));
        assert!(seen[2].starts_with("> ") && seen[2].contains("user.login"));
        assert!(seen[3].contains("0424bd59b807674191e7d77572075f33"));
    }

    #[tokio::test]
    async fn test_api_token_mode_skips_login() {
        let c = ClientBuilder::new("http://example.com/")
            .api_token("e2a1f3c9")
            .build_with_transport(echo_hosts())
            .unwrap();
        assert!(c.is_authenticated().await);
        let _: Value = c.call("host.get", &json!({})).await.unwrap();
        assert_eq!(c.api_version().await.unwrap().to_string(), "6.4.3");

        let requests = c.transport().requests();
        assert!(requests.iter().all(|r| r.method() != "user.login"));
        assert_eq!(requests[0].body["auth"], "e2a1f3c9");
        let version = c.transport().requests_for("apiinfo.version");
        assert!(version[0].body.get("auth").is_none());
        assert_eq!(version[0].body["params"], json!([]));
    }

    #[tokio::test]
    async fn test_api_error_is_wrapped() {
        let c = client(MockTransport::new(|req| {
            Ok(mock::api_error(
                req,
                ErrorCode::MethodNotFound,
                "Method not found.",
                "Incorrect API \"hots\".",
            ))
        }));
        let err = c
            .call::<_, Value>("hots.get", &json!({ "output": "extend" }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MethodNotFound);
        let call = err.as_call().unwrap();
        assert_eq!(call.request_id, 1);
        assert_eq!(call.method, "hots.get");
        assert_eq!(call.params, json!({ "output": "extend" }));
        match call.cause() {
            Cause::Api(e) => assert_eq!(e.data, "Incorrect API \"hots\"."),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_id_mismatch_without_error() {
        let c = client(MockTransport::new(|_| {
            Ok(json!({ "jsonrpc": "2.0", "result": [], "id": 99 }))
        }));
        let err = c.call::<_, Value>("host.get", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::None);
        assert!(matches!(
            err.client_fault(),
            Some(ClientFault::IdMismatch { request: 1, response: Some(99) })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let c = client(MockTransport::new(|_| {
            Err(TransportError::Status {
                status: 502,
                body: "Bad Gateway".into(),
            })
        }));
        let err = c.call::<_, Value>("host.get", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::None);
        assert!(matches!(
            err.client_fault(),
            Some(ClientFault::Transport(TransportError::Status { status: 502, .. }))
        ));
    }

    #[tokio::test]
    async fn test_result_shape_mismatch_is_decode_fault() {
        let c = client(echo_hosts());
        let err = c.call::<_, String>("host.get", &json!({})).await.unwrap_err();
        assert!(matches!(err.client_fault(), Some(ClientFault::Decode(_))));
    }

    #[tokio::test]
    async fn test_concurrent_version_resolution_is_single_flight() {
        let transport = MockTransport::zabbix("7.0.5", "tok", |req| {
            Ok(mock::ok(req, Value::Null))
        })
        .with_delay(Duration::from_millis(50));
        let c = Arc::new(client(transport));

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let c = c.clone();
            set.spawn(async move { c.api_version().await });
        }
        while let Some(res) = set.join_next().await {
            assert_eq!(res.unwrap().unwrap(), ApiVersion::new(7, 0, 5));
        }
        assert_eq!(c.transport().call_count(), 1);

        c.api_version().await.unwrap();
        assert_eq!(c.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_a_failed_version_query() {
        let transport =
            MockTransport::new(|_| Err(TransportError::Other("connection refused".into())))
                .with_delay(Duration::from_millis(50));
        let c = Arc::new(client(transport));

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let c = c.clone();
            set.spawn(async move { c.api_version().await });
        }
        while let Some(res) = set.join_next().await {
            let err = res.unwrap().unwrap_err();
            assert_eq!(err.as_call().unwrap().request_id, 1);
            assert!(matches!(
                err.client_fault(),
                Some(ClientFault::Transport(TransportError::Other(_)))
            ));
        }
        assert_eq!(c.transport().call_count(), 1);

        let err = c.api_version().await.unwrap_err();
        assert_eq!(err.as_call().unwrap().request_id, 2);
        assert_eq!(c.transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_version_query_is_taken_over() {
        let transport = MockTransport::zabbix("6.0.21", "tok", |req| {
            Ok(mock::ok(req, Value::Null))
        })
        .with_delay(Duration::from_millis(50));
        let c = Arc::new(client(transport));

        let mut querying = Box::pin(c.api_version());
        let first = tokio::time::timeout(Duration::from_millis(10), &mut querying).await;
        assert!(first.is_err());

        let waiter = {
            let c = c.clone();
            tokio::spawn(async move { c.api_version().await })
        };
        tokio::task::yield_now().await;
        drop(querying);

        assert_eq!(waiter.await.unwrap().unwrap(), ApiVersion::new(6, 0, 21));
        assert_eq!(c.transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_version_query_is_not_cached() {
        let attempts = Arc::new(AtomicU64::new(0));
        let counter = attempts.clone();
        let c = client(MockTransport::new(move |req| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(TransportError::Other("connection reset".into()))
            } else {
                Ok(mock::ok(req, json!("6.0.0")))
            }
        }));
        assert!(c.api_version().await.is_err());
        assert_eq!(c.api_version().await.unwrap(), ApiVersion::new(6, 0, 0));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unparsable_version() {
        let c = client(MockTransport::new(|req| Ok(mock::ok(req, json!("six")))));
        assert!(matches!(
            c.api_version().await,
            Err(Error::InvalidVersion(text)) if text == "six"
        ));
    }
}
