//! Scripted in-memory transport.
//!
//! A responder closure sees each decoded request envelope and returns the
//! response envelope (or a transport failure). Every request is recorded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use crate::error::ErrorCode;
use crate::transport::{HttpRequest, HttpTransport, TransportError, TransportFuture};

type Responder = dyn Fn(&Value) -> Result<Value, TransportError> + Send + Sync;

/// A request as it reached the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub host: Option<String>,
    pub content_type: String,
    pub body: Value,
}

impl RecordedRequest {
    pub fn method(&self) -> &str {
        method(&self.body)
    }
}

pub struct MockTransport {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers `apiinfo.version` with `version`, `user.login` with `token`,
    /// and hands every other method to `rest`.
    pub fn zabbix<F>(version: &'static str, token: &'static str, rest: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        Self::new(move |req| match method(req) {
            crate::VERSION_METHOD => Ok(ok(req, json!(version))),
            crate::LOGIN_METHOD => Ok(ok(req, json!(token))),
            _ => rest(req),
        })
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Recorded requests for one method.
    pub fn requests_for(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method() == method)
            .collect()
    }
}

impl HttpTransport for MockTransport {
    fn post<'a>(&'a self, request: HttpRequest<'a>) -> TransportFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body: Value = serde_json::from_slice(&request.body)
                .map_err(|e| TransportError::Other(format!("mock: bad request body: {e}")))?;
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(RecordedRequest {
                    url: request.url.to_string(),
                    host: request.host.map(str::to_string),
                    content_type: request.content_type.to_string(),
                    body: body.clone(),
                });
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let resp = (self.responder)(&body)?;
            serde_json::to_vec(&resp).map_err(|e| TransportError::Other(e.to_string()))
        })
    }
}

/// Method name of a request envelope.
pub fn method(req: &Value) -> &str {
    req["method"].as_str().unwrap_or_default()
}

/// Successful response echoing the request id.
pub fn ok(req: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "result": result, "id": req["id"] })
}

/// Error response echoing the request id.
pub fn api_error(req: &Value, code: ErrorCode, message: &str, data: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": { "code": code.as_i32(), "message": message, "data": data },
        "id": req["id"],
    })
}
