//! HTTP collaborator: send a body to a URL, receive a body.
//!
//! The client owns no connection state. Pooling, TLS and timeouts belong to
//! the injected transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HOST};
use reqwest::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[source] Arc<reqwest::Error>),
    #[error("unexpected http status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(Arc::new(e))
    }
}

/// One POST request as seen by a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub url: &'a Url,
    /// Replaces the `Host` header without changing the connection target.
    pub host: Option<&'a str>,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + Send + 'a>>;

/// Sends one request and returns the raw response body.
pub trait HttpTransport: Send + Sync {
    fn post<'a>(&'a self, request: HttpRequest<'a>) -> TransportFuture<'a>;
}

/// Default transport over a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(&'a self, request: HttpRequest<'a>) -> TransportFuture<'a> {
        Box::pin(async move {
            let mut builder = self
                .http
                .post(request.url.clone())
                .header(CONTENT_TYPE, request.content_type)
                .body(request.body);
            if let Some(host) = request.host {
                builder = builder.header(HOST, host);
            }

            let resp = builder.send().await?;
            let status = resp.status();
            let body = resp.bytes().await?;
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Ok(body.to_vec())
        })
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn post<'a>(&'a self, request: HttpRequest<'a>) -> TransportFuture<'a> {
        (**self).post(request)
    }
}
