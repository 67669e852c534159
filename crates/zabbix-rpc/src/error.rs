//! Error taxonomy.
//!
//! Every failure of a call is a [`CallError`] carrying what was sent. Its
//! [`Cause`] tells apart faults reported by the server ([`ApiError`]) from
//! faults detected on this side ([`ClientFault`]).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid Zabbix version: {0:?}")]
    InvalidVersion(String),
    #[error("invalid server url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error(transparent)]
    Call(Box<CallError>),
}

impl Error {
    /// Server error code if this error carries an [`ApiError`],
    /// [`ErrorCode::None`] otherwise.
    pub fn code(&self) -> ErrorCode {
        self.api_error().map_or(ErrorCode::None, |e| e.code)
    }

    pub fn as_call(&self) -> Option<&CallError> {
        match self {
            Self::Call(e) => Some(e),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        self.as_call().and_then(|e| e.cause().as_api())
    }

    pub fn client_fault(&self) -> Option<&ClientFault> {
        self.as_call().and_then(|e| e.cause().as_client())
    }
}

impl From<CallError> for Error {
    fn from(e: CallError) -> Self {
        Self::Call(Box::new(e))
    }
}

/// A failed call together with the request that caused it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("call {method} (id {request_id}) failed: {cause}; params: {params}")]
pub struct CallError {
    pub request_id: u64,
    pub method: String,
    /// Parameters as sent, with credentials redacted.
    pub params: serde_json::Value,
    #[source]
    pub cause: Cause,
}

impl CallError {
    pub fn cause(&self) -> &Cause {
        &self.cause
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Cause {
    /// Error object returned by the server.
    #[error(transparent)]
    Api(ApiError),
    /// Fault detected without the server reporting one.
    #[error(transparent)]
    Client(ClientFault),
}

impl Cause {
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::Client(_) => None,
        }
    }

    pub fn as_client(&self) -> Option<&ClientFault> {
        match self {
            Self::Client(f) => Some(f),
            Self::Api(_) => None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientFault {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to encode request: {0}")]
    Encode(#[source] Arc<serde_json::Error>),
    #[error("failed to decode response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
    #[error("response id {response:?} does not match request id {request}")]
    IdMismatch { request: u64, response: Option<u64> },
    #[error("user.login returned an empty session token")]
    EmptyToken,
}

impl ClientFault {
    pub(crate) fn encode(e: serde_json::Error) -> Self {
        Self::Encode(Arc::new(e))
    }

    pub(crate) fn decode(e: serde_json::Error) -> Self {
        Self::Decode(Arc::new(e))
    }
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("api error {code}: {message} {data}")]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: String,
}

/// Reserved JSON-RPC / Zabbix error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Not a server error: the fault was detected client-side.
    None,
    Parse,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    Internal,
    Application,
    System,
    Transport,
    Other(i32),
}

impl ErrorCode {
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Parse => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::Internal => -32603,
            Self::Application => -32500,
            Self::System => -32400,
            Self::Transport => -32300,
            Self::Other(code) => *code,
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::None,
            -32700 => Self::Parse,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::Internal,
            -32500 => Self::Application,
            -32400 => Self::System,
            -32300 => Self::Transport,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from)
    }
}
