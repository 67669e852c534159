//! JSON-RPC 2.0 envelopes.
//!
//! Request: `{"jsonrpc":"2.0","method":..,"params":..,"id":N,"auth":..}`,
//! `auth` omitted when there is no token to send.
//! Response: `{"jsonrpc":"2.0","result":..,"id":N}` or
//! `{"jsonrpc":"2.0","error":{"code":..,"message":..,"data":..},"id":N}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Cause, ClientFault};
use crate::JSONRPC_VERSION;

#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a serde_json::Value,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<&'a str>,
}

impl<'a> Request<'a> {
    pub fn new(
        method: &'a str,
        params: &'a serde_json::Value,
        id: u64,
        auth: Option<&'a str>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
            auth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ApiError>,
    /// Null when the server could not read the request id (parse errors).
    #[serde(default)]
    pub id: Option<u64>,
}

impl Response {
    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ClientFault> {
        serde_json::from_slice(body).map_err(ClientFault::decode)
    }

    /// Check the response against the request it answers and decode the
    /// result. An error object wins over an id mismatch.
    pub fn into_result<R: DeserializeOwned>(self, request_id: u64) -> Result<R, Cause> {
        if let Some(err) = self.error {
            return Err(Cause::Api(err));
        }
        if self.id != Some(request_id) {
            return Err(Cause::Client(ClientFault::IdMismatch {
                request: request_id,
                response: self.id,
            }));
        }
        let result = self.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result).map_err(|e| Cause::Client(ClientFault::decode(e)))
    }
}
