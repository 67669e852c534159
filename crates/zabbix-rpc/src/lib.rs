//! Zabbix RPC -- JSON-RPC 2.0 transport for the Zabbix API.
//!
//! One HTTP POST per call to `<base url>/api_jsonrpc.php`.
//! Session token from `user.login` (or a pre-provisioned API token) is sent
//! as the `auth` member of every later request.
//! The server's API version is queried once per client and drives
//! version-dependent request shapes.

pub mod client;
pub mod envelope;
pub mod error;
pub mod login;
pub mod scalar;
pub mod transport;
pub mod version;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{tracing_hook, Client, ClientBuilder, DebugEvent, DebugHook};
pub use error::{ApiError, CallError, Cause, ClientFault, Error, ErrorCode, Result};
pub use login::{LoginField, LoginRule, LoginRules};
pub use scalar::{Id, Timestamp};
pub use transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};
pub use version::{ApiVersion, PreRelease};

/// Content type of every request body.
pub const CONTENT_TYPE: &str = "application/json-rpc";

/// JSON-RPC protocol version sent in the `jsonrpc` member.
pub const JSONRPC_VERSION: &str = "2.0";

/// Entry point of the API, relative to the frontend base URL.
pub const ENDPOINT: &str = "api_jsonrpc.php";

/// Method that exchanges credentials for a session token.
pub const LOGIN_METHOD: &str = "user.login";

/// Method that reports the server's API version. Needs no authentication.
pub const VERSION_METHOD: &str = "apiinfo.version";
