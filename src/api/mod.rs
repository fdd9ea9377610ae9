//! Request/response boundary to the catalog API.
//!
//! Every call is one RPC-style action: a name plus a JSON object of
//! parameters, answered by a tagged `{ success, data?, total?, message? }`
//! envelope.

mod http;

pub use http::HttpGateway;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors raised below the application level.
///
/// A `{ "success": false }` reply is not an error: it comes back as an
/// [`ApiResponse`] for the caller to interpret.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// The body was not the expected JSON envelope.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Response envelope shared by every action.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "lenient_total")]
    pub total: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `total` arrives as a number or as numeric text depending on the backend.
/// Anything else reads as absent.
fn lenient_total<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
        Other(Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => usize::try_from(n).ok(),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            message: Some(message.into()),
        }
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Take the payload, leaving `null` behind.
    pub fn take_data(&mut self) -> Value {
        self.data.take().unwrap_or(Value::Null)
    }
}

/// One request/response action call.
///
/// `Sync` because the search overlay fans one call per collection out to
/// scoped threads sharing the same gateway.
pub trait Gateway: Sync {
    fn call(&self, action: &str, params: Value) -> Result<ApiResponse, ApiError>;
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn call(&self, action: &str, params: Value) -> Result<ApiResponse, ApiError> {
        (**self).call(action, params)
    }
}

/// Build the request body: `{ "action": action, ...params }`.
///
/// Non-object params are ignored; an `action` key in params never overrides
/// the action name.
pub fn request_body(action: &str, params: Value) -> Value {
    let mut body = serde_json::Map::new();
    if let Value::Object(fields) = params {
        body.extend(fields);
    }
    body.insert("action".into(), Value::String(action.to_string()));
    Value::Object(body)
}
