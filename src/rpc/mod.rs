//! JSON-RPC access to the chain's read-only API surface.

pub mod pool;
pub mod reader;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("endpoint request failed: {0}")]
    Transport(String),
    #[error("endpoint timed out after {0:?}")]
    Timeout(Duration),
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RpcError {
    /// Whether this error counts against the active endpoint's failure
    /// streak. A missing record is the chain's answer, not a node fault.
    pub fn is_endpoint_failure(&self) -> bool {
        !matches!(self, RpcError::NotFound(_))
    }
}

/// One request/response against the chain API. Implemented by the failover
/// pool in production and by scripted fakes in tests.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: serde_json::Value)
        -> Result<serde_json::Value, RpcError>;
}
