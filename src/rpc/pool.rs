//! Rotating pool of equivalent API endpoints with consecutive-failure
//! failover.

use super::{RpcError, RpcTransport};
use async_trait::async_trait;
use serde_derive::Deserialize;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Endpoint {
    pub url: String,
    consecutive_failures: u32,
}

/// Endpoint selection state. Kept free of I/O so failover behavior is
/// testable without a network.
#[derive(Debug)]
pub struct PoolState {
    endpoints: Vec<Endpoint>,
    active: usize,
    failover_threshold: u32,
}

impl PoolState {
    pub fn new(urls: Vec<String>, failover_threshold: u32) -> anyhow::Result<Self> {
        if urls.is_empty() {
            anyhow::bail!("endpoint pool needs at least one URL");
        }
        Ok(Self {
            endpoints: urls
                .into_iter()
                .map(|url| Endpoint {
                    url,
                    consecutive_failures: 0,
                })
                .collect(),
            active: 0,
            failover_threshold,
        })
    }

    pub fn active_url(&self) -> &str {
        &self.endpoints[self.active].url
    }

    pub fn note_success(&mut self) {
        self.endpoints[self.active].consecutive_failures = 0;
    }

    /// Records a failure against the active endpoint. Returns true when the
    /// streak hit the threshold and the pool rotated to the next endpoint
    /// (wrapping), whose own streak starts fresh.
    pub fn note_failure(&mut self) -> bool {
        let endpoint = &mut self.endpoints[self.active];
        endpoint.consecutive_failures += 1;
        if endpoint.consecutive_failures < self.failover_threshold {
            return false;
        }
        self.active = (self.active + 1) % self.endpoints.len();
        self.endpoints[self.active].consecutive_failures = 0;
        true
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<RpcErrorBody>,
}

/// HTTP JSON-RPC transport over a [`PoolState`]. Selection state is shared
/// by every subsystem, so it lives behind a mutex.
pub struct NodePool {
    client: reqwest::Client,
    state: Mutex<PoolState>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl NodePool {
    pub fn new(
        urls: Vec<String>,
        failover_threshold: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            state: Mutex::new(PoolState::new(urls, failover_threshold)?),
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    async fn request(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value, RpcError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout(self.timeout)
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }
        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| RpcError::Malformed(e.to_string()))?;
        if let Some(error) = envelope.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl RpcTransport for NodePool {
    /// One POST against the active endpoint. No in-call retry: a failure is
    /// surfaced to the caller, and the rotation (if any) benefits the next
    /// scheduled call.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let url = self.state.lock().await.active_url().to_string();
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        });

        debug!("{method} -> {url}");
        let outcome = self.request(&url, &body).await;

        let mut state = self.state.lock().await;
        match &outcome {
            Ok(_) => state.note_success(),
            Err(e) if e.is_endpoint_failure() => {
                if state.note_failure() {
                    warn!("endpoint {url} failed, rotating to {}", state.active_url());
                }
            }
            Err(_) => {}
        }
        outcome
    }
}
