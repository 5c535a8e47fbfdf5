//! Typed request functions over an [`RpcTransport`]. No caching here;
//! staleness tolerance lives with the pollers.

use super::{RpcError, RpcTransport};
use crate::chain::{Account, Block, ChainProperties, FollowCount, HistoryItem, Witness};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct ChainReader {
    transport: Arc<dyn RpcTransport>,
}

impl ChainReader {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let raw = self.transport.call(method, params).await?;
        serde_json::from_value(raw).map_err(|e| RpcError::Malformed(format!("{method}: {e}")))
    }

    pub async fn get_dynamic_global_properties(&self) -> Result<ChainProperties, RpcError> {
        self.call("condenser_api.get_dynamic_global_properties", json!([]))
            .await
    }

    pub async fn get_block(&self, height: u64) -> Result<Block, RpcError> {
        let raw = self
            .transport
            .call("condenser_api.get_block", json!([height]))
            .await?;
        if raw.is_null() {
            return Err(RpcError::NotFound(format!("block {height}")));
        }
        let mut block: Block = serde_json::from_value(raw)
            .map_err(|e| RpcError::Malformed(format!("block {height}: {e}")))?;
        block.height = height;
        Ok(block)
    }

    /// Batch account fetch. A record in the batch that fails to deserialize
    /// is dropped with a warning rather than poisoning the whole batch.
    pub async fn get_accounts(&self, names: &[String]) -> Result<Vec<Account>, RpcError> {
        let raw = self
            .transport
            .call("condenser_api.get_accounts", json!([names]))
            .await?;
        let entries: Vec<serde_json::Value> = serde_json::from_value(raw)
            .map_err(|e| RpcError::Malformed(format!("get_accounts: {e}")))?;
        let mut accounts = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Account>(entry) {
                Ok(account) => accounts.push(account),
                Err(e) => warn!("dropping malformed account record: {e}"),
            }
        }
        Ok(accounts)
    }

    pub async fn get_account(&self, name: &str) -> Result<Account, RpcError> {
        self.get_accounts(&[name.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::NotFound(format!("account {name}")))
    }

    pub async fn get_follow_count(&self, name: &str) -> Result<FollowCount, RpcError> {
        self.call("condenser_api.get_follow_count", json!([name]))
            .await
    }

    /// Top witnesses ordered by vote.
    pub async fn get_witnesses_by_vote(&self, limit: u32) -> Result<Vec<Witness>, RpcError> {
        self.call("condenser_api.get_witnesses_by_vote", json!(["", limit]))
            .await
    }

    /// Account names starting at `lower_bound`, at most `limit` of them.
    pub async fn lookup_accounts(
        &self,
        lower_bound: &str,
        limit: u32,
    ) -> Result<Vec<String>, RpcError> {
        self.call("condenser_api.lookup_accounts", json!([lower_bound, limit]))
            .await
    }

    pub async fn get_account_count(&self) -> Result<u64, RpcError> {
        self.call("condenser_api.get_account_count", json!([])).await
    }

    pub async fn get_account_history(
        &self,
        name: &str,
        start: i64,
        limit: u32,
    ) -> Result<Vec<HistoryItem>, RpcError> {
        self.call(
            "condenser_api.get_account_history",
            json!([name, start, limit]),
        )
        .await
    }
}
