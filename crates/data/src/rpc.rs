//! JSON-RPC log provider.
//!
//! Thin client over `eth_blockNumber` and `eth_getLogs`. Provider error
//! bodies are classified into the two recoverable shapes the ingestion
//! loop understands; wire-format problems are reported as transient so a
//! flaky gateway does not kill a long sync.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::events::RawLog;
use crate::provider::{LogProvider, LogQuery, ProviderError};

/// JSON-RPC client for an Ethereum-compatible node.
#[derive(Debug, Clone)]
pub struct RpcLogProvider {
    client: reqwest::Client,
    url: String,
}

impl RpcLogProvider {
    /// Creates a provider for the given endpoint URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;
        let payload: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;
        if let Some(error) = payload.error {
            return Err(classify(&error));
        }
        payload
            .result
            .ok_or_else(|| ProviderError::Transient("empty RPC result".to_string()))
    }
}

#[async_trait]
impl LogProvider for RpcLogProvider {
    async fn latest_block(&self) -> Result<u64, ProviderError> {
        let head: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&head)
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, ProviderError> {
        let params = json!([{
            "fromBlock": format!("0x{:x}", query.from_block),
            "toBlock": format!("0x{:x}", query.to_block),
            "address": query.address,
            "topics": [query.topics],
        }]);
        let logs: Vec<WireLog> = self.call("eth_getLogs", params).await?;
        logs.into_iter().map(WireLog::into_raw).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Log entry as serialized by the node.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLog {
    block_number: String,
    transaction_index: String,
    transaction_hash: primitive_types::H256,
    topics: Vec<primitive_types::H256>,
    data: String,
}

impl WireLog {
    fn into_raw(self) -> Result<RawLog, ProviderError> {
        Ok(RawLog {
            block_number: parse_quantity(&self.block_number)?,
            transaction_index: parse_quantity(&self.transaction_index)?,
            transaction_hash: self.transaction_hash,
            topics: self.topics,
            data: parse_bytes(&self.data)?,
        })
    }
}

/// Maps a node error onto the ingestion retry policy. The oversized-window
/// wording differs per vendor, so this matches the common phrasings.
fn classify(error: &RpcErrorBody) -> ProviderError {
    let message = error.message.to_ascii_lowercase();
    if message.contains("log response size exceeded")
        || message.contains("block range")
        || message.contains("more than")
    {
        ProviderError::RangeTooLarge
    } else {
        ProviderError::Transient(format!("{} (code {})", error.message, error.code))
    }
}

fn parse_quantity(hex: &str) -> Result<u64, ProviderError> {
    let stripped = hex.strip_prefix("0x").unwrap_or(hex);
    u64::from_str_radix(stripped, 16)
        .map_err(|e| ProviderError::Transient(format!("bad hex quantity {hex:?}: {e}")))
}

fn parse_bytes(hex: &str) -> Result<Vec<u8>, ProviderError> {
    let stripped = hex.strip_prefix("0x").unwrap_or(hex);
    if stripped.len() % 2 != 0 {
        return Err(ProviderError::Transient(format!(
            "odd-length hex data {hex:?}"
        )));
    }
    (0..stripped.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&stripped[i..i + 2], 16)
                .map_err(|e| ProviderError::Transient(format!("bad hex data {hex:?}: {e}")))
        })
        .collect()
}
