//! RPC client for querying an Ethereum node provider.

use std::time::Duration;

use alloy_primitives::{U256, U64};
use alloy_provider::{Provider, RootProvider};
use eyre::{Result, WrapErr};
use serde::Deserialize;
use url::Url;

use crate::ordering::{BlockFees, TxFees};

/// Creates an HTTP provider for the given RPC URL.
pub fn http_provider(url: &str) -> Result<RootProvider> {
    let url: Url = url.parse().wrap_err("Invalid RPC URL")?;
    Ok(RootProvider::new_http(url))
}

/// RPC client for fetching block fee data from a node provider.
///
/// Typed queries (chain id, block height) go through the alloy provider;
/// `eth_getBlockByNumber` with full transactions is issued as a raw JSON-RPC
/// request so only the fee-relevant fields are deserialized.
#[derive(Debug)]
pub struct AuditRpcClient {
    provider: RootProvider,
    http: reqwest::Client,
    endpoint: Url,
}

impl AuditRpcClient {
    /// Creates a new client for the given HTTP RPC endpoint.
    pub fn new(url: &str) -> Result<Self> {
        let endpoint: Url = url.parse().wrap_err("Invalid RPC URL")?;
        let provider = RootProvider::new_http(endpoint.clone());
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self { provider, http, endpoint })
    }

    /// Returns the chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        self.provider.get_chain_id().await.wrap_err("Failed to get chain id")
    }

    /// Returns the current head block number. Doubles as the connectivity
    /// check at startup.
    pub async fn latest_block_number(&self) -> Result<u64> {
        self.provider.get_block_number().await.wrap_err("Failed to get latest block number")
    }

    /// Fetches the fee view of one block, transactions included.
    pub async fn block_fees(&self, number: u64) -> Result<BlockFees> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_getBlockByNumber",
            "params": [format!("0x{number:x}"), true],
            "id": 1
        });

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to fetch block {number}"))?;

        let rpc_resp: RpcResponse = resp
            .json()
            .await
            .wrap_err_with(|| format!("Failed to parse response for block {number}"))?;

        if let Some(err) = rpc_resp.error {
            eyre::bail!("RPC error fetching block {number}: {} (code {})", err.message, err.code);
        }

        let payload = rpc_resp
            .result
            .ok_or_else(|| eyre::eyre!("Block {number} not found on this node"))?;

        Ok(payload.into_block_fees(number))
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BlockPayload>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Fee-relevant subset of an `eth_getBlockByNumber` block object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockPayload {
    base_fee_per_gas: Option<U256>,
    #[serde(default)]
    transactions: Vec<TxPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxPayload {
    /// Absent on pre-typed-transaction blocks, meaning legacy (type 0).
    #[serde(rename = "type")]
    tx_type: Option<U64>,
    gas_price: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
    max_fee_per_gas: Option<U256>,
}

impl BlockPayload {
    fn into_block_fees(self, number: u64) -> BlockFees {
        BlockFees {
            number,
            base_fee_per_gas: self.base_fee_per_gas,
            transactions: self.transactions.into_iter().map(TxPayload::into_tx_fees).collect(),
        }
    }
}

impl TxPayload {
    fn into_tx_fees(self) -> TxFees {
        TxFees {
            tx_type: self.tx_type.map_or(0, |t| t.saturating_to::<u8>()),
            gas_price: self.gas_price,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            max_fee_per_gas: self.max_fee_per_gas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_post_london_block_payload() {
        let json = r#"{
            "baseFeePerGas": "0x12a05f200",
            "transactions": [
                {
                    "type": "0x2",
                    "gasPrice": "0x1dcd65000",
                    "maxPriorityFeePerGas": "0x59682f00",
                    "maxFeePerGas": "0x1dcd65000"
                },
                {
                    "type": "0x0",
                    "gasPrice": "0x174876e800"
                }
            ]
        }"#;

        let payload: BlockPayload = serde_json::from_str(json).unwrap();
        let block = payload.into_block_fees(12_965_001);

        assert_eq!(block.number, 12_965_001);
        assert_eq!(block.base_fee_per_gas, Some(U256::from(5_000_000_000u64)));
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[0].tx_type, 2);
        assert_eq!(
            block.transactions[0].max_priority_fee_per_gas,
            Some(U256::from(1_500_000_000u64))
        );
        assert_eq!(block.transactions[1].tx_type, 0);
        assert_eq!(block.transactions[1].gas_price, Some(U256::from(100_000_000_000u64)));
    }

    #[test]
    fn missing_type_defaults_to_legacy() {
        let json = r#"{
            "transactions": [
                { "gasPrice": "0x3b9aca00" }
            ]
        }"#;

        let payload: BlockPayload = serde_json::from_str(json).unwrap();
        let block = payload.into_block_fees(1_000_000);

        assert!(block.base_fee_per_gas.is_none());
        assert!(!block.is_post_london());
        assert_eq!(block.transactions[0].tx_type, 0);
        assert_eq!(block.transactions[0].gas_price, Some(U256::from(1_000_000_000u64)));
    }

    #[test]
    fn empty_block_payload_has_no_transactions() {
        let payload: BlockPayload = serde_json::from_str(r#"{ "baseFeePerGas": "0x10" }"#).unwrap();
        let block = payload.into_block_fees(13_000_000);
        assert!(block.transactions.is_empty());
    }
}
