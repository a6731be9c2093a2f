//! JSON-RPC 2.0 over HTTP, one endpoint per network.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use anyhow::Context;
use serde_json::{json, Value};
use tracing::debug;

use super::RpcTransport;
use crate::config::ResolvedConfig;
use crate::error::RpcError;
use crate::models::NetworkId;

const USER_AGENT: &str = concat!("wallet-monitor/", env!("CARGO_PKG_VERSION"));

pub struct JsonRpcTransport {
    client: reqwest::Client,
    endpoints: BTreeMap<NetworkId, String>,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(endpoints: BTreeMap<NetworkId, String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    pub fn with_client(client: reqwest::Client, endpoints: BTreeMap<NetworkId, String>) -> Self {
        Self {
            client,
            endpoints,
            next_id: AtomicU64::new(1),
        }
    }

    /// Endpoints from config; requests time out with the balance timeout.
    pub fn from_config(config: &ResolvedConfig) -> anyhow::Result<Self> {
        let client = client_with_timeout(config.valuation.balance_timeout)?;
        Ok(Self::with_client(client, config.rpc_urls.clone()))
    }

    pub fn endpoint(&self, network: NetworkId) -> Option<&str> {
        self.endpoints.get(&network).map(String::as_str)
    }

    async fn request(&self, network: NetworkId, method: &str, params: Value) -> Result<Value, RpcError> {
        let url = self
            .endpoints
            .get(&network)
            .ok_or(RpcError::UnknownNetwork(network))?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(network = %network, method, id, "rpc request");
        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| RpcError::Malformed(format!("{method}: {e}")))?;
        result_from_body(method, body)
    }
}

fn client_with_timeout(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build RPC HTTP client")
}

fn result_from_body(method: &str, mut body: Value) -> Result<Value, RpcError> {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(RpcError::Rpc { code, message });
    }

    match body.get_mut("result").map(Value::take) {
        Some(Value::Null) | None => Err(RpcError::Malformed(format!("{method}: missing result"))),
        Some(result) => Ok(result),
    }
}

fn hex_str<'a>(method: &str, value: &'a Value) -> Result<&'a str, RpcError> {
    value
        .as_str()
        .ok_or_else(|| RpcError::Malformed(format!("{method}: result is not a string")))
}

fn parse_quantity(method: &str, value: &Value) -> Result<U256, RpcError> {
    let hex = hex_str(method, value)?;
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::Malformed(format!("{method}: {hex:?} is not 0x-prefixed")))?;
    if digits.is_empty() {
        return Err(RpcError::Malformed(format!("{method}: empty quantity")));
    }
    U256::from_str_radix(digits, 16).map_err(|e| RpcError::Malformed(format!("{method}: {e}")))
}

#[async_trait::async_trait]
impl RpcTransport for JsonRpcTransport {
    async fn native_balance(&self, network: NetworkId, account: Address) -> Result<U256, RpcError> {
        let result = self
            .request(network, "eth_getBalance", json!([account, "latest"]))
            .await?;
        parse_quantity("eth_getBalance", &result)
    }

    async fn call(&self, network: NetworkId, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let result = self
            .request(network, "eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        let hex = hex_str("eth_call", &result)?;
        Bytes::from_str(hex).map_err(|e| RpcError::Malformed(format!("eth_call: {e}")))
    }

    async fn block_number(&self, network: NetworkId) -> Result<u64, RpcError> {
        let result = self.request(network, "eth_blockNumber", json!([])).await?;
        let quantity = parse_quantity("eth_blockNumber", &result)?;
        u64::try_from(quantity)
            .map_err(|_| RpcError::Malformed(format!("eth_blockNumber: {quantity} overflows u64")))
    }
}
