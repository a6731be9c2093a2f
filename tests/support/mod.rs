#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use tokio::sync::Semaphore;
use wallet_monitor::balance::{BalanceReader, RpcTransport};
use wallet_monitor::error::RpcError;
use wallet_monitor::models::NetworkId;
use wallet_monitor::price::{PriceOracle, QuoteSource};
use wallet_monitor::registry::TokenRegistry;
use wallet_monitor::valuation::ValuationEngine;

pub const HOLDER: Address = address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

/// Balance key: `None` contract means the native coin.
type BalanceKey = (NetworkId, Option<Address>);

/// In-memory RPC transport with per-network balances, failures and delays.
#[derive(Default)]
pub struct MockTransport {
    balances: Mutex<HashMap<BalanceKey, U256>>,
    failing: Mutex<Vec<BalanceKey>>,
    delays: Mutex<HashMap<NetworkId, Duration>>,
    pub calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native(self, network: NetworkId, raw: u128) -> Self {
        self.set_balance(network, None, U256::from(raw));
        self
    }

    pub fn with_token(self, network: NetworkId, contract: Address, raw: u128) -> Self {
        self.set_balance(network, Some(contract), U256::from(raw));
        self
    }

    pub fn with_failure(self, network: NetworkId, contract: Option<Address>) -> Self {
        self.failing.lock().unwrap().push((network, contract));
        self
    }

    /// Delay every read on `network`.
    pub fn with_delay(self, network: NetworkId, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(network, delay);
        self
    }

    pub fn set_balance(&self, network: NetworkId, contract: Option<Address>, raw: U256) {
        self.balances.lock().unwrap().insert((network, contract), raw);
    }

    async fn lookup(&self, network: NetworkId, contract: Option<Address>) -> Result<U256, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(&network).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&(network, contract)) {
            return Err(RpcError::Rpc {
                code: -32000,
                message: "header not found".to_string(),
            });
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(network, contract))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn native_balance(&self, network: NetworkId, _account: Address) -> Result<U256, RpcError> {
        self.lookup(network, None).await
    }

    async fn call(&self, network: NetworkId, to: Address, _data: Bytes) -> Result<Bytes, RpcError> {
        let balance = self.lookup(network, Some(to)).await?;
        Ok(Bytes::from(balance.abi_encode()))
    }

    async fn block_number(&self, _network: NetworkId) -> Result<u64, RpcError> {
        Ok(19_000_000)
    }
}

/// Quote source with fixed prices, call counting and an optional gate that
/// holds every fetch until permits are added.
pub struct MockQuoteSource {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
            failing: Mutex::new(Vec::new()),
            gate: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_price(self, price_key: &str, usd: f64) -> Self {
        self.prices.lock().unwrap().insert(price_key.to_string(), usd);
        self
    }

    pub fn with_failure(self, price_key: &str) -> Self {
        self.failing.lock().unwrap().push(price_key.to_string());
        self
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self, price_key: &str) -> usize {
        self.calls.lock().unwrap().get(price_key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn fetch_usd_price(&self, price_key: &str) -> anyhow::Result<Option<f64>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(price_key.to_string())
            .or_default() += 1;

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        if self.failing.lock().unwrap().iter().any(|k| k == price_key) {
            anyhow::bail!("quote service returned 503");
        }
        Ok(self.prices.lock().unwrap().get(price_key).copied())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn engine(transport: Arc<MockTransport>, quotes: Arc<MockQuoteSource>) -> ValuationEngine {
    ValuationEngine::new(
        TokenRegistry::builtin(),
        BalanceReader::new(transport),
        Arc::new(PriceOracle::new(quotes)),
    )
}
