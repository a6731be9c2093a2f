use alloy_primitives::{Address, Bytes, U256};

use crate::error::RpcError;
use crate::models::NetworkId;

/// Read-only access to EVM networks.
///
/// Every call names the network explicitly; implementations never fall back
/// to some "current" network.
#[async_trait::async_trait]
pub trait RpcTransport: Send + Sync {
    /// `eth_getBalance(account, "latest")`.
    async fn native_balance(&self, network: NetworkId, account: Address) -> Result<U256, RpcError>;

    /// `eth_call` against `to` at the latest block, returning raw return data.
    async fn call(&self, network: NetworkId, to: Address, data: Bytes) -> Result<Bytes, RpcError>;

    /// `eth_blockNumber`.
    async fn block_number(&self, network: NetworkId) -> Result<u64, RpcError>;
}
