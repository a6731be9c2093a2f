use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, warn};

use super::RpcTransport;
use crate::error::RpcError;
use crate::models::{AssetDescriptor, NetworkId};

sol! {
    function balanceOf(address owner) external view returns (uint256);
}

/// Reads raw balances for one account, native coin or ERC-20 token.
#[derive(Clone)]
pub struct BalanceReader {
    transport: Arc<dyn RpcTransport>,
}

impl BalanceReader {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    /// Raw balance of `asset` held by `account` on `network`.
    ///
    /// `None` means the balance could not be read; it is never reported as
    /// zero.
    pub async fn read_balance(
        &self,
        account: Address,
        network: NetworkId,
        asset: &AssetDescriptor,
    ) -> Option<U256> {
        match self.try_read(account, network, asset).await {
            Ok(balance) => {
                debug!(
                    network = %network,
                    symbol = asset.symbol,
                    balance = %balance,
                    "balance read"
                );
                Some(balance)
            }
            Err(err) => {
                warn!(
                    network = %network,
                    symbol = asset.symbol,
                    error = %err,
                    "balance read failed"
                );
                None
            }
        }
    }

    async fn try_read(
        &self,
        account: Address,
        network: NetworkId,
        asset: &AssetDescriptor,
    ) -> Result<U256, RpcError> {
        let Some(contract) = asset.contract_address else {
            return self.transport.native_balance(network, account).await;
        };

        let data = balanceOfCall { owner: account }.abi_encode();
        let output = self.transport.call(network, contract, data.into()).await?;
        if output.is_empty() {
            // Calls to addresses without code succeed with no return data.
            return Err(RpcError::Malformed(format!(
                "balanceOf on {contract} returned no data"
            )));
        }
        balanceOfCall::abi_decode_returns(&output)
            .map_err(|e| RpcError::Malformed(format!("balanceOf decode failed: {e}")))
    }
}
