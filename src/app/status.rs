use alloy_primitives::Address;
use tracing::warn;

use crate::balance::BalanceReader;
use crate::format::format_units;
use crate::models::{short_address, NetworkId};
use crate::registry::TokenRegistry;

use super::StatusOutput;

/// Current block and native balance of `address` on `network`.
///
/// Unreadable values are reported as absent rather than failing the panel.
pub async fn network_status(
    registry: &TokenRegistry,
    balances: &BalanceReader,
    address: Address,
    network: NetworkId,
    amount_decimals: u32,
) -> StatusOutput {
    let native = registry.native_asset_for(network);

    let block = balances.transport().block_number(network);
    let balance = async {
        match &native {
            Some(asset) => balances.read_balance(address, network, asset).await,
            None => None,
        }
    };
    let (block, balance) = futures::join!(block, balance);

    let block_number = match block {
        Ok(number) => Some(number),
        Err(err) => {
            warn!(network = %network, error = %err, "block number unavailable");
            None
        }
    };

    StatusOutput {
        address: address.to_string(),
        short_address: short_address(&address),
        network_id: network,
        network: registry.network_name(network),
        block_number,
        native_symbol: native.map(|a| a.symbol.to_string()),
        native_balance: native
            .zip(balance)
            .map(|(asset, raw)| format_units(raw, asset.decimals, amount_decimals)),
    }
}
