use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::NetworkId;

/// The wallet's current state as reported by the connectivity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    pub address: Option<Address>,
    pub network_id: Option<NetworkId>,
    pub is_connected: bool,
}

impl AccountContext {
    pub fn connected(address: Address, network_id: NetworkId) -> Self {
        Self {
            address: Some(address),
            network_id: Some(network_id),
            is_connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The account and network to evaluate, if the wallet is usable.
    pub fn target(&self) -> Option<(Address, NetworkId)> {
        if !self.is_connected {
            return None;
        }
        Some((self.address?, self.network_id?))
    }
}

/// Abbreviate an address as `0x1234...abcd` for display.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn target_requires_connection_address_and_network() {
        let addr = address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        assert_eq!(
            AccountContext::connected(addr, NetworkId::BASE).target(),
            Some((addr, NetworkId::BASE))
        );

        assert_eq!(AccountContext::disconnected().target(), None);

        let no_network = AccountContext {
            address: Some(addr),
            network_id: None,
            is_connected: true,
        };
        assert_eq!(no_network.target(), None);

        let stale_flag = AccountContext {
            is_connected: false,
            ..AccountContext::connected(addr, NetworkId::BASE)
        };
        assert_eq!(stale_flag.target(), None);
    }

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let addr = address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        assert_eq!(short_address(&addr), "0xd8dA...6045");
    }
}
