use std::borrow::Cow;

use alloy_primitives::Address;
use serde::Serialize;

/// Metadata for a fungible asset the dashboard knows how to display.
///
/// Descriptors are compiled-in registry data, so every string is `'static`
/// and the whole value is `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AssetDescriptor {
    /// Token contract, or `None` for the network's native coin.
    pub contract_address: Option<Address>,
    pub symbol: &'static str,
    pub display_name: &'static str,
    /// On-chain precision. Must match the contract or amounts are off by
    /// orders of magnitude.
    pub decimals: u8,
    /// Quote service id (e.g. CoinGecko's "usd-coin").
    pub price_key: &'static str,
    /// Logo URL; `None` falls back to the Trust Wallet asset repository.
    pub icon_ref: Option<&'static str>,
}

impl AssetDescriptor {
    pub const fn native(
        symbol: &'static str,
        display_name: &'static str,
        price_key: &'static str,
        icon_ref: Option<&'static str>,
    ) -> Self {
        Self {
            contract_address: None,
            symbol,
            display_name,
            decimals: 18,
            price_key,
            icon_ref,
        }
    }

    pub const fn token(
        contract_address: Address,
        symbol: &'static str,
        display_name: &'static str,
        decimals: u8,
        price_key: &'static str,
        icon_ref: Option<&'static str>,
    ) -> Self {
        Self {
            contract_address: Some(contract_address),
            symbol,
            display_name,
            decimals,
            price_key,
            icon_ref,
        }
    }

    pub fn is_native(&self) -> bool {
        self.contract_address.is_none()
    }

    pub fn icon_url(&self) -> Cow<'static, str> {
        match (self.icon_ref, self.contract_address) {
            (Some(url), _) => Cow::Borrowed(url),
            (None, Some(address)) => Cow::Owned(format!(
                "https://raw.githubusercontent.com/trustwallet/assets/master/blockchains/ethereum/assets/{address}/logo.png"
            )),
            (None, None) => Cow::Borrowed(""),
        }
    }
}
