//! Compiled-in allow-list of assets per network.
//!
//! Adding a network or token means editing the tables below; nothing here is
//! mutable at runtime.

use alloy_primitives::address;

use crate::models::{AssetDescriptor, NetworkId};

const ETH_LOGO: &str = "https://cryptologos.cc/logos/ethereum-eth-logo.png";
const USDC_LOGO: &str = "https://cryptologos.cc/logos/usd-coin-usdc-logo.png";
const USDT_LOGO: &str = "https://cryptologos.cc/logos/tether-usdt-logo.png";
const DAI_LOGO: &str = "https://cryptologos.cc/logos/multi-collateral-dai-dai-logo.png";
const LINK_LOGO: &str = "https://cryptologos.cc/logos/chainlink-link-logo.png";
const UNI_LOGO: &str = "https://cryptologos.cc/logos/uniswap-uni-logo.png";
const OP_LOGO: &str = "https://cryptologos.cc/logos/optimism-ethereum-op-logo.png";
const ARB_LOGO: &str = "https://cryptologos.cc/logos/arbitrum-arb-logo.png";
const POL_LOGO: &str = "https://cryptologos.cc/logos/polygon-matic-logo.png";
const AVAX_LOGO: &str = "https://cryptologos.cc/logos/avalanche-avax-logo.png";

const ETHER: AssetDescriptor = AssetDescriptor::native("ETH", "Ethereum", "ethereum", Some(ETH_LOGO));

/// One supported network: its display name, native coin and token allow-list.
#[derive(Debug, Clone, Copy)]
pub struct NetworkEntry {
    pub id: NetworkId,
    pub name: &'static str,
    pub native: AssetDescriptor,
    /// Display order; the native coin always precedes these.
    pub tokens: &'static [AssetDescriptor],
}

static ETHEREUM_TOKENS: &[AssetDescriptor] = &[
    AssetDescriptor::token(
        address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        "USDC",
        "USD Coin",
        6,
        "usd-coin",
        Some(USDC_LOGO),
    ),
    AssetDescriptor::token(
        address!("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
        "USDT",
        "Tether USD",
        6,
        "tether",
        Some(USDT_LOGO),
    ),
    AssetDescriptor::token(
        address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
        "DAI",
        "Dai Stablecoin",
        18,
        "dai",
        Some(DAI_LOGO),
    ),
    AssetDescriptor::token(
        address!("0x514910771AF9Ca656af840dff83E8264EcF986CA"),
        "LINK",
        "Chainlink",
        18,
        "chainlink",
        Some(LINK_LOGO),
    ),
    AssetDescriptor::token(
        address!("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
        "UNI",
        "Uniswap",
        18,
        "uniswap",
        Some(UNI_LOGO),
    ),
];

static OPTIMISM_TOKENS: &[AssetDescriptor] = &[
    AssetDescriptor::token(
        address!("0x4200000000000000000000000000000000000042"),
        "OP",
        "Optimism",
        18,
        "optimism",
        Some(OP_LOGO),
    ),
    AssetDescriptor::token(
        address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
        "USDC",
        "USD Coin",
        6,
        "usd-coin",
        Some(USDC_LOGO),
    ),
];

static POLYGON_TOKENS: &[AssetDescriptor] = &[AssetDescriptor::token(
    address!("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
    "USDC",
    "USD Coin",
    6,
    "usd-coin",
    Some(USDC_LOGO),
)];

static BASE_TOKENS: &[AssetDescriptor] = &[AssetDescriptor::token(
    address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
    "USDC",
    "USD Coin",
    6,
    "usd-coin",
    Some(USDC_LOGO),
)];

static ARBITRUM_TOKENS: &[AssetDescriptor] = &[
    AssetDescriptor::token(
        address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
        "USDC",
        "USD Coin",
        6,
        "usd-coin",
        Some(USDC_LOGO),
    ),
    AssetDescriptor::token(
        address!("0x912CE59144191C1204E64559FE8253a0e49E6548"),
        "ARB",
        "Arbitrum",
        18,
        "arbitrum",
        Some(ARB_LOGO),
    ),
];

static AVALANCHE_TOKENS: &[AssetDescriptor] = &[
    AssetDescriptor::token(
        address!("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
        "USDC",
        "USD Coin",
        6,
        "usd-coin",
        Some(USDC_LOGO),
    ),
    AssetDescriptor::token(
        address!("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
        "WAVAX",
        "Wrapped AVAX",
        18,
        "wrapped-avax",
        Some(AVAX_LOGO),
    ),
];

static BUILTIN_NETWORKS: &[NetworkEntry] = &[
    NetworkEntry {
        id: NetworkId::ETHEREUM,
        name: "Ethereum",
        native: ETHER,
        tokens: ETHEREUM_TOKENS,
    },
    NetworkEntry {
        id: NetworkId::OPTIMISM,
        name: "Optimism",
        native: ETHER,
        tokens: OPTIMISM_TOKENS,
    },
    NetworkEntry {
        id: NetworkId::POLYGON,
        name: "Polygon",
        native: AssetDescriptor::native("POL", "Polygon", "matic-network", Some(POL_LOGO)),
        tokens: POLYGON_TOKENS,
    },
    NetworkEntry {
        id: NetworkId::BASE,
        name: "Base",
        native: ETHER,
        tokens: BASE_TOKENS,
    },
    NetworkEntry {
        id: NetworkId::ARBITRUM,
        name: "Arbitrum One",
        native: ETHER,
        tokens: ARBITRUM_TOKENS,
    },
    NetworkEntry {
        id: NetworkId::AVALANCHE,
        name: "Avalanche",
        native: AssetDescriptor::native("AVAX", "Avalanche", "avalanche-2", Some(AVAX_LOGO)),
        tokens: AVALANCHE_TOKENS,
    },
    NetworkEntry {
        id: NetworkId::SEPOLIA,
        name: "Sepolia",
        native: ETHER,
        tokens: &[],
    },
];

/// Read-only lookup over a static network table.
#[derive(Debug, Clone, Copy)]
pub struct TokenRegistry {
    networks: &'static [NetworkEntry],
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TokenRegistry {
    /// The networks this build ships with.
    pub fn builtin() -> Self {
        Self {
            networks: BUILTIN_NETWORKS,
        }
    }

    /// A registry over a caller-supplied table.
    pub fn from_static(networks: &'static [NetworkEntry]) -> Self {
        Self { networks }
    }

    fn entry(&self, network_id: NetworkId) -> Option<&'static NetworkEntry> {
        self.networks.iter().find(|n| n.id == network_id)
    }

    /// Registered tokens for a network in display order. Unknown networks
    /// have none.
    pub fn lookup(&self, network_id: NetworkId) -> &'static [AssetDescriptor] {
        self.entry(network_id).map(|n| n.tokens).unwrap_or(&[])
    }

    pub fn native_asset_for(&self, network_id: NetworkId) -> Option<AssetDescriptor> {
        self.entry(network_id).map(|n| n.native)
    }

    /// Native coin first, then the registered tokens.
    pub fn candidates(&self, network_id: NetworkId) -> Vec<AssetDescriptor> {
        let tokens = self.lookup(network_id);
        let mut out = Vec::with_capacity(tokens.len() + 1);
        out.extend(self.native_asset_for(network_id));
        out.extend_from_slice(tokens);
        out
    }

    pub fn network_name(&self, network_id: NetworkId) -> String {
        match self.entry(network_id) {
            Some(entry) => entry.name.to_string(),
            None => format!("Chain {network_id}"),
        }
    }

    pub fn is_supported(&self, network_id: NetworkId) -> bool {
        self.entry(network_id).is_some()
    }

    pub fn networks(&self) -> &'static [NetworkEntry] {
        self.networks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unknown_network_has_no_assets() {
        let registry = TokenRegistry::builtin();
        let unknown = NetworkId(999_999);
        assert!(registry.lookup(unknown).is_empty());
        assert!(registry.native_asset_for(unknown).is_none());
        assert!(registry.candidates(unknown).is_empty());
        assert_eq!(registry.network_name(unknown), "Chain 999999");
    }

    #[test]
    fn mainnet_usdc_uses_six_decimals() {
        let registry = TokenRegistry::builtin();
        let usdc = registry
            .lookup(NetworkId::ETHEREUM)
            .iter()
            .find(|a| a.symbol == "USDC")
            .expect("USDC registered on mainnet");
        assert_eq!(usdc.decimals, 6);
        assert_eq!(usdc.price_key, "usd-coin");
    }

    #[test]
    fn candidates_put_native_coin_first_in_registry_order() {
        let registry = TokenRegistry::builtin();
        let symbols: Vec<_> = registry
            .candidates(NetworkId::ETHEREUM)
            .iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["ETH", "USDC", "USDT", "DAI", "LINK", "UNI"]);

        let avalanche = registry.candidates(NetworkId::AVALANCHE);
        assert_eq!(avalanche[0].symbol, "AVAX");
        assert!(avalanche[0].is_native());
    }

    #[test]
    fn lookup_is_deterministic() {
        let registry = TokenRegistry::builtin();
        assert_eq!(
            registry.lookup(NetworkId::ARBITRUM),
            registry.lookup(NetworkId::ARBITRUM)
        );
    }

    #[test]
    fn native_coins_use_18_decimals_and_tokens_have_contracts() {
        let registry = TokenRegistry::builtin();
        for network in registry.networks() {
            assert!(network.native.is_native(), "{} native", network.name);
            assert_eq!(network.native.decimals, 18, "{} native", network.name);
            for token in network.tokens {
                assert!(
                    token.contract_address.is_some(),
                    "{} on {} lacks a contract",
                    token.symbol,
                    network.name
                );
            }
        }
    }

    #[test]
    fn no_duplicate_contracts_within_a_network() {
        let registry = TokenRegistry::builtin();
        for network in registry.networks() {
            let mut seen = HashSet::new();
            for token in network.tokens {
                assert!(seen.insert(token.contract_address), "duplicate in {}", network.name);
            }
        }
    }

    #[test]
    fn custom_table_is_honoured() {
        static CUSTOM: &[NetworkEntry] = &[NetworkEntry {
            id: NetworkId(31337),
            name: "Local",
            native: ETHER,
            tokens: &[],
        }];
        let registry = TokenRegistry::from_static(CUSTOM);
        assert!(registry.is_supported(NetworkId(31337)));
        assert!(!registry.is_supported(NetworkId::ETHEREUM));
        assert_eq!(registry.network_name(NetworkId(31337)), "Local");
        assert_eq!(registry.candidates(NetworkId(31337)).len(), 1);
    }
}
