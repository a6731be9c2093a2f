use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// EVM chain id identifying a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl NetworkId {
    pub const ETHEREUM: NetworkId = NetworkId(1);
    pub const OPTIMISM: NetworkId = NetworkId(10);
    pub const POLYGON: NetworkId = NetworkId(137);
    pub const BASE: NetworkId = NetworkId(8453);
    pub const ARBITRUM: NetworkId = NetworkId(42161);
    pub const AVALANCHE: NetworkId = NetworkId(43114);
    pub const SEPOLIA: NetworkId = NetworkId(11155111);
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = std::num::ParseIntError;

    /// Accepts decimal chain ids and `0x`-prefixed hex ids as wallets report them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map(Self),
            None => s.parse().map(Self),
        }
    }
}
