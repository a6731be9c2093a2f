use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::{deserialize_duration, serialize_duration};
use crate::format::DEFAULT_AMOUNT_DECIMALS;
use crate::models::NetworkId;
use crate::price::DEFAULT_QUOTE_STALENESS;
use crate::valuation::{DEFAULT_BALANCE_TIMEOUT, DEFAULT_PRICE_WAIT};

pub const CONFIG_FILE_NAME: &str = "wallet-monitor.toml";

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Public JSON-RPC endpoints for every network in the built-in registry.
const DEFAULT_RPC_URLS: &[(NetworkId, &str)] = &[
    (NetworkId::ETHEREUM, "https://ethereum-rpc.publicnode.com"),
    (NetworkId::OPTIMISM, "https://optimism-rpc.publicnode.com"),
    (NetworkId::POLYGON, "https://polygon-bor-rpc.publicnode.com"),
    (NetworkId::BASE, "https://base-rpc.publicnode.com"),
    (NetworkId::ARBITRUM, "https://arbitrum-one-rpc.publicnode.com"),
    (NetworkId::AVALANCHE, "https://avalanche-c-chain-rpc.publicnode.com"),
    (NetworkId::SEPOLIA, "https://ethereum-sepolia-rpc.publicnode.com"),
];

fn default_quote_base_url() -> String {
    COINGECKO_API_BASE.to_string()
}

/// Quotes younger than this are served from cache.
fn default_quote_staleness() -> Duration {
    DEFAULT_QUOTE_STALENESS
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_price_wait() -> Duration {
    DEFAULT_PRICE_WAIT
}

fn default_balance_timeout() -> Duration {
    DEFAULT_BALANCE_TIMEOUT
}

fn default_amount_decimals() -> u32 {
    DEFAULT_AMOUNT_DECIMALS
}

/// Quote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    /// Base URL of a CoinGecko-compatible `/simple/price` API.
    #[serde(default = "default_quote_base_url")]
    pub base_url: String,

    /// How old a cached quote can be before it is fetched again.
    #[serde(
        default = "default_quote_staleness",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub staleness: Duration,

    /// HTTP timeout for a single quote request.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_base_url(),
            staleness: default_quote_staleness(),
            timeout: default_request_timeout(),
        }
    }
}

/// Valuation pass settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// How long a pass waits for a price before showing the row as loading.
    #[serde(
        default = "default_price_wait",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub price_wait: Duration,

    /// Upper bound on a single balance read.
    #[serde(
        default = "default_balance_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub balance_timeout: Duration,

    /// Fractional digits shown for token amounts.
    #[serde(default = "default_amount_decimals")]
    pub amount_decimals: u32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            price_wait: default_price_wait(),
            balance_timeout: default_balance_timeout(),
            amount_decimals: default_amount_decimals(),
        }
    }
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Prefix for USD values.
    pub currency_symbol: Option<String>,

    /// When true, render USD values with thousands separators.
    pub currency_grouping: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: Some("$".to_string()),
            currency_grouping: true,
        }
    }
}

/// Per-network RPC settings, keyed by chain id in the file (`[networks.8453]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
}

/// Application configuration as written in the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quotes: QuotesConfig,
    pub valuation: ValuationConfig,
    pub display: DisplayConfig,
    /// Overrides and additions to the built-in RPC endpoints.
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Built-in endpoints merged with the file's `[networks]` entries.
    pub fn rpc_urls(&self) -> Result<BTreeMap<NetworkId, String>> {
        let mut urls: BTreeMap<NetworkId, String> = DEFAULT_RPC_URLS
            .iter()
            .map(|(id, url)| (*id, url.to_string()))
            .collect();

        for (key, network) in &self.networks {
            let id: NetworkId = key
                .parse()
                .with_context(|| format!("Invalid chain id in [networks]: {key:?}"))?;
            urls.insert(id, network.rpc_url.clone());
        }

        Ok(urls)
    }
}

/// Loaded configuration with network ids resolved.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// File the configuration came from, if any.
    pub source: Option<PathBuf>,
    pub quotes: QuotesConfig,
    pub valuation: ValuationConfig,
    pub display: DisplayConfig,
    pub rpc_urls: BTreeMap<NetworkId, String>,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./wallet-monitor.toml` if it exists in the current directory
/// 2. `<config dir>/wallet-monitor/wallet-monitor.toml`
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from(CONFIG_FILE_NAME);
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("wallet-monitor").join(CONFIG_FILE_NAME);
    }

    local_config
}

impl ResolvedConfig {
    pub fn from_config(config: Config, source: Option<PathBuf>) -> Result<Self> {
        let rpc_urls = config.rpc_urls()?;
        Ok(Self {
            source,
            quotes: config.quotes,
            valuation: config.valuation,
            display: config.display,
            rpc_urls,
        })
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)?;
        Self::from_config(config, Some(config_path.to_path_buf()))
    }

    /// Load from a file, or use defaults if it doesn't exist.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Self::from_config(Config::default(), None)
        }
    }
}
