use serde::Serialize;

use crate::models::{AssetDescriptor, NetworkId, ViewState};

/// JSON output for a registry asset
#[derive(Debug, Serialize)]
pub struct AssetOutput {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    pub price_key: String,
    pub icon_url: String,
}

impl From<&AssetDescriptor> for AssetOutput {
    fn from(asset: &AssetDescriptor) -> Self {
        Self {
            symbol: asset.symbol.to_string(),
            name: asset.display_name.to_string(),
            decimals: asset.decimals,
            contract_address: asset.contract_address.map(|a| a.to_string()),
            price_key: asset.price_key.to_string(),
            icon_url: asset.icon_url().into_owned(),
        }
    }
}

/// JSON output for a supported network
#[derive(Debug, Serialize)]
pub struct NetworkOutput {
    pub id: NetworkId,
    pub name: String,
    pub native: AssetOutput,
    pub tokens: Vec<AssetOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

/// JSON output for a price lookup
#[derive(Debug, Serialize)]
pub struct PriceOutput {
    pub price_key: String,
    /// `None` when no usable price was obtained.
    pub usd_per_unit: Option<f64>,
    pub fetched_at: Option<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Price display state of a holding row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
    Priced,
    Loading,
    Unavailable,
}

/// JSON output for one holding row
#[derive(Debug, Serialize)]
pub struct HoldingOutput {
    pub symbol: String,
    pub name: String,
    pub amount: String,
    pub usd_value: f64,
    /// Formatted value, "Loading..." or "unavailable".
    pub value_display: String,
    pub price_status: PriceStatus,
    pub native: bool,
    pub icon_url: String,
}

/// JSON output for a holdings evaluation
#[derive(Debug, Serialize)]
pub struct HoldingsOutput {
    pub address: Option<String>,
    pub short_address: Option<String>,
    pub network_id: Option<NetworkId>,
    pub network: Option<String>,
    pub state: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub holdings: Vec<HoldingOutput>,
    pub total_usd: f64,
    pub total_display: String,
    pub pending_balances: usize,
    pub generation: u64,
}

/// JSON output for the network status panel
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub address: String,
    pub short_address: String,
    pub network_id: NetworkId,
    pub network: String,
    pub block_number: Option<u64>,
    pub native_symbol: Option<String>,
    pub native_balance: Option<String>,
}
