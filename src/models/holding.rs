use serde::Serialize;

use super::{AssetDescriptor, NetworkId};

/// One rendered row: a non-zero balance of a registered asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub asset: AssetDescriptor,
    /// Balance scaled by the asset's decimals, truncated to display precision.
    pub formatted_amount: String,
    /// `formatted_amount * usd_per_unit`; 0 while loading or unavailable.
    pub usd_value: f64,
    /// The first price fetch for this asset has not resolved yet.
    pub is_price_loading: bool,
    /// The price fetch resolved without a usable price.
    pub price_unavailable: bool,
}

/// What the presentation layer should show for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// "Connect your wallet to view assets"
    Disconnected,
    /// "No common tokens detected on this network"
    NoTokens,
    Ready,
}

/// The result of one valuation pass, tagged with the context generation it
/// was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingsView {
    pub generation: u64,
    pub network_id: Option<NetworkId>,
    pub network_name: Option<String>,
    pub state: ViewState,
    pub holdings: Vec<Holding>,
    /// Candidate assets whose balance read did not finish in time.
    pub pending_balances: usize,
}

impl HoldingsView {
    pub fn disconnected(generation: u64) -> Self {
        Self {
            generation,
            network_id: None,
            network_name: None,
            state: ViewState::Disconnected,
            holdings: Vec::new(),
            pending_balances: 0,
        }
    }

    pub fn total_usd(&self) -> f64 {
        self.holdings.iter().map(|h| h.usd_value).sum()
    }

    pub fn any_price_loading(&self) -> bool {
        self.holdings.iter().any(|h| h.is_price_loading)
    }
}
