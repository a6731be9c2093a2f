mod config;
mod holdings;
mod networks;
mod price;
mod status;
mod types;

pub use config::config_output;
pub use holdings::{
    holdings_output, holdings_snapshot, render_holdings, DISCONNECTED_MESSAGE, NO_TOKENS_MESSAGE,
};
pub use networks::list_networks;
pub use price::quote_prices;
pub use status::network_status;
pub use types::{
    AssetOutput, HoldingOutput, HoldingsOutput, NetworkOutput, PriceOutput, PriceStatus,
    StatusOutput,
};
