mod account;
mod asset;
mod holding;
mod network;

pub use account::{short_address, AccountContext};
pub use asset::AssetDescriptor;
pub use holding::{Holding, HoldingsView, ViewState};
pub use network::NetworkId;
