use crate::config::ResolvedConfig;
use crate::registry::TokenRegistry;

use super::{AssetOutput, NetworkOutput};

pub fn list_networks(registry: &TokenRegistry, config: &ResolvedConfig) -> Vec<NetworkOutput> {
    registry
        .networks()
        .iter()
        .map(|network| NetworkOutput {
            id: network.id,
            name: network.name.to_string(),
            native: AssetOutput::from(&network.native),
            tokens: network.tokens.iter().map(AssetOutput::from).collect(),
            rpc_url: config.rpc_urls.get(&network.id).cloned(),
        })
        .collect()
}
