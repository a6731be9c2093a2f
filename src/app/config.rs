use std::path::Path;

use crate::config::ResolvedConfig;
use crate::duration::format_duration;

pub fn config_output(config_path: &Path, config: &ResolvedConfig) -> serde_json::Value {
    let networks: serde_json::Map<String, serde_json::Value> = config
        .rpc_urls
        .iter()
        .map(|(id, url)| (id.to_string(), serde_json::json!({ "rpc_url": url })))
        .collect();

    serde_json::json!({
        "config_file": config_path.display().to_string(),
        "loaded": config.source.is_some(),
        "quotes": {
            "base_url": config.quotes.base_url,
            "staleness": format_duration(config.quotes.staleness),
            "timeout": format_duration(config.quotes.timeout)
        },
        "valuation": {
            "price_wait": format_duration(config.valuation.price_wait),
            "balance_timeout": format_duration(config.valuation.balance_timeout),
            "amount_decimals": config.valuation.amount_decimals
        },
        "display": {
            "currency_symbol": config.display.currency_symbol,
            "currency_grouping": config.display.currency_grouping
        },
        "networks": networks
    })
}
