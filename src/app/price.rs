use futures::future::join_all;

use crate::price::PriceOracle;

use super::PriceOutput;

/// Quote every key concurrently; failures come back as rows with an error.
pub async fn quote_prices(oracle: &PriceOracle, price_keys: &[String]) -> Vec<PriceOutput> {
    let quotes = join_all(price_keys.iter().map(|key| oracle.get_usd_price(key))).await;

    quotes
        .into_iter()
        .map(|quote| PriceOutput {
            usd_per_unit: quote.is_available().then_some(quote.usd_per_unit),
            fetched_at: quote.fetched_at.map(|t| t.to_rfc3339()),
            error: quote.condition.as_ref().map(ToString::to_string),
            price_key: quote.price_key,
            source: quote.source,
        })
        .collect()
}
