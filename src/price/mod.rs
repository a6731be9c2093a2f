//! USD price lookup: a quote source behind a caching, single-flight oracle.

mod coingecko;
mod oracle;
mod quote;
mod source;

pub use coingecko::CoinGeckoQuoteSource;
pub use oracle::{PriceOracle, DEFAULT_QUOTE_STALENESS};
pub use quote::PriceQuote;
pub use source::QuoteSource;
