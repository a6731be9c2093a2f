//! The valuation engine: registry candidates, balances and prices combined
//! into ordered, non-zero holdings.

mod engine;
mod generation;
mod watcher;

pub use engine::{ValuationEngine, DEFAULT_BALANCE_TIMEOUT, DEFAULT_PRICE_WAIT};
pub use generation::GenerationCounter;
