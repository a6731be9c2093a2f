//! Failure taxonomy for the valuation core.
//!
//! None of these are fatal: each is recovered where it occurs and surfaces to
//! users only as a data-absence indicator ("Loading...", "unavailable", "no
//! tokens").

use crate::models::NetworkId;

/// Why a price quote could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// The quote service could not be reached or answered with a failure.
    #[error("quote service unavailable for {price_key}: {reason}")]
    NetworkUnavailable { price_key: String, reason: String },

    /// The quote service answered, but carried no usable USD price for the key.
    #[error("no USD price for {price_key}")]
    PriceUnavailable { price_key: String },
}

/// Failures of a read-only JSON-RPC call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("no RPC endpoint configured for network {0}")]
    UnknownNetwork(NetworkId),

    #[error("RPC transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed RPC response: {0}")]
    Malformed(String),
}

/// Conditions the valuation engine recovers from without producing a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuationCondition {
    #[error("network {0} has no registered assets")]
    UnsupportedNetwork(NetworkId),

    #[error("discarded results of generation {stale}, current is {current}")]
    StaleContextDiscard { stale: u64, current: u64 },
}
