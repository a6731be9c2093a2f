use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::DisplayConfig;
use crate::format::{format_usd, holding_value_display};
use crate::models::{short_address, AccountContext, Holding, HoldingsView, NetworkId, ViewState};
use crate::valuation::ValuationEngine;

use super::{HoldingOutput, HoldingsOutput, PriceStatus};

pub const DISCONNECTED_MESSAGE: &str = "Connect your wallet to view assets";
pub const NO_TOKENS_MESSAGE: &str = "No common tokens detected on this network";

fn price_status(holding: &Holding) -> PriceStatus {
    if holding.is_price_loading {
        PriceStatus::Loading
    } else if holding.price_unavailable {
        PriceStatus::Unavailable
    } else {
        PriceStatus::Priced
    }
}

pub fn holdings_output(
    view: &HoldingsView,
    address: Option<Address>,
    display: &DisplayConfig,
) -> HoldingsOutput {
    let symbol = display.currency_symbol.as_deref();
    let grouping = display.currency_grouping;

    let holdings = view
        .holdings
        .iter()
        .map(|h| HoldingOutput {
            symbol: h.asset.symbol.to_string(),
            name: h.asset.display_name.to_string(),
            amount: h.formatted_amount.clone(),
            usd_value: h.usd_value,
            value_display: holding_value_display(h, symbol, grouping),
            price_status: price_status(h),
            native: h.asset.is_native(),
            icon_url: h.asset.icon_url().into_owned(),
        })
        .collect();

    let message = match view.state {
        ViewState::Disconnected => Some(DISCONNECTED_MESSAGE.to_string()),
        ViewState::NoTokens => Some(NO_TOKENS_MESSAGE.to_string()),
        ViewState::Ready => None,
    };

    // Only a connected view belongs to an address.
    let address = address.filter(|_| view.state != ViewState::Disconnected);
    let total_usd = view.total_usd();

    HoldingsOutput {
        address: address.map(|a| a.to_string()),
        short_address: address.as_ref().map(short_address),
        network_id: view.network_id,
        network: view.network_name.clone(),
        state: view.state,
        message,
        holdings,
        total_usd,
        total_display: format_usd(total_usd, symbol, grouping),
        pending_balances: view.pending_balances,
        generation: view.generation,
    }
}

/// Human-readable rendering of [`HoldingsOutput`].
pub fn render_holdings(output: &HoldingsOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wallet Assets");

    if output.state == ViewState::Disconnected {
        let _ = writeln!(out, "{DISCONNECTED_MESSAGE}");
        return out;
    }

    if let (Some(network), Some(short)) = (&output.network, &output.short_address) {
        let _ = writeln!(out, "{network} | {short}");
    }

    let symbol_width = output
        .holdings
        .iter()
        .map(|h| h.symbol.len())
        .max()
        .unwrap_or(0);
    let amount_width = output
        .holdings
        .iter()
        .map(|h| h.amount.len())
        .max()
        .unwrap_or(0);

    for h in &output.holdings {
        let _ = writeln!(
            out,
            "  {:<symbol_width$}  {:>amount_width$}  {}",
            h.symbol, h.amount, h.value_display
        );
    }

    if let Some(message) = &output.message {
        let _ = writeln!(out, "{message}");
    }
    if output.pending_balances > 0 {
        let _ = writeln!(out, "({} balance(s) still loading)", output.pending_balances);
    }
    let _ = writeln!(out, "Total: {}", output.total_display);
    out
}

const SUPERSEDED: &str = "Evaluation was superseded by a newer account context";

/// Evaluate `address` on `network` once for printing.
///
/// Prices still loading after the pass are awaited for up to `settle_wait`;
/// the pass is then repeated so those rows show a value or "unavailable".
pub async fn holdings_snapshot(
    engine: &ValuationEngine,
    address: Address,
    network: NetworkId,
    display: &DisplayConfig,
    settle_wait: Duration,
) -> Result<HoldingsOutput> {
    let context = AccountContext::connected(address, network);
    let mut prices = engine.oracle().subscribe();
    let view = engine.compute_holdings(&context).await.context(SUPERSEDED)?;

    let mut loading: HashSet<&'static str> = view
        .holdings
        .iter()
        .filter(|h| h.is_price_loading)
        .map(|h| h.asset.price_key)
        .collect();
    if loading.is_empty() {
        return Ok(holdings_output(&view, Some(address), display));
    }

    debug!(loading = loading.len(), "waiting for prices to settle");
    let mut settled = HashMap::new();
    let waited = tokio::time::timeout(settle_wait, async {
        while !loading.is_empty() {
            match prices.recv().await {
                Ok(quote) => {
                    if loading.remove(quote.price_key.as_str()) && !quote.is_available() {
                        settled.insert(quote.price_key.clone(), quote);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => break,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
    .await;
    if waited.is_err() {
        warn!(
            wait = ?settle_wait,
            "prices still loading, printing what is available"
        );
    }

    let view = engine
        .compute_holdings_with(&context, &settled)
        .await
        .context(SUPERSEDED)?;
    Ok(holdings_output(&view, Some(address), display))
}
