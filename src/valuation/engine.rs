use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use futures::future::join_all;
use tracing::{debug, info};

use super::GenerationCounter;
use crate::balance::{BalanceReader, JsonRpcTransport};
use crate::config::ResolvedConfig;
use crate::error::ValuationCondition;
use crate::format::{amount_value, format_units, DEFAULT_AMOUNT_DECIMALS};
use crate::models::{AccountContext, AssetDescriptor, Holding, HoldingsView, NetworkId, ViewState};
use crate::price::{CoinGeckoQuoteSource, PriceOracle, PriceQuote};
use crate::registry::TokenRegistry;

pub const DEFAULT_PRICE_WAIT: Duration = Duration::from_secs(3);
pub const DEFAULT_BALANCE_TIMEOUT: Duration = Duration::from_secs(15);

/// What one candidate asset contributed to a pass.
enum AssetOutcome {
    Row(Holding),
    /// Zero or unreadable balance.
    Skipped,
    /// The balance read outlived the balance timeout.
    Pending,
}

/// Turns an account context into an ordered list of valued holdings.
pub struct ValuationEngine {
    registry: TokenRegistry,
    balances: BalanceReader,
    oracle: Arc<PriceOracle>,
    price_wait: Duration,
    balance_timeout: Duration,
    amount_decimals: u32,
    refresh_interval: Duration,
    pub(super) generations: GenerationCounter,
}

impl ValuationEngine {
    pub fn new(registry: TokenRegistry, balances: BalanceReader, oracle: Arc<PriceOracle>) -> Self {
        let refresh_interval = oracle.staleness();
        Self {
            registry,
            balances,
            oracle,
            price_wait: DEFAULT_PRICE_WAIT,
            balance_timeout: DEFAULT_BALANCE_TIMEOUT,
            amount_decimals: DEFAULT_AMOUNT_DECIMALS,
            refresh_interval,
            generations: GenerationCounter::new(),
        }
    }

    /// Wire the production quote source and RPC transport from config.
    pub fn from_config(config: &ResolvedConfig) -> anyhow::Result<Self> {
        let source = CoinGeckoQuoteSource::from_config(&config.quotes)?;
        let oracle = PriceOracle::new(Arc::new(source)).with_staleness(config.quotes.staleness);
        let transport = JsonRpcTransport::from_config(config)?;

        Ok(Self::new(
            TokenRegistry::builtin(),
            BalanceReader::new(Arc::new(transport)),
            Arc::new(oracle),
        )
        .with_price_wait(config.valuation.price_wait)
        .with_balance_timeout(config.valuation.balance_timeout)
        .with_amount_decimals(config.valuation.amount_decimals))
    }

    /// How long a pass waits on a price before showing it as loading.
    pub fn with_price_wait(mut self, price_wait: Duration) -> Self {
        self.price_wait = price_wait;
        self
    }

    pub fn with_balance_timeout(mut self, balance_timeout: Duration) -> Self {
        self.balance_timeout = balance_timeout;
        self
    }

    pub fn with_amount_decimals(mut self, amount_decimals: u32) -> Self {
        self.amount_decimals = amount_decimals;
        self
    }

    /// Idle period after which a watched view is re-evaluated anyway.
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn oracle(&self) -> &Arc<PriceOracle> {
        &self.oracle
    }

    pub fn balances(&self) -> &BalanceReader {
        &self.balances
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn generation(&self) -> u64 {
        self.generations.current()
    }

    /// Evaluate `context` as the newest context.
    ///
    /// Returns `None` when another evaluation started before this one
    /// finished; its results belong to a context that is no longer current.
    pub async fn compute_holdings(&self, context: &AccountContext) -> Option<HoldingsView> {
        self.compute_holdings_with(context, &HashMap::new()).await
    }

    /// Like [`compute_holdings`](Self::compute_holdings), but price keys in
    /// `settled` whose fetch already failed reuse that outcome instead of
    /// starting another fetch.
    pub async fn compute_holdings_with(
        &self,
        context: &AccountContext,
        settled: &HashMap<String, PriceQuote>,
    ) -> Option<HoldingsView> {
        let generation = self.generations.advance();
        let view = self.evaluate_with(context, generation, settled).await;
        self.accept(view)
    }

    /// Pass `view` through if its generation is still current.
    pub(super) fn accept(&self, view: HoldingsView) -> Option<HoldingsView> {
        if !self.generations.is_current(view.generation) {
            let condition = ValuationCondition::StaleContextDiscard {
                stale: view.generation,
                current: self.generations.current(),
            };
            debug!(%condition, "dropping superseded holdings");
            return None;
        }
        Some(view)
    }

    /// One valuation pass for `context`, tagged with `generation`.
    pub async fn evaluate(&self, context: &AccountContext, generation: u64) -> HoldingsView {
        self.evaluate_with(context, generation, &HashMap::new()).await
    }

    pub(super) async fn evaluate_with(
        &self,
        context: &AccountContext,
        generation: u64,
        settled: &HashMap<String, PriceQuote>,
    ) -> HoldingsView {
        let Some((account, network)) = context.target() else {
            return HoldingsView::disconnected(generation);
        };

        if !self.registry.is_supported(network) {
            let condition = ValuationCondition::UnsupportedNetwork(network);
            debug!(%condition, "nothing to value");
        }

        let candidates = self.registry.candidates(network);
        let outcomes = join_all(
            candidates
                .iter()
                .map(|asset| self.value_asset(account, network, asset, settled)),
        )
        .await;

        let mut holdings = Vec::new();
        let mut pending_balances = 0;
        for outcome in outcomes {
            match outcome {
                AssetOutcome::Row(holding) => holdings.push(holding),
                AssetOutcome::Skipped => {}
                AssetOutcome::Pending => pending_balances += 1,
            }
        }

        let state = if self.registry.lookup(network).is_empty() {
            ViewState::NoTokens
        } else {
            ViewState::Ready
        };

        info!(
            generation,
            network = %network,
            candidates = candidates.len(),
            holdings = holdings.len(),
            pending_balances,
            "valuation pass complete"
        );

        HoldingsView {
            generation,
            network_id: Some(network),
            network_name: Some(self.registry.network_name(network)),
            state,
            holdings,
            pending_balances,
        }
    }

    async fn value_asset(
        &self,
        account: Address,
        network: NetworkId,
        asset: &AssetDescriptor,
        settled: &HashMap<String, PriceQuote>,
    ) -> AssetOutcome {
        let key = asset.price_key;
        let price = async {
            match settled.get(key) {
                Some(quote) if !quote.is_available() && !self.oracle.is_fresh(key) => {
                    Some(quote.clone())
                }
                _ => tokio::time::timeout(self.price_wait, self.oracle.get_usd_price(key))
                    .await
                    .ok(),
            }
        };
        let (balance, quote) = futures::join!(
            tokio::time::timeout(
                self.balance_timeout,
                self.balances.read_balance(account, network, asset),
            ),
            price,
        );

        let balance = match balance {
            Ok(Some(balance)) if balance != U256::ZERO => balance,
            Ok(_) => return AssetOutcome::Skipped,
            Err(_) => {
                debug!(network = %network, symbol = asset.symbol, "balance read still pending");
                return AssetOutcome::Pending;
            }
        };

        AssetOutcome::Row(self.holding(asset, balance, quote))
    }

    /// Build a row; `quote` is `None` while the price is still loading.
    fn holding(&self, asset: &AssetDescriptor, balance: U256, quote: Option<PriceQuote>) -> Holding {
        let formatted_amount = format_units(balance, asset.decimals, self.amount_decimals);
        let (usd_value, is_price_loading, price_unavailable) = match quote {
            None => (0.0, true, false),
            Some(quote) if quote.is_available() => {
                (amount_value(&formatted_amount) * quote.usd_per_unit, false, false)
            }
            Some(_) => (0.0, false, true),
        };

        Holding {
            asset: *asset,
            formatted_amount,
            usd_value,
            is_price_loading,
            price_unavailable,
        }
    }
}
