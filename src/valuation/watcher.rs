//! Reactive driver: keeps a published [`HoldingsView`] in step with the
//! wallet's account context and with price refreshes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::ValuationEngine;
use crate::models::{AccountContext, HoldingsView};
use crate::price::PriceQuote;

/// Why the watcher left its idle wait.
enum Wake {
    ContextChanged,
    PriceRefreshed(String),
    /// A loading price's fetch failed; the next pass shows it as unavailable.
    PriceFailed(PriceQuote),
    /// Price updates were dropped; re-run from scratch.
    Lagged,
    Interval,
    Closed,
}

/// Price keys the published view is still waiting on.
#[derive(Default)]
struct Waiting {
    loading: HashSet<&'static str>,
    unavailable: HashSet<&'static str>,
}

impl Waiting {
    fn from_view(view: &HoldingsView) -> Self {
        let mut waiting = Self::default();
        for holding in &view.holdings {
            if holding.is_price_loading {
                waiting.loading.insert(holding.asset.price_key);
            } else if holding.price_unavailable {
                waiting.unavailable.insert(holding.asset.price_key);
            }
        }
        waiting
    }

    /// Whether `quote` changes a row of the published view.
    fn wakes_on(&self, quote: &PriceQuote) -> Option<Wake> {
        let key = quote.price_key.as_str();
        if quote.is_available() {
            (self.loading.contains(key) || self.unavailable.contains(key))
                .then(|| Wake::PriceRefreshed(quote.price_key.clone()))
        } else {
            self.loading
                .contains(key)
                .then(|| Wake::PriceFailed(quote.clone()))
        }
    }
}

impl ValuationEngine {
    /// Follow `contexts`, publishing a fresh view after every accepted pass.
    ///
    /// A pass is re-run when the context changes (the running pass is
    /// abandoned), when a price some row is still waiting on resolves, and
    /// after each refresh interval of idleness while connected. A loading
    /// price whose fetch failed is carried into the re-run as unavailable
    /// rather than fetched again. The task ends when either channel's other
    /// side is dropped.
    pub fn watch(
        self: Arc<Self>,
        mut contexts: watch::Receiver<AccountContext>,
    ) -> (watch::Receiver<HoldingsView>, JoinHandle<()>) {
        let (views, rx) = watch::channel(HoldingsView::disconnected(0));
        let mut prices = self.oracle().subscribe();

        let handle = tokio::spawn(async move {
            let mut context = *contexts.borrow_and_update();
            // Failed quotes for rows that were loading, reused until the
            // context changes or the refresh interval elapses.
            let mut settled: HashMap<String, PriceQuote> = HashMap::new();
            loop {
                let generation = self.generations.advance();
                let pass = tokio::select! {
                    view = self.evaluate_with(&context, generation, &settled) => Some(view),
                    changed = contexts.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        None
                    }
                };

                let Some(view) = pass else {
                    debug!(generation, "context changed mid-pass, restarting");
                    context = *contexts.borrow_and_update();
                    settled.clear();
                    continue;
                };

                if let Some(view) = self.accept(view) {
                    if views.send(view).is_err() {
                        return;
                    }
                }

                let waiting = Waiting::from_view(&views.borrow());

                match self
                    .idle(&mut contexts, &mut prices, &waiting, context.target().is_some())
                    .await
                {
                    Wake::ContextChanged => {
                        context = *contexts.borrow_and_update();
                        settled.clear();
                    }
                    Wake::PriceRefreshed(price_key) => {
                        settled.remove(&price_key);
                    }
                    Wake::PriceFailed(quote) => {
                        settled.insert(quote.price_key.clone(), quote);
                    }
                    // Settled failures are retried once per interval.
                    Wake::Lagged | Wake::Interval => settled.clear(),
                    Wake::Closed => return,
                }
            }
        });

        (rx, handle)
    }

    async fn idle(
        &self,
        contexts: &mut watch::Receiver<AccountContext>,
        prices: &mut broadcast::Receiver<PriceQuote>,
        waiting: &Waiting,
        connected: bool,
    ) -> Wake {
        let interval = tokio::time::sleep(self.refresh_interval());
        tokio::pin!(interval);

        loop {
            tokio::select! {
                changed = contexts.changed() => {
                    return match changed {
                        Ok(()) => Wake::ContextChanged,
                        Err(_) => Wake::Closed,
                    };
                }
                update = prices.recv() => match update {
                    Ok(quote) => {
                        if let Some(wake) = waiting.wakes_on(&quote) {
                            debug!(
                                price_key = %quote.price_key,
                                available = quote.is_available(),
                                "waited-on price resolved, re-evaluating"
                            );
                            return wake;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "missed price updates, re-evaluating");
                        return Wake::Lagged;
                    }
                    Err(broadcast::error::RecvError::Closed) => return Wake::Closed,
                },
                _ = &mut interval, if connected => return Wake::Interval,
            }
        }
    }
}
