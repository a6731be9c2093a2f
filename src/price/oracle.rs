use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{PriceQuote, QuoteSource};
use crate::clock::{Clock, SystemClock};
use crate::error::PriceError;
use crate::single_flight::SingleFlight;

/// Default staleness window for cached quotes.
pub const DEFAULT_QUOTE_STALENESS: Duration = Duration::from_secs(60);

const UPDATE_CHANNEL_CAPACITY: usize = 64;

type QuoteCache = Arc<Mutex<HashMap<String, PriceQuote>>>;

fn cached(cache: &QuoteCache, price_key: &str) -> Option<PriceQuote> {
    let cache = cache.lock().unwrap_or_else(|e| e.into_inner());
    cache.get(price_key).cloned()
}

fn is_fresh(quote: &PriceQuote, clock: &dyn Clock, staleness: Duration) -> bool {
    let Some(fetched_at) = quote.fetched_at else {
        return false;
    };
    let age = (clock.now() - fetched_at)
        .to_std()
        .unwrap_or(Duration::ZERO);
    age < staleness
}

/// Everything a refresh task needs, detached from the oracle's lifetime.
struct Refresh {
    source: Arc<dyn QuoteSource>,
    cache: QuoteCache,
    clock: Arc<dyn Clock>,
    staleness: Duration,
    updates: broadcast::Sender<PriceQuote>,
}

impl Refresh {
    /// Fetch from the source and announce the outcome. Only successful
    /// quotes are cached.
    async fn run(self, price_key: String) -> PriceQuote {
        // A flight that finished just before this one started may already
        // have stored a fresh quote.
        if let Some(quote) = cached(&self.cache, &price_key)
            .filter(|q| is_fresh(q, self.clock.as_ref(), self.staleness))
        {
            return quote;
        }

        let source = self.source.name().to_string();
        let quote = match self.source.fetch_usd_price(&price_key).await {
            Ok(Some(usd_per_unit)) => {
                let quote =
                    PriceQuote::available(&price_key, usd_per_unit, self.clock.now(), &source);
                {
                    let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                    cache.insert(price_key.clone(), quote.clone());
                }
                info!(
                    price_key = %price_key,
                    usd_per_unit,
                    source = %source,
                    "quote fetched and cached"
                );
                quote
            }
            Ok(None) => {
                warn!(price_key = %price_key, source = %source, "quote service has no USD price");
                PriceQuote::unavailable(
                    &price_key,
                    &source,
                    PriceError::PriceUnavailable {
                        price_key: price_key.clone(),
                    },
                )
            }
            Err(err) => {
                warn!(
                    price_key = %price_key,
                    source = %source,
                    error = %err,
                    "quote fetch failed"
                );
                PriceQuote::unavailable(
                    &price_key,
                    &source,
                    PriceError::NetworkUnavailable {
                        price_key: price_key.clone(),
                        reason: format!("{err:#}"),
                    },
                )
            }
        };

        // No subscribers is fine.
        let _ = self.updates.send(quote.clone());
        quote
    }
}

/// Cached, de-duplicated access to USD prices.
///
/// Reads inside the staleness window are served from cache. Otherwise one
/// request per price key is in flight at a time and concurrent readers share
/// its result. Failures never propagate: they come back as a zero-priced
/// quote carrying a [`PriceError`] and are not cached.
pub struct PriceOracle {
    source: Arc<dyn QuoteSource>,
    cache: QuoteCache,
    staleness: Duration,
    clock: Arc<dyn Clock>,
    updates: broadcast::Sender<PriceQuote>,
    flights: SingleFlight<String, PriceQuote>,
}

impl PriceOracle {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            source,
            cache: Arc::new(Mutex::new(HashMap::new())),
            staleness: DEFAULT_QUOTE_STALENESS,
            clock: Arc::new(SystemClock),
            updates,
            flights: SingleFlight::new(),
        }
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    fn fresh(&self, price_key: &str) -> Option<PriceQuote> {
        cached(&self.cache, price_key).filter(|q| is_fresh(q, self.clock.as_ref(), self.staleness))
    }

    /// USD price for `price_key`; see the type docs for cache and failure rules.
    pub async fn get_usd_price(&self, price_key: &str) -> PriceQuote {
        if let Some(quote) = self.fresh(price_key) {
            debug!(price_key = %price_key, "returning cached quote (still fresh)");
            return quote;
        }

        let refresh = Refresh {
            source: Arc::clone(&self.source),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            staleness: self.staleness,
            updates: self.updates.clone(),
        };
        let key = price_key.to_string();
        let result = self
            .flights
            .run(key.clone(), move || refresh.run(key))
            .await;

        result.unwrap_or_else(|| {
            PriceQuote::unavailable(
                price_key,
                self.source.name(),
                PriceError::NetworkUnavailable {
                    price_key: price_key.to_string(),
                    reason: "quote task aborted".to_string(),
                },
            )
        })
    }

    /// The cached quote for `price_key`, fresh or not, without fetching.
    pub fn peek(&self, price_key: &str) -> Option<PriceQuote> {
        cached(&self.cache, price_key)
    }

    pub fn is_fresh(&self, price_key: &str) -> bool {
        self.fresh(price_key).is_some()
    }

    /// Receive the outcome of every fetch that reaches the quote source,
    /// failed ones included, even when no reader waited for it.
    pub fn subscribe(&self) -> broadcast::Receiver<PriceQuote> {
        self.updates.subscribe()
    }

    /// Price keys with a fetch currently in flight.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use anyhow::anyhow;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        price: Option<f64>,
        fail: bool,
    }

    impl CountingSource {
        fn priced(price: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                price: Some(price),
                fail: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl QuoteSource for CountingSource {
        async fn fetch_usd_price(&self, _price_key: &str) -> anyhow::Result<Option<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.price)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            chrono::Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn second_read_inside_window_is_a_cache_hit() {
        let source = Arc::new(CountingSource::priced(3120.5));
        let clock = clock();
        let oracle = PriceOracle::new(source.clone()).with_clock(clock.clone());

        let first = oracle.get_usd_price("ethereum").await;
        clock.advance(chrono::Duration::seconds(59));
        let second = oracle.get_usd_price("ethereum").await;

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_quote_is_refetched() {
        let source = Arc::new(CountingSource::priced(1.0));
        let clock = clock();
        let oracle = PriceOracle::new(source.clone()).with_clock(clock.clone());

        let first = oracle.get_usd_price("usd-coin").await;
        clock.advance(chrono::Duration::seconds(60));
        assert!(!oracle.is_fresh("usd-coin"));
        let second = oracle.get_usd_price("usd-coin").await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(second.fetched_at > first.fetched_at);
    }

    #[tokio::test]
    async fn missing_price_is_not_cached() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            price: None,
            fail: false,
        });
        let oracle = PriceOracle::new(source.clone()).with_clock(clock());

        let quote = oracle.get_usd_price("mystery").await;
        assert_eq!(quote.usd_per_unit, 0.0);
        assert!(matches!(quote.condition, Some(PriceError::PriceUnavailable { .. })));
        assert!(quote.fetched_at.is_none());
        assert!(oracle.peek("mystery").is_none());

        oracle.get_usd_price("mystery").await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_unavailable() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            price: Some(1.0),
            fail: true,
        });
        let oracle = PriceOracle::new(source).with_clock(clock());

        let quote = oracle.get_usd_price("ethereum").await;
        assert!(!quote.is_available());
        assert_eq!(quote.usd_per_unit, 0.0);
        match quote.condition {
            Some(PriceError::NetworkUnavailable { reason, .. }) => {
                assert!(reason.contains("connection refused"))
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_refresh_is_broadcast() {
        let source = Arc::new(CountingSource::priced(0.72));
        let oracle = PriceOracle::new(source).with_clock(clock());
        let mut updates = oracle.subscribe();

        oracle.get_usd_price("optimism").await;
        let announced = updates.recv().await.unwrap();
        assert_eq!(announced.price_key, "optimism");
        assert!(announced.is_available());
    }

    #[tokio::test]
    async fn failed_refresh_is_broadcast_but_not_cached() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            price: None,
            fail: true,
        });
        let oracle = PriceOracle::new(source).with_clock(clock());
        let mut updates = oracle.subscribe();

        oracle.get_usd_price("usd-coin").await;
        let announced = updates.recv().await.unwrap();
        assert_eq!(announced.price_key, "usd-coin");
        assert!(matches!(
            announced.condition,
            Some(PriceError::NetworkUnavailable { .. })
        ));
        assert!(oracle.peek("usd-coin").is_none());
    }

    #[tokio::test]
    async fn literal_zero_price_is_available() {
        let source = Arc::new(CountingSource::priced(0.0));
        let oracle = PriceOracle::new(source).with_clock(clock());

        let quote = oracle.get_usd_price("dead-coin").await;
        assert!(quote.is_available());
        assert_eq!(quote.usd_per_unit, 0.0);
        assert!(oracle.is_fresh("dead-coin"));
    }
}
