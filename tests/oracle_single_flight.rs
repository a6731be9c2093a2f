mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use support::MockQuoteSource;
use tokio::sync::Semaphore;
use wallet_monitor::error::PriceError;
use wallet_monitor::price::PriceOracle;

#[tokio::test]
async fn concurrent_reads_share_one_fetch() -> Result<()> {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(
        MockQuoteSource::new()
            .with_price("ethereum", 3120.5)
            .with_gate(gate.clone()),
    );
    let oracle = Arc::new(PriceOracle::new(source.clone()));

    let readers: Vec<_> = (0..10)
        .map(|_| {
            let oracle = Arc::clone(&oracle);
            tokio::spawn(async move { oracle.get_usd_price("ethereum").await })
        })
        .collect();

    while source.calls("ethereum") == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(oracle.in_flight(), 1);
    gate.add_permits(1);

    for quote in join_all(readers).await {
        let quote = quote?;
        assert_eq!(quote.usd_per_unit, 3120.5);
        assert!(quote.is_available());
    }
    assert_eq!(source.calls("ethereum"), 1);
    assert_eq!(oracle.in_flight(), 0);

    Ok(())
}

#[tokio::test]
async fn failed_fetch_is_retried_on_next_read() -> Result<()> {
    let source = Arc::new(MockQuoteSource::new().with_failure("usd-coin"));
    let oracle = PriceOracle::new(source.clone());

    let first = oracle.get_usd_price("usd-coin").await;
    assert!(matches!(
        first.condition,
        Some(PriceError::NetworkUnavailable { .. })
    ));
    assert!(oracle.peek("usd-coin").is_none());

    oracle.get_usd_price("usd-coin").await;
    assert_eq!(source.calls("usd-coin"), 2);

    Ok(())
}

#[tokio::test]
async fn abandoned_read_still_fills_cache() -> Result<()> {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(
        MockQuoteSource::new()
            .with_price("optimism", 0.72)
            .with_gate(gate.clone()),
    );
    let oracle = PriceOracle::new(source.clone());
    let mut updates = oracle.subscribe();

    let waited =
        tokio::time::timeout(Duration::from_millis(20), oracle.get_usd_price("optimism")).await;
    assert!(waited.is_err(), "read should still be waiting on the gate");

    gate.add_permits(1);
    let refreshed = tokio::time::timeout(Duration::from_secs(5), updates.recv()).await??;
    assert_eq!(refreshed.price_key, "optimism");
    assert!(oracle.is_fresh("optimism"));

    let quote = oracle.get_usd_price("optimism").await;
    assert_eq!(quote.usd_per_unit, 0.72);
    assert_eq!(source.calls("optimism"), 1);

    Ok(())
}
