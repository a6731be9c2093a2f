use anyhow::Result;

/// A remote service that knows USD prices by price key.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current USD price for `price_key`.
    ///
    /// `Ok(None)` means the service answered but had no usable price for the
    /// key. `Err` means the service could not be reached or answered with
    /// something other than a well-formed success.
    async fn fetch_usd_price(&self, price_key: &str) -> Result<Option<f64>>;

    fn name(&self) -> &str;
}
