//! CoinGecko quote source.
//!
//! Uses the free `/simple/price` endpoint; no API key is needed, though rate
//! limits apply.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use super::QuoteSource;
use crate::config::{QuotesConfig, COINGECKO_API_BASE};

const USER_AGENT: &str = concat!("wallet-monitor/", env!("CARGO_PKG_VERSION"));

pub struct CoinGeckoQuoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoQuoteSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: COINGECKO_API_BASE.to_string(),
        }
    }

    /// Creates a source with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: COINGECKO_API_BASE.to_string(),
        }
    }

    /// Points the source at another CoinGecko-compatible API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &QuotesConfig) -> Result<Self> {
        let client = client_with_timeout(config.timeout)?;
        Ok(Self::with_client(client).with_base_url(&config.base_url))
    }
}

fn client_with_timeout(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build quote HTTP client")
}

impl Default for CoinGeckoQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract `body[price_key].usd` as a finite, non-negative number.
fn usd_price_from_body(body: &Value, price_key: &str) -> Option<f64> {
    body.get(price_key)?
        .get("usd")?
        .as_f64()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

#[async_trait::async_trait]
impl QuoteSource for CoinGeckoQuoteSource {
    async fn fetch_usd_price(&self, price_key: &str) -> Result<Option<f64>> {
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", price_key), ("vs_currencies", "usd")])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "CoinGecko simple/price API error: {} - {}",
                status,
                body
            ));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("CoinGecko returned a non-JSON body for {price_key}"))?;
        if !body.is_object() {
            return Err(anyhow!("CoinGecko returned a non-object body for {price_key}"));
        }

        Ok(usd_price_from_body(&body, price_key))
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
