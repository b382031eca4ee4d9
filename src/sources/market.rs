// src/sources/market.rs
//! Market prices fetcher. Primary is CoinGecko's key-less multi-asset
//! endpoint over a fixed crypto basket. Secondary is Alpha Vantage stock
//! quotes when `ALPHA_VANTAGE_KEY` is set: at most 3 sequential per-symbol
//! requests (the free tier rate limit is tight), and a failing symbol is
//! dropped rather than failing the whole fetch.
//!
//! The two paths carry different symbol universes (crypto ids vs tickers)
//! and are never mixed; only the normalized quote shape is shared.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sources::{FetchParams, MarketQuote, Source, SourceFetcher, SourcePayload};

const COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3/simple/price";
const ALPHA_VANTAGE_BASE: &str = "https://www.alphavantage.co/query";
const PRIMARY_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SYMBOLS: usize = 3;

// (CoinGecko id, display symbol) for the primary basket.
const CRYPTO_BASKET: [(&str, &str); 3] = [
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("solana", "SOL"),
];

pub struct MarketFetcher {
    api_key: Option<String>,
    primary_base: String,
    secondary_base: String,
}

impl MarketFetcher {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            primary_base: COINGECKO_BASE.to_string(),
            secondary_base: ALPHA_VANTAGE_BASE.to_string(),
        }
    }

    pub fn with_bases(mut self, primary: &str, secondary: &str) -> Self {
        self.primary_base = primary.to_string();
        self.secondary_base = secondary.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct CoinGeckoEntry {
    #[serde(default)]
    usd: f64,
    #[serde(default)]
    usd_24h_change: f64,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price", default)]
    price: String,
    #[serde(rename = "09. change", default)]
    change: String,
    #[serde(rename = "10. change percent", default)]
    change_percent: String,
}

fn parse_float(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}

/// "1.3200%" → 1.32. Malformed input defaults to 0.
fn parse_percent(s: &str) -> f64 {
    parse_float(s.trim().trim_end_matches('%'))
}

/// Map one Alpha Vantage response body to a quote. `None` when the payload
/// has no usable quote object (rate-limit notes arrive as 200s with an
/// empty "Global Quote"), so the caller can drop just that symbol.
fn quote_from_global(symbol: &str, body: GlobalQuoteResponse) -> Option<MarketQuote> {
    let q = body.quote?;
    let price = parse_float(&q.price);
    if price == 0.0 {
        return None;
    }
    Some(MarketQuote {
        symbol: symbol.to_string(),
        price,
        change_abs: parse_float(&q.change),
        change_pct: parse_percent(&q.change_percent),
    })
}

#[async_trait::async_trait]
impl SourceFetcher for MarketFetcher {
    fn source(&self) -> Source {
        Source::Market
    }

    async fn primary(
        &self,
        http: &reqwest::Client,
        _params: &FetchParams,
    ) -> Result<SourcePayload> {
        let ids: Vec<&str> = CRYPTO_BASKET.iter().map(|(id, _)| *id).collect();
        let resp = http
            .get(&self.primary_base)
            .query(&[
                ("ids", ids.join(",").as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .timeout(PRIMARY_TIMEOUT)
            .send()
            .await
            .context("coingecko request")?
            .error_for_status()
            .context("coingecko status")?;
        let body: HashMap<String, CoinGeckoEntry> =
            resp.json().await.context("coingecko payload")?;

        let mut quotes = Vec::with_capacity(CRYPTO_BASKET.len());
        for (id, symbol) in CRYPTO_BASKET {
            let Some(entry) = body.get(id) else { continue };
            if entry.usd == 0.0 {
                continue;
            }
            quotes.push(MarketQuote {
                symbol: symbol.to_string(),
                price: entry.usd,
                change_abs: entry.usd * entry.usd_24h_change / 100.0,
                change_pct: entry.usd_24h_change,
            });
        }

        anyhow::ensure!(!quotes.is_empty(), "no prices returned");
        Ok(SourcePayload::Market(quotes))
    }

    async fn secondary(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
    ) -> Option<Result<SourcePayload>> {
        let key = self.api_key.as_deref()?;
        Some(self.fetch_alpha_vantage(http, params, key).await)
    }

    fn demo(&self, _params: &FetchParams) -> SourcePayload {
        SourcePayload::Market(vec![
            MarketQuote {
                symbol: "AAPL".to_string(),
                price: 178.52,
                change_abs: 2.34,
                change_pct: 1.32,
            },
            MarketQuote {
                symbol: "GOOGL".to_string(),
                price: 141.23,
                change_abs: -0.87,
                change_pct: -0.61,
            },
            MarketQuote {
                symbol: "MSFT".to_string(),
                price: 378.91,
                change_abs: 4.56,
                change_pct: 1.22,
            },
        ])
    }
}

impl MarketFetcher {
    async fn fetch_alpha_vantage(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
        key: &str,
    ) -> Result<SourcePayload> {
        let mut quotes = Vec::with_capacity(MAX_SYMBOLS);
        // Sequential on purpose: the free tier allows 5 requests/minute.
        for symbol in params.symbols.iter().take(MAX_SYMBOLS) {
            let result: Result<GlobalQuoteResponse> = async {
                let resp = http
                    .get(&self.secondary_base)
                    .query(&[
                        ("function", "GLOBAL_QUOTE"),
                        ("symbol", symbol.as_str()),
                        ("apikey", key),
                    ])
                    .timeout(PRIMARY_TIMEOUT)
                    .send()
                    .await
                    .context("alpha vantage request")?
                    .error_for_status()
                    .context("alpha vantage status")?;
                resp.json().await.context("alpha vantage payload")
            }
            .await;

            match result {
                Ok(body) => {
                    if let Some(q) = quote_from_global(symbol, body) {
                        quotes.push(q);
                    } else {
                        tracing::warn!(symbol = symbol.as_str(), "alpha vantage returned no quote, skipping symbol");
                    }
                }
                Err(err) => {
                    tracing::warn!(symbol = symbol.as_str(), error = ?err, "alpha vantage fetch failed, skipping symbol");
                }
            }
        }

        anyhow::ensure!(!quotes.is_empty(), "no quotes returned");
        Ok(SourcePayload::Market(quotes))
    }
}
