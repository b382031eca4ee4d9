// src/sources/mod.rs
//! Source fetchers: one module per upstream integration, plus the shared
//! result types and the resolution chain they all follow.
//!
//! Every fetcher resolves through the same ordered chain: primary upstream →
//! secondary upstream (when configured) → built-in demo payload. The demo
//! step cannot fail, so a fetcher never raises past its own boundary; every
//! exit path is a well-formed [`SourceResult`].

pub mod market;
pub mod news;
pub mod quote;
pub mod trending;
pub mod weather;

use std::fmt;
use std::time::Instant;

use anyhow::Result;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

/// The fixed set of integrated data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Weather,
    News,
    Market,
    Trending,
    Quote,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Weather,
        Source::News,
        Source::Market,
        Source::Trending,
        Source::Quote,
    ];

    /// Stable string form, used as the aggregate map key and widget name.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Weather => "weather",
            Source::News => "news",
            Source::Market => "market",
            Source::Trending => "trending",
            Source::Quote => "quote",
        }
    }

    pub fn parse(s: &str) -> Option<Source> {
        match s.to_ascii_lowercase().as_str() {
            "weather" => Some(Source::Weather),
            "news" => Some(Source::News),
            "market" => Some(Source::Market),
            "trending" => Some(Source::Trending),
            "quote" => Some(Source::Quote),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temp_f: i32,
    pub condition: String,
    pub humidity_pct: i32,
    pub feels_like_f: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub symbol: String,
    pub price: f64,
    pub change_abs: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingRepo {
    pub name: String,
    pub stars: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteOfTheDay {
    pub text: String,
    pub author: String,
}

/// Normalized per-source payload. Serialized untagged so the wire shape is
/// the plain object/array the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourcePayload {
    Weather(WeatherReport),
    News(Vec<Headline>),
    Market(Vec<MarketQuote>),
    Trending(Vec<TrendingRepo>),
    Quote(QuoteOfTheDay),
}

/// Outcome of one fetcher run. `source` always matches the fetcher that
/// produced it. Demo results keep the upstream error (when there was one)
/// alongside the synthetic payload so the UI can show why it degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SourcePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub demo: bool,
}

impl SourceResult {
    pub fn live(source: Source, payload: SourcePayload) -> Self {
        Self {
            source,
            data: Some(payload),
            error: None,
            demo: false,
        }
    }

    pub fn demo(source: Source, payload: SourcePayload, error: Option<String>) -> Self {
        Self {
            source,
            data: Some(payload),
            error,
            demo: true,
        }
    }
}

/// Request parameters shared by all fetchers. Each fetcher reads only the
/// fields it cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    pub city: String,
    pub category: String,
    pub symbols: Vec<String>,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            city: "New York".to_string(),
            category: "technology".to_string(),
            symbols: vec!["AAPL".into(), "GOOGL".into(), "MSFT".into()],
        }
    }
}

/// One upstream integration with its fallback chain.
///
/// `resolve` folds the chain: the first successful step wins, and the demo
/// step always succeeds. Implementations only describe the steps; the fold
/// itself (and its telemetry) lives here so no fetcher can accidentally let
/// an upstream error escape.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    fn source(&self) -> Source;

    /// First resolution attempt, usually a free, key-less upstream.
    async fn primary(&self, http: &reqwest::Client, params: &FetchParams)
        -> Result<SourcePayload>;

    /// Optional second attempt (typically a keyed API). `None` when the
    /// fetcher has no secondary or its credential is not configured.
    async fn secondary(
        &self,
        _http: &reqwest::Client,
        _params: &FetchParams,
    ) -> Option<Result<SourcePayload>> {
        None
    }

    /// Fixed fallback payload. Infallible, so the chain is total.
    fn demo(&self, params: &FetchParams) -> SourcePayload;

    async fn resolve(&self, http: &reqwest::Client, params: &FetchParams) -> SourceResult {
        let source = self.source();
        let t0 = Instant::now();

        let result = match self.primary(http, params).await {
            Ok(payload) => {
                counter!("source_fetch_live_total", "source" => source.as_str()).increment(1);
                SourceResult::live(source, payload)
            }
            Err(primary_err) => {
                tracing::warn!(source = source.as_str(), error = ?primary_err, "primary upstream failed");
                match self.secondary(http, params).await {
                    Some(Ok(payload)) => {
                        counter!("source_fetch_fallback_total", "source" => source.as_str())
                            .increment(1);
                        SourceResult::live(source, payload)
                    }
                    Some(Err(secondary_err)) => {
                        tracing::warn!(source = source.as_str(), error = ?secondary_err, "secondary upstream failed");
                        counter!("source_fetch_demo_total", "source" => source.as_str())
                            .increment(1);
                        SourceResult::demo(
                            source,
                            self.demo(params),
                            Some(format!("{secondary_err:#}")),
                        )
                    }
                    None => {
                        counter!("source_fetch_demo_total", "source" => source.as_str())
                            .increment(1);
                        SourceResult::demo(source, self.demo(params), Some(format!("{primary_err:#}")))
                    }
                }
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms", "source" => source.as_str()).record(ms);
        result
    }
}

/// Normalize free-form upstream text: decode HTML entities, strip tags,
/// collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Title-case a condition string: "scattered clouds" → "Scattered Clouds".
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cap a string at `max` characters (not bytes, so multi-byte text is safe).
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
