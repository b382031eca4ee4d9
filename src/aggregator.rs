// src/aggregator.rs
//! Fans all source fetchers out as concurrent tasks over one shared HTTP
//! client and joins on the full set. Each fetcher already converts its own
//! failures into a well-formed result; the task boundary additionally
//! isolates logic defects, so a panicking fetcher drops its entry without
//! touching its siblings.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::sources::{
    market::MarketFetcher, news::NewsFetcher, quote::QuoteFetcher, trending::TrendingFetcher,
    weather::WeatherFetcher, FetchParams, Source, SourceFetcher, SourceResult,
};

/// Map from source name to that source's fetch outcome. Callers look results
/// up by key; no ordering among sources is promised.
pub type AggregateResult = BTreeMap<String, SourceResult>;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "source_fetch_live_total",
            "Fetches served by the primary upstream."
        );
        describe_counter!(
            "source_fetch_fallback_total",
            "Fetches served by the secondary upstream."
        );
        describe_counter!(
            "source_fetch_demo_total",
            "Fetches that fell through to demo data."
        );
        describe_counter!(
            "aggregate_task_failures_total",
            "Fetcher tasks that died outside their fallback chain."
        );
        describe_counter!("aggregate_cache_hits_total", "gather_all cache hits.");
        describe_histogram!("source_fetch_ms", "Per-source resolution time in milliseconds.");
        describe_histogram!("aggregate_gather_ms", "Full gather_all time in milliseconds.");
    });
}

pub struct Aggregator {
    http: reqwest::Client,
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    cache: TtlCache<AggregateResult>,
}

impl Aggregator {
    pub fn new(config: &AppConfig) -> Self {
        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(WeatherFetcher::new(config.openweather_api_key.clone())),
            Arc::new(NewsFetcher::new(config.news_api_key.clone())),
            Arc::new(MarketFetcher::new(config.alpha_vantage_key.clone())),
            Arc::new(TrendingFetcher::new()),
            Arc::new(QuoteFetcher::new()),
        ];
        Self::from_parts(shared_client(), fetchers, config.cache_ttl())
    }

    /// Assemble from explicit parts. Used by tests to swap in fetchers with
    /// redirected upstream bases.
    pub fn from_parts(
        http: reqwest::Client,
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        cache_ttl: Duration,
    ) -> Self {
        ensure_metrics_described();
        Self {
            http,
            fetchers,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// Fetch every source concurrently and key the outcomes by each result's
    /// own source tag. Waits for all tasks; one source failing or hanging up
    /// never cancels the rest.
    pub async fn gather_all(&self, params: &FetchParams) -> AggregateResult {
        let cache_key = cache_key(params);
        if let Some(hit) = self.cache.get(&cache_key) {
            counter!("aggregate_cache_hits_total").increment(1);
            return hit;
        }

        let t0 = Instant::now();
        let mut handles = Vec::with_capacity(self.fetchers.len());
        for fetcher in &self.fetchers {
            let fetcher = Arc::clone(fetcher);
            let http = self.http.clone();
            let params = params.clone();
            handles.push(tokio::spawn(async move {
                fetcher.resolve(&http, &params).await
            }));
        }

        let mut out = AggregateResult::new();
        for handle in handles {
            match handle.await {
                // Trust the result's own tag, not fan-out order.
                Ok(result) => {
                    out.insert(result.source.as_str().to_string(), result);
                }
                Err(err) => {
                    tracing::error!(error = ?err, "fetcher task failed outside its fallback chain");
                    counter!("aggregate_task_failures_total").increment(1);
                }
            }
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("aggregate_gather_ms").record(ms);
        tracing::info!(
            sources = out.len(),
            demo = out.values().filter(|r| r.demo).count(),
            elapsed_ms = ms as u64,
            "gather complete"
        );

        self.cache.put(cache_key, out.clone());
        out
    }

    /// Resolve a single source, for widget-level refresh.
    pub async fn fetch_one(&self, source: Source, params: &FetchParams) -> SourceResult {
        // The set is fixed at construction, so the lookup cannot miss.
        let fetcher = self
            .fetchers
            .iter()
            .find(|f| f.source() == source)
            .expect("fetcher registered for every source");
        fetcher.resolve(&self.http, params).await
    }
}

fn cache_key(params: &FetchParams) -> String {
    format!(
        "{}|{}|{}",
        params.city,
        params.category,
        params.symbols.join(",")
    )
}

/// Shared connection pool for all fetchers. GitHub rejects requests without
/// a User-Agent, so it is set pool-wide.
pub fn shared_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("command-center/0.1 (+github.com/command-center)")
        .connect_timeout(Duration::from_secs(4))
        .build()
        .expect("reqwest client")
}
