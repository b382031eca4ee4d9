// src/briefing/mod.rs
//! Briefing synthesis over an aggregate result. When an OpenAI key is
//! configured the context goes to the chat-completions API; on any failure
//! there, or with no key at all, the deterministic template renders the same
//! per-source summaries instead. `generate` never errors.

pub mod ai;
pub mod template;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::aggregator::AggregateResult;
use crate::config::AppConfig;
use crate::sources::{
    Headline, MarketQuote, QuoteOfTheDay, Source, SourcePayload, WeatherReport,
};
use ai::OpenAiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub text: String,
    pub generated_at: DateTime<Utc>,
    pub ai_powered: bool,
    pub demo_mode: bool,
}

pub struct BriefingGenerator {
    ai: Option<OpenAiClient>,
}

impl BriefingGenerator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            ai: config
                .openai_api_key
                .clone()
                .map(|key| OpenAiClient::new(key, None)),
        }
    }

    /// Template-only generator (tests, or explicitly AI-less deployments).
    pub fn without_ai() -> Self {
        Self { ai: None }
    }

    pub async fn generate(&self, data: &AggregateResult) -> Briefing {
        if let Some(ai) = &self.ai {
            let context = build_context(data);
            if let Some(text) = ai.complete(&context).await {
                counter!("briefing_ai_total").increment(1);
                return Briefing {
                    text,
                    generated_at: Utc::now(),
                    ai_powered: true,
                    demo_mode: false,
                };
            }
            tracing::warn!("generative service unavailable, rendering template briefing");
        }

        counter!("briefing_template_total").increment(1);
        Briefing {
            text: template::render(data),
            generated_at: Utc::now(),
            ai_powered: false,
            demo_mode: true,
        }
    }
}

// ---- Typed accessors over the aggregate map ----
// Sources that carry only an error (or are absent) come back as None, so
// neither the context nor the template ever renders garbage for them.

pub(crate) fn weather_of(data: &AggregateResult) -> Option<&WeatherReport> {
    match data.get(Source::Weather.as_str()) {
        Some(r) => match &r.data {
            Some(SourcePayload::Weather(w)) => Some(w),
            _ => None,
        },
        None => None,
    }
}

pub(crate) fn news_of(data: &AggregateResult) -> Option<&[Headline]> {
    match data.get(Source::News.as_str()) {
        Some(r) => match &r.data {
            Some(SourcePayload::News(items)) if !items.is_empty() => Some(items),
            _ => None,
        },
        None => None,
    }
}

pub(crate) fn market_of(data: &AggregateResult) -> Option<&[MarketQuote]> {
    match data.get(Source::Market.as_str()) {
        Some(r) => match &r.data {
            Some(SourcePayload::Market(quotes)) if !quotes.is_empty() => Some(quotes),
            _ => None,
        },
        None => None,
    }
}

pub(crate) fn quote_of(data: &AggregateResult) -> Option<&QuoteOfTheDay> {
    match data.get(Source::Quote.as_str()) {
        Some(r) => match &r.data {
            Some(SourcePayload::Quote(q)) => Some(q),
            _ => None,
        },
        None => None,
    }
}

/// Compact textual context for the generative service: one line per source
/// that produced data.
pub fn build_context(data: &AggregateResult) -> String {
    let mut parts = Vec::new();

    if let Some(w) = weather_of(data) {
        parts.push(format!(
            "Weather in {}: {}°F, {}",
            w.city, w.temp_f, w.condition
        ));
    }

    if let Some(news) = news_of(data) {
        let titles: Vec<&str> = news.iter().take(3).map(|h| h.title.as_str()).collect();
        parts.push(format!("Top headlines: {}", titles.join("; ")));
    }

    if let Some(quotes) = market_of(data) {
        let lines: Vec<String> = quotes
            .iter()
            .take(3)
            .map(|q| format!("{}: ${:.2} ({:+.1}%)", q.symbol, q.price, q.change_pct))
            .collect();
        parts.push(format!("Markets: {}", lines.join(", ")));
    }

    if let Some(q) = quote_of(data) {
        parts.push(format!("Quote of the day: \"{}\" - {}", q.text, q.author));
    }

    parts.join("\n")
}
