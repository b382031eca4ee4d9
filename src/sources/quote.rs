// src/sources/quote.rs
//! Quotation fetcher. Single public lookup with a 5s timeout; any failure
//! (including the timeout) yields one of three built-in quotes.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sources::{FetchParams, QuoteOfTheDay, Source, SourceFetcher, SourcePayload};

const QUOTABLE_BASE: &str = "https://api.quotable.io/random";
const QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Built-in fallback quotes, one of which is picked pseudo-randomly.
pub const FALLBACK_QUOTES: [(&str, &str); 3] = [
    (
        "The best way to predict the future is to create it.",
        "Peter Drucker",
    ),
    (
        "Innovation distinguishes between a leader and a follower.",
        "Steve Jobs",
    ),
    (
        "The only way to do great work is to love what you do.",
        "Steve Jobs",
    ),
];

pub struct QuoteFetcher {
    base: String,
}

impl QuoteFetcher {
    pub fn new() -> Self {
        Self {
            base: QUOTABLE_BASE.to_string(),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.to_string();
        self
    }
}

impl Default for QuoteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct QuotableResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    author: String,
}

/// Clock jitter is plenty of randomness for rotating three canned quotes;
/// avoids pulling in `rand`.
fn pick_fallback() -> QuoteOfTheDay {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let (text, author) = FALLBACK_QUOTES[nanos as usize % FALLBACK_QUOTES.len()];
    QuoteOfTheDay {
        text: text.to_string(),
        author: author.to_string(),
    }
}

#[async_trait::async_trait]
impl SourceFetcher for QuoteFetcher {
    fn source(&self) -> Source {
        Source::Quote
    }

    async fn primary(
        &self,
        http: &reqwest::Client,
        _params: &FetchParams,
    ) -> Result<SourcePayload> {
        let resp = http
            .get(&self.base)
            .timeout(QUOTE_TIMEOUT)
            .send()
            .await
            .context("quotable request")?
            .error_for_status()
            .context("quotable status")?;
        let body: QuotableResponse = resp.json().await.context("quotable payload")?;

        anyhow::ensure!(!body.content.is_empty(), "empty quote returned");
        Ok(SourcePayload::Quote(QuoteOfTheDay {
            text: body.content,
            author: body.author,
        }))
    }

    fn demo(&self, _params: &FetchParams) -> SourcePayload {
        SourcePayload::Quote(pick_fallback())
    }
}
