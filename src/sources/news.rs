// src/sources/news.rs
//! Headlines fetcher. Primary is the Hacker News Firebase API, which takes
//! two phases: the top-story ID list, then one detail request per story.
//! Detail requests run concurrently; the first 5 IDs bound the fan-out.
//! Secondary is NewsAPI filtered by category when `NEWS_API_KEY` is set.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sources::{normalize_text, FetchParams, Headline, Source, SourceFetcher, SourcePayload};

const HACKER_NEWS_BASE: &str = "https://hacker-news.firebaseio.com/v0";
const NEWSAPI_BASE: &str = "https://newsapi.org/v2/top-headlines";
const MAX_HEADLINES: usize = 5;

pub struct NewsFetcher {
    api_key: Option<String>,
    primary_base: String,
    secondary_base: String,
}

impl NewsFetcher {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            primary_base: HACKER_NEWS_BASE.to_string(),
            secondary_base: NEWSAPI_BASE.to_string(),
        }
    }

    pub fn with_bases(mut self, primary: &str, secondary: &str) -> Self {
        self.primary_base = primary.to_string();
        self.secondary_base = secondary.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct HnItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: NewsApiSource,
}

#[derive(Debug, Deserialize, Default)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

async fn fetch_hn_item(http: &reqwest::Client, base: &str, id: u64) -> Result<Option<Headline>> {
    let url = format!("{base}/item/{id}.json");
    let item: HnItem = http
        .get(&url)
        .send()
        .await
        .context("hacker news item request")?
        .error_for_status()
        .context("hacker news item status")?
        .json()
        .await
        .context("hacker news item payload")?;

    let title = normalize_text(&item.title);
    if title.is_empty() {
        return Ok(None);
    }
    Ok(Some(Headline {
        title,
        source_name: "Hacker News".to_string(),
        url: item.url.filter(|u| !u.is_empty()),
    }))
}

#[async_trait::async_trait]
impl SourceFetcher for NewsFetcher {
    fn source(&self) -> Source {
        Source::News
    }

    async fn primary(
        &self,
        http: &reqwest::Client,
        _params: &FetchParams,
    ) -> Result<SourcePayload> {
        let list_url = format!("{}/topstories.json", self.primary_base);
        let ids: Vec<u64> = http
            .get(&list_url)
            .send()
            .await
            .context("hacker news list request")?
            .error_for_status()
            .context("hacker news list status")?
            .json()
            .await
            .context("hacker news list payload")?;

        // Detail fetches are independent of each other, only of the ID list.
        let mut handles = Vec::with_capacity(MAX_HEADLINES);
        for id in ids.into_iter().take(MAX_HEADLINES) {
            let http = http.clone();
            let base = self.primary_base.clone();
            handles.push(tokio::spawn(
                async move { fetch_hn_item(&http, &base, id).await },
            ));
        }

        let mut headlines = Vec::with_capacity(MAX_HEADLINES);
        for handle in handles {
            match handle.await {
                Ok(Ok(Some(headline))) => headlines.push(headline),
                Ok(Ok(None)) => {}
                Ok(Err(err)) => {
                    tracing::warn!(error = ?err, "hacker news item fetch failed, skipping");
                }
                Err(err) => {
                    tracing::warn!(error = ?err, "hacker news item task aborted, skipping");
                }
            }
        }

        anyhow::ensure!(!headlines.is_empty(), "no headlines returned");
        Ok(SourcePayload::News(headlines))
    }

    async fn secondary(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
    ) -> Option<Result<SourcePayload>> {
        let key = self.api_key.as_deref()?;
        Some(self.fetch_newsapi(http, params, key).await)
    }

    fn demo(&self, _params: &FetchParams) -> SourcePayload {
        SourcePayload::News(vec![
            Headline {
                title: "AI Continues to Transform Industries".to_string(),
                source_name: "Tech Daily".to_string(),
                url: None,
            },
            Headline {
                title: "New Framework Released for Web Development".to_string(),
                source_name: "Dev News".to_string(),
                url: None,
            },
            Headline {
                title: "Cloud Computing Costs Drop 20%".to_string(),
                source_name: "Business Insider".to_string(),
                url: None,
            },
        ])
    }
}

impl NewsFetcher {
    async fn fetch_newsapi(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
        key: &str,
    ) -> Result<SourcePayload> {
        let resp = http
            .get(&self.secondary_base)
            .query(&[
                ("category", params.category.as_str()),
                ("country", "us"),
                ("pageSize", "5"),
                ("apiKey", key),
            ])
            .send()
            .await
            .context("newsapi request")?
            .error_for_status()
            .context("newsapi status")?;
        let body: NewsApiResponse = resp.json().await.context("newsapi payload")?;

        let headlines: Vec<Headline> = body
            .articles
            .into_iter()
            .take(MAX_HEADLINES)
            .filter_map(|a| {
                let title = normalize_text(&a.title.unwrap_or_default());
                if title.is_empty() {
                    return None;
                }
                Some(Headline {
                    title,
                    source_name: a.source.name.unwrap_or_default(),
                    url: a.url.filter(|u| !u.is_empty()),
                })
            })
            .collect();

        anyhow::ensure!(!headlines.is_empty(), "no headlines returned");
        Ok(SourcePayload::News(headlines))
    }
}
