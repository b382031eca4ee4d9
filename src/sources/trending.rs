// src/sources/trending.rs
//! Trending repositories fetcher. Single public GitHub search lookup, no
//! secondary; failure falls straight to a one-item demo payload.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sources::{
    truncate_chars, FetchParams, Source, SourceFetcher, SourcePayload, TrendingRepo,
};

const GITHUB_SEARCH_BASE: &str = "https://api.github.com/search/repositories";
const MAX_REPOS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 80;

pub struct TrendingFetcher {
    base: String,
}

impl TrendingFetcher {
    pub fn new() -> Self {
        Self {
            base: GITHUB_SEARCH_BASE.to_string(),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.to_string();
        self
    }
}

impl Default for TrendingFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RepoItem>,
}

#[derive(Debug, Deserialize)]
struct RepoItem {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait::async_trait]
impl SourceFetcher for TrendingFetcher {
    fn source(&self) -> Source {
        Source::Trending
    }

    async fn primary(
        &self,
        http: &reqwest::Client,
        _params: &FetchParams,
    ) -> Result<SourcePayload> {
        let resp = http
            .get(&self.base)
            .query(&[
                ("q", "created:>2025-01-01"),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", "5"),
            ])
            .send()
            .await
            .context("github search request")?
            .error_for_status()
            .context("github search status")?;
        let body: SearchResponse = resp.json().await.context("github search payload")?;

        let repos: Vec<TrendingRepo> = body
            .items
            .into_iter()
            .take(MAX_REPOS)
            .filter(|r| !r.full_name.is_empty())
            .map(|r| TrendingRepo {
                name: r.full_name,
                stars: r.stargazers_count,
                description: truncate_chars(&r.description.unwrap_or_default(), MAX_DESCRIPTION_CHARS),
            })
            .collect();

        anyhow::ensure!(!repos.is_empty(), "no repositories returned");
        Ok(SourcePayload::Trending(repos))
    }

    fn demo(&self, _params: &FetchParams) -> SourcePayload {
        SourcePayload::Trending(vec![TrendingRepo {
            name: "cool/project".to_string(),
            stars: 1234,
            description: "Something interesting".to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_are_capped_and_nulls_defaulted() {
        let raw = format!(
            r#"{{"items": [
                {{"full_name": "a/long", "stargazers_count": 10, "description": "{}"}},
                {{"full_name": "b/nodesc", "stargazers_count": 5, "description": null}},
                {{"full_name": "", "stargazers_count": 1}}
            ]}}"#,
            "x".repeat(120)
        );
        let body: SearchResponse = serde_json::from_str(&raw).unwrap();
        let repos: Vec<TrendingRepo> = body
            .items
            .into_iter()
            .filter(|r| !r.full_name.is_empty())
            .map(|r| TrendingRepo {
                name: r.full_name,
                stars: r.stargazers_count,
                description: truncate_chars(&r.description.unwrap_or_default(), MAX_DESCRIPTION_CHARS),
            })
            .collect();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].description.chars().count(), 80);
        assert_eq!(repos[1].description, "");
    }

    #[test]
    fn demo_payload_is_single_item() {
        let f = TrendingFetcher::new();
        match f.demo(&FetchParams::default()) {
            SourcePayload::Trending(repos) => {
                assert_eq!(repos.len(), 1);
                assert_eq!(repos[0].name, "cool/project");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
