// src/api.rs
//! HTTP boundary for the dashboard. Thin by design: every handler delegates
//! to the aggregator/briefing components and serializes the result. The core
//! contract means handlers never fail, so everything but an unknown widget
//! name answers 200.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::aggregator::{AggregateResult, Aggregator};
use crate::briefing::{Briefing, BriefingGenerator};
use crate::config::AppConfig;
use crate::sources::{FetchParams, Source};

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    briefing: Arc<BriefingGenerator>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            aggregator: Arc::new(Aggregator::new(config)),
            briefing: Arc::new(BriefingGenerator::new(config)),
        }
    }

    pub fn from_parts(aggregator: Aggregator, briefing: BriefingGenerator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            briefing: Arc::new(briefing),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/data", get(get_data))
        .route("/api/briefing", get(get_briefing))
        .route("/api/widget/{kind}", get(get_widget))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    city: Option<String>,
    category: Option<String>,
    /// Comma-separated ticker list for the market widget.
    symbols: Option<String>,
}

impl DashboardQuery {
    fn into_params(self) -> FetchParams {
        let defaults = FetchParams::default();
        FetchParams {
            city: self
                .city
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.city),
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.category),
            symbols: self
                .symbols
                .map(|s| {
                    s.split(',')
                        .map(|sym| sym.trim().to_uppercase())
                        .filter(|sym| !sym.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|syms| !syms.is_empty())
                .unwrap_or(defaults.symbols),
        }
    }
}

#[derive(Serialize)]
struct DataResponse {
    data: AggregateResult,
    timestamp: DateTime<Utc>,
}

async fn get_data(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Json<DataResponse> {
    let params = q.into_params();
    let data = state.aggregator.gather_all(&params).await;
    Json(DataResponse {
        data,
        timestamp: Utc::now(),
    })
}

async fn get_briefing(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Json<Briefing> {
    let params = q.into_params();
    let data = state.aggregator.gather_all(&params).await;
    Json(state.briefing.generate(&data).await)
}

async fn get_widget(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(q): Query<DashboardQuery>,
) -> impl IntoResponse {
    let Some(source) = Source::parse(&kind) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "unknown widget type" })),
        )
            .into_response();
    };
    let params = q.into_params();
    let result = state.aggregator.fetch_one(source, &params).await;
    Json(result).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_match_the_dashboard_contract() {
        let q = DashboardQuery {
            city: None,
            category: Some("  ".into()),
            symbols: None,
        };
        let params = q.into_params();
        assert_eq!(params.city, "New York");
        assert_eq!(params.category, "technology");
        assert_eq!(params.symbols, vec!["AAPL", "GOOGL", "MSFT"]);
    }

    #[test]
    fn symbols_are_split_trimmed_and_uppercased() {
        let q = DashboardQuery {
            city: Some("Prague".into()),
            category: Some("business".into()),
            symbols: Some(" tsla, nvda ,,amd ".into()),
        };
        let params = q.into_params();
        assert_eq!(params.city, "Prague");
        assert_eq!(params.category, "business");
        assert_eq!(params.symbols, vec!["TSLA", "NVDA", "AMD"]);
    }
}
