// tests/aggregate_offline.rs
//
// End-to-end demo-mode scenario: no credentials configured and every
// upstream unreachable. Exercises the library surface directly (no HTTP
// layer): gather_all, fetch_one, and briefing generation over the result.

use std::sync::Arc;
use std::time::Duration;

use command_center::aggregator::{shared_client, Aggregator};
use command_center::briefing::BriefingGenerator;
use command_center::sources::{
    market::MarketFetcher,
    news::NewsFetcher,
    quote::{QuoteFetcher, FALLBACK_QUOTES},
    trending::TrendingFetcher,
    weather::WeatherFetcher,
    FetchParams, Source, SourceFetcher, SourcePayload,
};

const DEAD: &str = "http://127.0.0.1:9";

fn offline_aggregator() -> Aggregator {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(WeatherFetcher::new(None).with_bases(DEAD, DEAD)),
        Arc::new(NewsFetcher::new(None).with_bases(DEAD, DEAD)),
        Arc::new(MarketFetcher::new(None).with_bases(DEAD, DEAD)),
        Arc::new(TrendingFetcher::new().with_base(DEAD)),
        Arc::new(QuoteFetcher::new().with_base(DEAD)),
    ];
    Aggregator::from_parts(shared_client(), fetchers, Duration::ZERO)
}

#[tokio::test]
async fn gather_all_offline_yields_five_demo_entries() {
    let aggregator = offline_aggregator();
    let result = aggregator.gather_all(&FetchParams::default()).await;

    assert_eq!(result.len(), 5);
    for source in Source::ALL {
        let entry = result
            .get(source.as_str())
            .unwrap_or_else(|| panic!("missing entry for {source}"));
        assert_eq!(entry.source, source, "entry keyed by its own source tag");
        assert!(entry.demo, "{source} must degrade to demo data");
        assert!(
            entry.data.is_some(),
            "{source} demo result must carry a payload"
        );
        assert!(
            entry.error.is_some(),
            "{source} should record why it degraded"
        );
    }
}

#[tokio::test]
async fn offline_payloads_respect_the_length_caps() {
    let aggregator = offline_aggregator();
    let result = aggregator.gather_all(&FetchParams::default()).await;

    match &result["news"].data {
        Some(SourcePayload::News(items)) => assert!(items.len() <= 5),
        other => panic!("unexpected news payload: {other:?}"),
    }
    match &result["market"].data {
        Some(SourcePayload::Market(quotes)) => assert!(quotes.len() <= 3),
        other => panic!("unexpected market payload: {other:?}"),
    }
    match &result["trending"].data {
        Some(SourcePayload::Trending(repos)) => assert!(repos.len() <= 5),
        other => panic!("unexpected trending payload: {other:?}"),
    }
    match &result["quote"].data {
        Some(SourcePayload::Quote(_)) => {}
        other => panic!("unexpected quote payload: {other:?}"),
    }
}

#[tokio::test]
async fn briefing_over_offline_data_quotes_a_builtin_verbatim() {
    let aggregator = offline_aggregator();
    let data = aggregator.gather_all(&FetchParams::default()).await;

    let quote_text = match &data["quote"].data {
        Some(SourcePayload::Quote(q)) => q.text.clone(),
        other => panic!("unexpected quote payload: {other:?}"),
    };
    assert!(
        FALLBACK_QUOTES.iter().any(|(text, _)| *text == quote_text),
        "offline quote must be one of the built-ins, got '{quote_text}'"
    );

    let briefing = BriefingGenerator::without_ai().generate(&data).await;
    assert!(!briefing.ai_powered);
    assert!(briefing.demo_mode);
    assert!(
        briefing.text.contains(&quote_text),
        "briefing must include the picked quote verbatim"
    );
}

#[tokio::test]
async fn fetch_one_quote_is_idempotent_in_shape() {
    let aggregator = offline_aggregator();
    let params = FetchParams::default();

    let first = aggregator.fetch_one(Source::Quote, &params).await;
    let second = aggregator.fetch_one(Source::Quote, &params).await;

    for result in [&first, &second] {
        assert_eq!(result.source, Source::Quote);
        assert!(result.demo);
        match &result.data {
            Some(SourcePayload::Quote(q)) => {
                assert!(
                    FALLBACK_QUOTES
                        .iter()
                        .any(|(text, author)| *text == q.text && *author == q.author),
                    "quote must come from the built-in set"
                );
            }
            other => panic!("unexpected quote payload: {other:?}"),
        }
    }
}
