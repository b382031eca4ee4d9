// src/briefing/template.rs
//! Deterministic briefing renderer. Same per-source summaries the AI path
//! sees, laid out as a fixed markdown template. Sections whose source is
//! missing or errored are omitted; the greeting always renders.

use chrono::Utc;

use crate::aggregator::AggregateResult;
use crate::briefing::{market_of, news_of, quote_of, weather_of};

pub fn render(data: &AggregateResult) -> String {
    let mut out = format!(
        "Good morning! Here's your intelligence briefing for {}:\n",
        Utc::now().format("%A, %B %d")
    );

    if let Some(w) = weather_of(data) {
        out.push_str("\n**Weather & Environment**\n");
        out.push_str(&format!(
            "It's {}°F and {} in {}.\n",
            w.temp_f,
            w.condition.to_lowercase(),
            w.city
        ));
    }

    if let Some(quotes) = market_of(data) {
        out.push_str("\n**What's Moving**\n");
        for q in quotes {
            let direction = if q.change_pct > 0.0 { "up" } else { "down" };
            out.push_str(&format!(
                "• {} is {} {:.1}% at ${:.2}\n",
                q.symbol,
                direction,
                q.change_pct.abs(),
                q.price
            ));
        }
    }

    if let Some(news) = news_of(data) {
        out.push_str("\n**Headlines to Watch**\n");
        for h in news.iter().take(3) {
            out.push_str(&format!("• {}\n", h.title));
        }
    }

    if let Some(q) = quote_of(data) {
        out.push_str(&format!(
            "\n**Thought for Today**\n\"{}\" — {}\n",
            q.text, q.author
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{
        MarketQuote, QuoteOfTheDay, Source, SourcePayload, SourceResult, WeatherReport,
    };

    fn live(source: Source, payload: SourcePayload) -> (String, SourceResult) {
        (
            source.as_str().to_string(),
            SourceResult::live(source, payload),
        )
    }

    #[test]
    fn greeting_always_renders_even_with_no_data() {
        let text = render(&AggregateResult::new());
        assert!(text.starts_with("Good morning!"));
        assert!(!text.contains("**Weather"));
        assert!(!text.contains("**What's Moving"));
        assert!(!text.contains("**Headlines"));
        assert!(!text.contains("**Thought"));
    }

    #[test]
    fn market_bullets_show_direction_from_sign() {
        let data = AggregateResult::from([live(
            Source::Market,
            SourcePayload::Market(vec![
                MarketQuote {
                    symbol: "AAPL".into(),
                    price: 178.52,
                    change_abs: 2.34,
                    change_pct: 1.32,
                },
                MarketQuote {
                    symbol: "GOOGL".into(),
                    price: 141.23,
                    change_abs: -0.87,
                    change_pct: -0.61,
                },
            ]),
        )]);
        let text = render(&data);
        assert!(text.contains("• AAPL is up 1.3% at $178.52"));
        assert!(text.contains("• GOOGL is down 0.6% at $141.23"));
    }

    #[test]
    fn weather_and_quote_sections_render_from_payloads() {
        let data = AggregateResult::from([
            live(
                Source::Weather,
                SourcePayload::Weather(WeatherReport {
                    city: "New York".into(),
                    temp_f: 72,
                    condition: "Partly Cloudy".into(),
                    humidity_pct: 45,
                    feels_like_f: 70,
                }),
            ),
            live(
                Source::Quote,
                SourcePayload::Quote(QuoteOfTheDay {
                    text: "The best way to predict the future is to create it.".into(),
                    author: "Peter Drucker".into(),
                }),
            ),
        ]);
        let text = render(&data);
        assert!(text.contains("It's 72°F and partly cloudy in New York."));
        assert!(text.contains("\"The best way to predict the future is to create it.\" — Peter Drucker"));
    }
}
