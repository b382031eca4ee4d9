// src/sources/weather.rs
//! Weather fetcher. Primary is wttr.in (key-less JSON endpoint), secondary is
//! OpenWeatherMap when `OPENWEATHER_API_KEY` is configured.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sources::{
    title_case, FetchParams, Source, SourceFetcher, SourcePayload, WeatherReport,
};

const WTTR_BASE: &str = "https://wttr.in";
const OPENWEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5/weather";
const PRIMARY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WeatherFetcher {
    api_key: Option<String>,
    primary_base: String,
    secondary_base: String,
}

impl WeatherFetcher {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            primary_base: WTTR_BASE.to_string(),
            secondary_base: OPENWEATHER_BASE.to_string(),
        }
    }

    /// Point both upstreams somewhere else (tests).
    pub fn with_bases(mut self, primary: &str, secondary: &str) -> Self {
        self.primary_base = primary.to_string();
        self.secondary_base = secondary.to_string();
        self
    }
}

// wttr.in returns every numeric field as a string ("temp_F": "72").
#[derive(Debug, Deserialize)]
struct WttrResponse {
    #[serde(default)]
    current_condition: Vec<WttrCurrent>,
    #[serde(default)]
    nearest_area: Vec<WttrArea>,
}

#[derive(Debug, Deserialize)]
struct WttrCurrent {
    #[serde(rename = "temp_F", default)]
    temp_f: String,
    #[serde(rename = "FeelsLikeF", default)]
    feels_like_f: String,
    #[serde(default)]
    humidity: String,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
struct WttrValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct WttrArea {
    #[serde(rename = "areaName", default)]
    area_name: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    name: String,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    #[serde(default)]
    description: String,
}

/// Parse a stringly-typed upstream number, rounding to the nearest integer.
/// Empty or malformed values default to 0 per the normalization policy.
fn int_field(s: &str) -> i32 {
    s.trim().parse::<f64>().map(|v| v.round() as i32).unwrap_or(0)
}

fn normalize_city(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait::async_trait]
impl SourceFetcher for WeatherFetcher {
    fn source(&self) -> Source {
        Source::Weather
    }

    async fn primary(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
    ) -> Result<SourcePayload> {
        let city = normalize_city(&params.city);
        let url = format!("{}/{}?format=j1", self.primary_base, city.replace(' ', "+"));
        let resp = http
            .get(&url)
            .timeout(PRIMARY_TIMEOUT)
            .send()
            .await
            .context("wttr.in request")?
            .error_for_status()
            .context("wttr.in status")?;
        let body: WttrResponse = resp.json().await.context("wttr.in payload")?;

        let current = body
            .current_condition
            .first()
            .context("wttr.in payload missing current_condition")?;
        let reported_city = body
            .nearest_area
            .first()
            .and_then(|a| a.area_name.first())
            .map(|v| v.value.clone())
            .filter(|v| !v.is_empty())
            .unwrap_or(city);

        Ok(SourcePayload::Weather(WeatherReport {
            city: reported_city,
            temp_f: int_field(&current.temp_f),
            condition: title_case(
                &current
                    .weather_desc
                    .first()
                    .map(|v| v.value.clone())
                    .unwrap_or_default(),
            ),
            humidity_pct: int_field(&current.humidity),
            feels_like_f: int_field(&current.feels_like_f),
        }))
    }

    async fn secondary(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
    ) -> Option<Result<SourcePayload>> {
        let key = self.api_key.as_deref()?;
        Some(self.fetch_openweather(http, params, key).await)
    }

    fn demo(&self, params: &FetchParams) -> SourcePayload {
        SourcePayload::Weather(WeatherReport {
            city: normalize_city(&params.city),
            temp_f: 72,
            condition: "Partly Cloudy".to_string(),
            humidity_pct: 45,
            feels_like_f: 70,
        })
    }
}

impl WeatherFetcher {
    async fn fetch_openweather(
        &self,
        http: &reqwest::Client,
        params: &FetchParams,
        key: &str,
    ) -> Result<SourcePayload> {
        let city = normalize_city(&params.city);
        let resp = http
            .get(&self.secondary_base)
            .query(&[("q", city.as_str()), ("appid", key), ("units", "imperial")])
            .timeout(PRIMARY_TIMEOUT)
            .send()
            .await
            .context("openweathermap request")?
            .error_for_status()
            .context("openweathermap status")?;
        let body: OwmResponse = resp.json().await.context("openweathermap payload")?;

        let city = if body.name.is_empty() { city } else { body.name };
        Ok(SourcePayload::Weather(WeatherReport {
            city,
            temp_f: body.main.temp.round() as i32,
            condition: title_case(
                &body
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .unwrap_or_default(),
            ),
            humidity_pct: body.main.humidity.round() as i32,
            feels_like_f: body.main.feels_like.round() as i32,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_field_parses_stringly_numbers() {
        assert_eq!(int_field("72"), 72);
        assert_eq!(int_field("72.6"), 73);
        assert_eq!(int_field(" 45 "), 45);
        assert_eq!(int_field(""), 0);
        assert_eq!(int_field("n/a"), 0);
    }

    #[test]
    fn city_whitespace_is_normalized() {
        assert_eq!(normalize_city("  New   York "), "New York");
    }

    #[test]
    fn wttr_payload_normalizes_to_integers() {
        let raw = r#"{
            "current_condition": [{
                "temp_F": "72",
                "FeelsLikeF": "70",
                "humidity": "45",
                "weatherDesc": [{"value": "Clear"}]
            }],
            "nearest_area": [{"areaName": [{"value": "New York"}]}]
        }"#;
        let body: WttrResponse = serde_json::from_str(raw).unwrap();
        let current = body.current_condition.first().unwrap();
        assert_eq!(int_field(&current.temp_f), 72);
        assert_eq!(title_case(&current.weather_desc[0].value), "Clear");
    }

    #[test]
    fn demo_payload_is_well_formed() {
        let f = WeatherFetcher::new(None);
        match f.demo(&FetchParams::default()) {
            SourcePayload::Weather(w) => {
                assert_eq!(w.city, "New York");
                assert_eq!(w.temp_f, 72);
                assert!(!w.condition.is_empty());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
