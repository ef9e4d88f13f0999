use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_LANG, DEFAULT_TIMEOUT_SECS},
    error::{ConfigError, FetchError},
    model::{WeatherQuery, WeatherSnapshot, round_half_up},
};

use super::WeatherFetcher;

/// Fallback when a coordinate lookup is rejected without a provider message.
pub const COORDINATES_REJECTED: &str = "failed to fetch weather";
/// Fallback when a city lookup is rejected without a provider message.
pub const CITY_REJECTED: &str = "city not found";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    http: Client,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherBuilder {
    api_key: String,
    base_url: String,
    lang: String,
    timeout: Duration,
}

impl OpenWeatherBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenWeatherProvider, ConfigError> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(OpenWeatherProvider {
            api_key: self.api_key,
            base_url: self.base_url,
            lang: self.lang,
            http,
        })
    }
}

impl OpenWeatherProvider {
    pub fn builder(api_key: String) -> OpenWeatherBuilder {
        OpenWeatherBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    fn query_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            WeatherQuery::City(city) => vec![("q", city.as_str().to_string())],
        };
        params.push(("units", "metric".to_string()));
        params.push(("lang", self.lang.clone()));
        params.push(("appid", self.api_key.clone()));
        params
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherProvider {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/weather", self.base_url);

        tracing::debug!(?query, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %without_url(e), "OpenWeather request failed");
                FetchError::network()
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::warn!(error = %without_url(e), "Failed to read OpenWeather response body");
            FetchError::network()
        })?;

        tracing::debug!(%status, "OpenWeather responded");

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "OpenWeather rejected request");
            let fallback = match query {
                WeatherQuery::Coordinates(_) => COORDINATES_REJECTED,
                WeatherQuery::City(_) => CITY_REJECTED,
            };
            return Err(FetchError::api_rejected(
                rejection_message(&body).unwrap_or_else(|| fallback.to_string()),
            ));
        }

        normalize(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: Option<i64>,
    sys: Option<OwSys>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

/// Turn a successful `/weather` body into a snapshot.
///
/// Country, description and icon are optional; a body that doesn't parse at
/// all is reported as a network error.
pub fn normalize(body: &str) -> Result<WeatherSnapshot, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, body = %truncate_body(body), "Failed to parse OpenWeather JSON");
        FetchError::network()
    })?;

    let (description, icon_code) = match parsed.weather.into_iter().next() {
        Some(w) => (w.description, w.icon),
        None => (None, None),
    };

    Ok(WeatherSnapshot {
        city: parsed.name,
        country: parsed.sys.and_then(|s| s.country),
        temperature_c: round_half_up(parsed.main.temp),
        feels_like_c: round_half_up(parsed.main.feels_like),
        description,
        icon_code,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        observed_at: parsed.dt.and_then(unix_to_utc),
    })
}

fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

/// reqwest errors carry the request URL, which includes `appid`.
fn without_url(e: reqwest::Error) -> reqwest::Error {
    e.without_url()
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
