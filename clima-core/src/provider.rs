use crate::{
    Config,
    config::API_KEY_ENV,
    error::{ConfigError, FetchError},
    model::{CityName, Coordinate, WeatherQuery, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// One request in, one normalized snapshot or error out.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_by_coordinates(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, FetchError> {
        self.fetch(&WeatherQuery::Coordinates(coordinate)).await
    }

    async fn fetch_by_city_name(&self, city: &CityName) -> Result<WeatherSnapshot, FetchError> {
        self.fetch(&WeatherQuery::City(city.clone())).await
    }
}

/// Construct the OpenWeather fetcher from config.
///
/// The API key is resolved here so a missing key surfaces before any request.
pub fn fetcher_from_config(config: &Config) -> Result<Box<dyn WeatherFetcher>, ConfigError> {
    let from_env = std::env::var(API_KEY_ENV).ok();
    fetcher_with_env_key(config, from_env.as_deref())
}

fn fetcher_with_env_key(
    config: &Config,
    from_env: Option<&str>,
) -> Result<Box<dyn WeatherFetcher>, ConfigError> {
    let api_key = config.resolve_api_key_with(from_env)?;

    let provider = OpenWeatherProvider::builder(api_key)
        .base_url(&config.base_url)
        .lang(&config.lang)
        .timeout(config.timeout())
        .build()?;

    Ok(Box::new(provider))
}
