use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A geographic position as reported by a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A city name that is guaranteed to contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityName(String);

impl CityName {
    /// Validate user input. Surrounding whitespace is dropped.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InputError::BlankCity);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a single fetch should look up.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates(Coordinate),
    City(CityName),
}

/// Normalized current conditions for one place.
///
/// Built once from a provider response and never patched; the next successful
/// lookup replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: Option<String>,
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub description: Option<String>,
    pub icon_code: Option<String>,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    /// "City, CC" or just "City" when the provider sent no country.
    pub fn place(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.city, country),
            None => self.city.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconSize {
    #[default]
    Standard,
    Large,
}

impl IconSize {
    fn suffix(&self) -> &'static str {
        match self {
            IconSize::Standard => "@2x",
            IconSize::Large => "@4x",
        }
    }
}

/// URL of the provider's condition icon.
pub fn icon_url(host: &str, icon_code: &str, size: IconSize) -> String {
    format!("https://{host}/img/wn/{icon_code}{}.png", size.suffix())
}

/// Round half up, e.g. 18.5 -> 19 and -2.5 -> -2.
pub fn round_half_up(value: f64) -> i32 {
    // `value + 0.5` can round up in f64 for inputs just below .5.
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_name_rejects_blank_input() {
        assert_eq!(CityName::parse(""), Err(InputError::BlankCity));
        assert_eq!(CityName::parse("   \t\n"), Err(InputError::BlankCity));
    }

    #[test]
    fn city_name_trims_surrounding_whitespace() {
        let city = CityName::parse("  Montevideo ").expect("valid city");
        assert_eq!(city.as_str(), "Montevideo");
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up(18.6), 19);
        assert_eq!(round_half_up(18.4), 18);
        assert_eq!(round_half_up(18.5), 19);
        assert_eq!(round_half_up(17.9), 18);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(0.49999999999999994), 0);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn icon_urls() {
        assert_eq!(
            icon_url("openweathermap.org", "01d", IconSize::Standard),
            "https://openweathermap.org/img/wn/01d@2x.png"
        );
        assert_eq!(
            icon_url("openweathermap.org", "10n", IconSize::Large),
            "https://openweathermap.org/img/wn/10n@4x.png"
        );
    }

    #[test]
    fn place_omits_missing_country() {
        let mut snapshot = WeatherSnapshot {
            city: "Montevideo".into(),
            country: Some("UY".into()),
            temperature_c: 19,
            feels_like_c: 18,
            description: None,
            icon_code: None,
            humidity_pct: 70,
            wind_speed_mps: 3.2,
            observed_at: None,
        };
        assert_eq!(snapshot.place(), "Montevideo, UY");

        snapshot.country = None;
        assert_eq!(snapshot.place(), "Montevideo");
    }
}
