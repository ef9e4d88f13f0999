//! Error taxonomy shared by the location provider, fetcher and configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied; search a city")]
    AuthorizationDenied,

    #[error("current position unavailable; search a city")]
    PositionUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The provider answered with a non-2xx status.
    ApiRejected,
    /// DNS, connect, timeout or an unreadable body.
    NetworkError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub const NETWORK_MESSAGE: &'static str = "network error";

    pub fn api_rejected(message: impl Into<String>) -> Self {
        Self { kind: FetchErrorKind::ApiRejected, message: message.into() }
    }

    pub fn network() -> Self {
        Self { kind: FetchErrorKind::NetworkError, message: Self::NETWORK_MESSAGE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("city name must not be blank")]
    BlankCity,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No API key configured.\n\
         Hint: run `clima configure` or set the CLIMA_API_KEY environment variable."
    )]
    MissingApiKey,

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to access config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Anything that can end a single lookup; rendered as the error view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The lookup task panicked or was cancelled before reporting.
    #[error("lookup failed unexpectedly; try again")]
    Interrupted,
}
