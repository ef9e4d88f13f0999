//! Core library for the `clima` weather lookup screen.
//!
//! This crate defines:
//! - Configuration & API key resolution
//! - The location and weather fetcher seams, with an OpenWeather implementation
//! - The lookup state machine and its async controller
//!
//! It is used by `clima-cli`, but the workflow has no rendering dependency and
//! can drive any other front end.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod state;
pub mod workflow;

pub use config::{Config, LocationConfig};
pub use error::{ConfigError, FetchError, FetchErrorKind, InputError, LocationError, LookupError};
pub use location::{ConfiguredLocation, LocationProvider};
pub use model::{CityName, Coordinate, IconSize, WeatherQuery, WeatherSnapshot, icon_url};
pub use provider::{WeatherFetcher, fetcher_from_config};
pub use state::{Generation, Session, Trigger, WorkflowState};
pub use workflow::{Completion, Workflow};
