use async_trait::async_trait;
use std::fmt::Debug;

use crate::{config::LocationConfig, error::LocationError, model::Coordinate};

/// Source of the device's current position.
///
/// Implementations must check authorization first and report
/// `AuthorizationDenied` without attempting a fix when it is not granted.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn acquire_location(&self) -> Result<Coordinate, LocationError>;
}

/// Location provider backed by the `[location]` config table.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    authorized: bool,
    fix: Option<Coordinate>,
}

impl ConfiguredLocation {
    pub fn new(authorized: bool, fix: Option<Coordinate>) -> Self {
        Self { authorized, fix }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        Self::new(config.enabled, config.coordinate())
    }

    /// Authorized provider with a known fix, e.g. from `--lat/--lon`.
    pub fn fixed(coordinate: Coordinate) -> Self {
        Self::new(true, Some(coordinate))
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocation {
    async fn acquire_location(&self) -> Result<Coordinate, LocationError> {
        if !self.authorized {
            return Err(LocationError::AuthorizationDenied);
        }
        self.fix.ok_or(LocationError::PositionUnavailable)
    }
}
