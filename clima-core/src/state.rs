//! Visible lookup state and the generation-tagged transitions between states.
//!
//! Everything here is synchronous so the transitions can be tested without a
//! runtime; `workflow` drives it from async tasks.

use crate::{error::LookupError, model::{CityName, WeatherSnapshot}};

/// What the screen shows. Always replaced whole, never patched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    Loading,
    Error(String),
    Ready(WeatherSnapshot),
    #[default]
    Empty,
}

impl WorkflowState {
    pub fn is_loading(&self) -> bool {
        matches!(self, WorkflowState::Loading)
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            WorkflowState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            WorkflowState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Monotonic tag assigned to each trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An event that starts a new lookup and invalidates older ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    AppStart,
    CitySearch(CityName),
    UseMyLocation,
}

impl Trigger {
    pub fn needs_location(&self) -> bool {
        !matches!(self, Trigger::CitySearch(_))
    }
}

pub type Outcome = Result<WeatherSnapshot, LookupError>;

/// Owner of the single `WorkflowState`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: WorkflowState,
    current: Generation,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Generation of the most recent trigger.
    pub fn current(&self) -> Generation {
        self.current
    }

    /// Register a trigger: show Loading and hand out its generation.
    pub fn begin(&mut self, trigger: &Trigger) -> Generation {
        self.current = self.current.next();
        self.state = WorkflowState::Loading;
        tracing::info!(generation = %self.current, ?trigger, "lookup started");
        self.current
    }

    /// Apply the outcome of a lookup. Returns whether the state changed.
    ///
    /// Outcomes from superseded generations are dropped.
    pub fn resolve(&mut self, generation: Generation, outcome: Outcome) -> bool {
        if generation != self.current {
            tracing::debug!(%generation, current = %self.current, "discarding stale lookup result");
            return false;
        }
        if !self.state.is_loading() {
            return false;
        }

        self.state = match outcome {
            Ok(snapshot) => {
                tracing::info!(%generation, city = %snapshot.city, "lookup succeeded");
                WorkflowState::Ready(snapshot)
            }
            Err(err) => {
                tracing::warn!(%generation, error = %err, "lookup failed");
                WorkflowState::Error(err.to_string())
            }
        };
        true
    }
}
