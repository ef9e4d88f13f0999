//! Async controller that sequences location and fetch calls.
//!
//! Each trigger runs in its own task and reports back over a channel tagged
//! with its generation, so a slow response from an old trigger can never
//! overwrite the result of a newer one.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    error::{InputError, LocationError, LookupError},
    location::LocationProvider,
    model::{CityName, WeatherQuery},
    provider::WeatherFetcher,
    state::{Generation, Outcome, Session, Trigger, WorkflowState},
};

/// Result of one spawned lookup.
#[derive(Debug)]
pub struct Completion {
    pub generation: Generation,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct Workflow {
    fetcher: Arc<dyn WeatherFetcher>,
    location: Arc<dyn LocationProvider>,
    location_timeout: Duration,
    session: Session,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Workflow {
    /// Idle workflow showing `Empty` until the first trigger.
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, location: Arc<dyn LocationProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            location,
            location_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session: Session::new(),
            tx,
            rx,
        }
    }

    /// Upper bound on waiting for a location fix.
    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// App start: begins in `Loading` and looks up the current position.
    pub fn launch(fetcher: Arc<dyn WeatherFetcher>, location: Arc<dyn LocationProvider>) -> Self {
        let mut workflow = Self::new(fetcher, location);
        workflow.dispatch(Trigger::AppStart);
        workflow
    }

    pub fn state(&self) -> &WorkflowState {
        self.session.state()
    }

    pub fn current_generation(&self) -> Generation {
        self.session.current()
    }

    /// Run the app start flow: locate, then fetch by coordinates.
    pub fn start(&mut self) -> Generation {
        self.dispatch(Trigger::AppStart)
    }

    pub fn use_my_location(&mut self) -> Generation {
        self.dispatch(Trigger::UseMyLocation)
    }

    /// Search by city. Blank input is rejected without touching state or network.
    pub fn search_city(&mut self, input: &str) -> Result<Generation, InputError> {
        let city = CityName::parse(input)?;
        Ok(self.dispatch(Trigger::CitySearch(city)))
    }

    fn dispatch(&mut self, trigger: Trigger) -> Generation {
        let generation = self.session.begin(&trigger);

        let fetcher = Arc::clone(&self.fetcher);
        let location = Arc::clone(&self.location);
        let location_timeout = self.location_timeout;
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            lookup(trigger, fetcher.as_ref(), location.as_ref(), location_timeout).await
        });

        // Every generation reports back, even if its lookup task dies.
        tokio::spawn(async move {
            let outcome = task.await.unwrap_or_else(|e| {
                tracing::error!(%generation, error = %e, "lookup task did not complete");
                Err(LookupError::Interrupted)
            });
            // Receiver lives as long as the workflow; a dropped workflow has no one to tell.
            let _ = tx.send(Completion { generation, outcome });
        });

        generation
    }

    /// Wait for the next finished lookup, current or stale.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Apply a completion. Returns whether the visible state changed.
    pub fn apply(&mut self, completion: Completion) -> bool {
        self.session.resolve(completion.generation, completion.outcome)
    }

    /// Drain completions until the latest trigger has resolved.
    pub async fn settle(&mut self) -> &WorkflowState {
        while self.session.state().is_loading() {
            // The workflow keeps a sender, so the channel stays open.
            if let Some(completion) = self.rx.recv().await {
                self.apply(completion);
            }
        }
        self.session.state()
    }
}

async fn lookup(
    trigger: Trigger,
    fetcher: &dyn WeatherFetcher,
    location: &dyn LocationProvider,
    location_timeout: Duration,
) -> Outcome {
    let query = match trigger {
        Trigger::CitySearch(city) => WeatherQuery::City(city),
        Trigger::AppStart | Trigger::UseMyLocation => {
            let coordinate = match tokio::time::timeout(location_timeout, location.acquire_location()).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(?location_timeout, "timed out waiting for a location fix");
                    return Err(LocationError::PositionUnavailable.into());
                }
            };
            tracing::debug!(%coordinate, "location acquired");
            WeatherQuery::Coordinates(coordinate)
        }
    };

    Ok(fetcher.fetch(&query).await?)
}
