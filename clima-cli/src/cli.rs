use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use clima_core::{
    Config, ConfiguredLocation, Coordinate, IconSize, LocationConfig, LocationProvider, Workflow,
    WorkflowState, fetcher_from_config, icon_url,
};
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Text};

use crate::render::render;

const HERE_COMMAND: &str = ":here";
const QUIT_COMMAND: &str = ":quit";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "Current weather for your location or any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, language and location access.
    Configure,

    /// Look up the weather once and print it.
    Show {
        /// City to search; uses your location when absent.
        city: Option<String>,

        /// Latitude to use instead of the configured location.
        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of the configured location.
        #[arg(long, requires = "lat", conflicts_with = "city", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive screen: starts at your location, then search cities.
    Interactive,

    /// Print the icon URL for a condition code, e.g. "01d".
    Icon {
        code: String,

        /// Use the large (@4x) variant.
        #[arg(long)]
        large: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, lat, lon, json } => {
                let fix = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                return show(city, fix, json).await;
            }
            Command::Interactive => interactive().await?,
            Command::Icon { code, large } => {
                let config = Config::load().context("Failed to load configuration")?;
                let size = if large { IconSize::Large } else { IconSize::Standard };
                println!("{}", icon_url(&config.icon_host, &code, size));
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// Build an idle workflow, failing before any request if the key is missing.
fn build_workflow(config: &Config, location: Arc<dyn LocationProvider>) -> anyhow::Result<Workflow> {
    let fetcher = fetcher_from_config(config)?;
    Ok(Workflow::new(Arc::from(fetcher), location).with_location_timeout(config.timeout()))
}

async fn show(city: Option<String>, fix: Option<Coordinate>, json: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load().context("Failed to load configuration")?;

    let location: Arc<dyn LocationProvider> = match fix {
        Some(coordinate) => Arc::new(ConfiguredLocation::fixed(coordinate)),
        None => Arc::new(ConfiguredLocation::from_config(&config.location)),
    };
    let mut workflow = build_workflow(&config, location)?;

    match city {
        Some(city) => {
            workflow.search_city(&city)?;
        }
        None => {
            workflow.start();
        }
    }

    let state = workflow.settle().await;
    let (output, succeeded) = show_output(state, json, &config.icon_host)?;
    println!("{output}");

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// What `show` prints for a settled state, and whether the lookup succeeded.
fn show_output(state: &WorkflowState, json: bool, icon_host: &str) -> anyhow::Result<(String, bool)> {
    match state {
        WorkflowState::Ready(snapshot) if json => Ok((serde_json::to_string_pretty(snapshot)?, true)),
        WorkflowState::Error(_) => Ok((render(state, icon_host), false)),
        state => Ok((render(state, icon_host), true)),
    }
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let location = Arc::new(ConfiguredLocation::from_config(&config.location));
    let mut workflow = build_workflow(&config, location)?;

    workflow.start();

    loop {
        let state = workflow.settle().await;
        println!("\n{}\n", render(state, &config.icon_host));

        // inquire blocks on the terminal; keep it off the async workers.
        let answer = tokio::task::spawn_blocking(|| {
            Text::new("Search city:")
                .with_help_message("type a city, :here to use your location, :quit to exit")
                .prompt()
        })
        .await
        .context("Prompt task failed")?;

        let input = match answer {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read search input"),
        };

        match input.trim() {
            QUIT_COMMAND => break,
            HERE_COMMAND => {
                workflow.use_my_location();
            }
            other => {
                if let Err(e) = workflow.search_city(other) {
                    println!("{e}");
                }
            }
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    let api_key = Password::new("OpenWeather API key (leave blank to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.lang = Text::new("Language for descriptions:")
        .with_default(&config.lang)
        .prompt()?;

    let enabled = Confirm::new("Allow clima to use your location?")
        .with_default(config.location.enabled)
        .prompt()?;

    config.location = if enabled {
        let latitude = coordinate_prompt("Latitude:", config.location.latitude)?;
        let longitude = coordinate_prompt("Longitude:", config.location.longitude)?;
        LocationConfig { enabled, latitude: Some(latitude), longitude: Some(longitude) }
    } else {
        LocationConfig { enabled, ..config.location }
    };

    // Refuse to save a config that can't fetch anything.
    config.resolve_api_key()?;

    let path = config.save().context("Failed to save configuration")?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn coordinate_prompt(message: &str, current: Option<f64>) -> Result<f64, InquireError> {
    let prompt = CustomType::<f64>::new(message).with_error_message("Please enter a decimal number");
    match current {
        Some(value) => prompt.with_default(value).prompt(),
        None => prompt.prompt(),
    }
}
