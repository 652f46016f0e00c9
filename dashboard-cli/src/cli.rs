use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use dashboard_core::{
    Config, ControllerSettings, FetchStatus, Metric, QueryController, SortKey, TemperatureUnit,
    project, provider_from_config,
};
use inquire::{Password, Text};
use tracing::{debug, info};

use crate::{render, watch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and a default location.
    Configure,

    /// Search once and print the dashboard.
    Show {
        /// Place name, e.g. "Paris".
        location: String,

        #[command(flatten)]
        display: DisplayArgs,

        /// Print the projected view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: type to search, `:help` for commands.
    Watch {
        /// Place to search first; falls back to the configured default.
        location: Option<String>,

        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Number of forecast days.
    #[arg(long)]
    days: Option<u8>,

    /// Temperature unit: c or f.
    #[arg(long, default_value = "c")]
    unit: TemperatureUnit,

    /// Forecast order: date, highTemp, lowTemp, precipitation.
    #[arg(long, default_value = "date")]
    sort: SortKey,

    /// Hourly entries to show.
    #[arg(long)]
    hours: Option<usize>,

    /// Hide a metric row (repeatable): wind, humidity, pressure, uv.
    #[arg(long = "hide")]
    hide: Vec<Metric>,

    /// Expand the current-conditions details.
    #[arg(long)]
    details: bool,
}

impl DisplayArgs {
    fn apply(&self, controller: &QueryController) {
        if let Some(days) = self.days {
            controller.set_forecast_days(days);
        }
        controller.set_unit(self.unit);
        controller.set_sort_key(self.sort);
        if let Some(hours) = self.hours {
            controller.set_hourly_hours(hours);
        }
        for metric in &self.hide {
            controller.set_metric(*metric, false);
        }
        if self.details {
            controller.toggle_details();
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, display, json } => {
                let controller = build_controller()?;
                display.apply(&controller);

                let Some(fetch) = controller.commit_query(&location) else {
                    bail!("Location must not be empty");
                };
                fetch.finished().await;

                let state = controller.state();
                match (&state.status, &state.snapshot) {
                    (FetchStatus::Success, Some(snapshot)) => {
                        let view = project(snapshot, &state.options, state.forecast_days.into());
                        if json {
                            let out = serde_json::to_string_pretty(&view)
                                .context("Failed to serialize dashboard to JSON")?;
                            println!("{out}");
                        } else {
                            print!("{}", render::render_dashboard(&view, state.forecast_days));
                        }
                        Ok(())
                    }
                    (FetchStatus::Failed(reason), _) => bail!("{reason}"),
                    (status, _) => bail!("Search ended in unexpected state: {status:?}"),
                }
            }
            Command::Watch { location, display } => {
                let controller = build_controller()?;
                display.apply(&controller);
                watch::run(controller, location).await
            }
        }
    }
}

fn build_controller() -> anyhow::Result<QueryController> {
    let config = Config::load()?;
    config.validate()?;
    debug!(
        base_url = %config.base_url,
        forecast_days = config.default_forecast_days,
        "building controller"
    );

    let provider = provider_from_config(&config)?;
    Ok(QueryController::new(provider, ControllerSettings::from(&config)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("WeatherAPI.com key:")
        .without_confirmation()
        .with_help_message("Free keys are available at https://www.weatherapi.com/")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let current = config.default_location.clone().unwrap_or_default();
    let location = Text::new("Default location (leave empty for none):")
        .with_initial_value(&current)
        .prompt()
        .context("Failed to read default location")?;
    config.default_location = Some(location.trim().to_string()).filter(|l| !l.is_empty());

    config.save()?;
    let path = Config::config_file_path()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());
    Ok(())
}
