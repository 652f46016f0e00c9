//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider abstraction and the WeatherAPI.com client
//! - The query controller (debounce, fetch lifecycle, last-commit-wins)
//! - The pure view projector (units, sorting, filters, backdrops)
//!
//! It is used by `dashboard-cli`, but has no terminal I/O of its own.

pub mod backdrop;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod projector;
pub mod provider;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use controller::{ControllerSettings, FetchHandle, QueryController};
pub use error::{FetchError, ParseOptionError};
pub use model::{
    AppState, DisplayOptions, FetchStatus, ForecastDay, Metric, Query, SortKey, TemperatureUnit,
    WeatherSnapshot,
};
pub use projector::{DashboardView, project};
pub use provider::{WeatherProvider, provider_from_config};
