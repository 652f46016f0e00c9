use crate::{Config, FetchError, Query, WeatherSnapshot, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// Source of forecast snapshots. One call per committed query.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn forecast(&self, query: &Query) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = WeatherApiProvider::new(
        api_key.to_owned(),
        config.base_url.clone(),
        config.request_timeout(),
    )?;

    Ok(Arc::new(provider))
}
