use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    error::{FetchError, truncate_body},
    model::{
        AirQuality, Alert, Condition, CurrentConditions, ForecastDay, HourlyEntry, Location,
        Query, Temperature, WeatherSnapshot,
    },
};

use super::WeatherProvider;

const HOUR_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Client for WeatherAPI.com's `forecast.json`.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[instrument(skip_all, fields(location = query.location(), days = query.days()))]
    async fn forecast(&self, query: &Query) -> Result<WeatherSnapshot, FetchError> {
        let days = query.days().to_string();

        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.location()),
                ("days", days.as_str()),
                ("aqi", "yes"),
                ("alerts", "yes"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() { FetchError::Timeout(self.timeout) } else { FetchError::from(e) }
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            if e.is_timeout() { FetchError::Timeout(self.timeout) } else { FetchError::from(e) }
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "WeatherAPI forecast request failed");
            return Err(FetchError::Provider {
                status: status.as_u16(),
                body: provider_message(&body),
            });
        }

        let snapshot = parse_forecast(&body)?;
        debug!(
            resolved = %snapshot.location.name,
            forecast_days = snapshot.forecast.len(),
            alerts = snapshot.alerts.len(),
            "WeatherAPI forecast received"
        );
        Ok(snapshot)
    }
}

/// Decode a `forecast.json` body into a snapshot.
pub fn parse_forecast(body: &str) -> Result<WeatherSnapshot, FetchError> {
    let parsed: WaForecastResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Decode(format!("forecast JSON: {e}")))?;

    let forecast = parsed
        .forecast
        .forecastday
        .into_iter()
        .map(WaForecastDay::into_model)
        .collect::<Result<Vec<_>, _>>()?;

    let alerts = parsed
        .alerts
        .map(|a| a.alert)
        .unwrap_or_default()
        .into_iter()
        .map(|a| Alert { headline: a.headline, description: a.desc })
        .collect();

    Ok(WeatherSnapshot {
        location: Location {
            name: parsed.location.name,
            region: parsed.location.region,
            country: parsed.location.country,
            localtime: parsed.location.localtime,
        },
        current: parsed.current.into_model(),
        forecast,
        alerts,
        fetched_at: Utc::now(),
    })
}

/// WeatherAPI wraps errors as `{"error": {"message": ...}}`; prefer that over raw JSON.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<WaErrorResponse>(body)
        .map(|e| truncate_body(&e.error.message))
        .unwrap_or_else(|_| truncate_body(body))
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorBody,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    #[serde(default)]
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

impl From<WaCondition> for Condition {
    fn from(c: WaCondition) -> Self {
        Condition { text: c.text, icon: c.icon }
    }
}

#[derive(Debug, Deserialize)]
struct WaAirQuality {
    #[serde(rename = "us-epa-index")]
    us_epa_index: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    #[serde(default)]
    last_updated: String,
    temp_c: f64,
    temp_f: f64,
    feelslike_c: f64,
    feelslike_f: f64,
    #[serde(default)]
    is_day: u8,
    condition: WaCondition,
    wind_kph: f64,
    humidity: u8,
    pressure_mb: f64,
    #[serde(default)]
    uv: f64,
    #[serde(default)]
    vis_km: f64,
    #[serde(default)]
    precip_mm: f64,
    dewpoint_c: Option<f64>,
    dewpoint_f: Option<f64>,
    windchill_c: Option<f64>,
    windchill_f: Option<f64>,
    air_quality: Option<WaAirQuality>,
}

impl WaCurrent {
    fn into_model(self) -> CurrentConditions {
        let pair = |c: Option<f64>, f: Option<f64>| c.zip(f).map(|(c, f)| Temperature::new(c, f));

        CurrentConditions {
            temperature: Temperature::new(self.temp_c, self.temp_f),
            feels_like: Temperature::new(self.feelslike_c, self.feelslike_f),
            condition: self.condition.into(),
            is_day: self.is_day != 0,
            wind_kph: self.wind_kph,
            humidity_pct: self.humidity,
            pressure_mb: self.pressure_mb,
            uv: self.uv,
            visibility_km: self.vis_km,
            precip_mm: self.precip_mm,
            dewpoint: pair(self.dewpoint_c, self.dewpoint_f),
            windchill: pair(self.windchill_c, self.windchill_f),
            last_updated: self.last_updated,
            air_quality: self
                .air_quality
                .map(|aq| AirQuality { us_epa_index: aq.us_epa_index }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    maxtemp_f: f64,
    mintemp_c: f64,
    mintemp_f: f64,
    #[serde(default)]
    maxwind_kph: f64,
    #[serde(default)]
    avghumidity: f64,
    #[serde(default)]
    daily_chance_of_rain: u8,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time: String,
    temp_c: f64,
    temp_f: f64,
    condition: WaCondition,
    #[serde(default)]
    chance_of_rain: u8,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    astro: WaAstro,
    #[serde(default)]
    hour: Vec<WaForecastHour>,
}

impl WaForecastDay {
    fn into_model(self) -> Result<ForecastDay, FetchError> {
        let hours = self
            .hour
            .into_iter()
            .map(|h| {
                let time = NaiveDateTime::parse_from_str(&h.time, HOUR_FORMAT).map_err(|e| {
                    FetchError::Decode(format!("hour timestamp '{}': {e}", h.time))
                })?;

                Ok(HourlyEntry {
                    time,
                    temperature: Temperature::new(h.temp_c, h.temp_f),
                    condition: h.condition.into(),
                    chance_of_rain: h.chance_of_rain,
                })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        Ok(ForecastDay {
            date: self.date,
            max_temp: Temperature::new(self.day.maxtemp_c, self.day.maxtemp_f),
            min_temp: Temperature::new(self.day.mintemp_c, self.day.mintemp_f),
            condition: self.day.condition.into(),
            chance_of_rain: self.day.daily_chance_of_rain,
            max_wind_kph: self.day.maxwind_kph,
            avg_humidity: self.day.avghumidity,
            sunrise: self.astro.sunrise,
            sunset: self.astro.sunset,
            hours,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaAlert {
    headline: String,
    #[serde(default)]
    desc: String,
}

#[derive(Debug, Deserialize)]
struct WaAlerts {
    #[serde(default)]
    alert: Vec<WaAlert>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
    alerts: Option<WaAlerts>,
}
