use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, ParseOptionError};

/// A committed search: the location text and how many forecast days to request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    location: String,
    days: u8,
}

impl Query {
    /// Build a query from raw search text. Blank text is rejected.
    pub fn new(location: &str, days: u8) -> Result<Self, FetchError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(FetchError::EmptyQuery);
        }

        Ok(Self { location: location.to_string(), days })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn days(&self) -> u8 {
        self.days
    }

    /// Same location, different horizon.
    pub fn with_days(&self, days: u8) -> Self {
        Self { location: self.location.clone(), days }
    }
}

/// A temperature as the provider reports it: both scales, no conversion on our side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

impl Temperature {
    pub fn new(celsius: f64, fahrenheit: f64) -> Self {
        Self { celsius, fahrenheit }
    }

    pub fn in_unit(&self, unit: TemperatureUnit) -> f64 {
        crate::projector::select_temperature(self.celsius, self.fahrenheit, unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative icon path as served by the provider.
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: Temperature,
    pub feels_like: Temperature,
    pub condition: Condition,
    pub is_day: bool,
    pub wind_kph: f64,
    pub humidity_pct: u8,
    pub pressure_mb: f64,
    pub uv: f64,
    pub visibility_km: f64,
    pub precip_mm: f64,
    pub dewpoint: Option<Temperature>,
    pub windchill: Option<Temperature>,
    pub last_updated: String,
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub us_epa_index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub temperature: Temperature,
    pub condition: Condition,
    pub chance_of_rain: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp: Temperature,
    pub min_temp: Temperature,
    pub condition: Condition,
    pub chance_of_rain: u8,
    pub max_wind_kph: f64,
    pub avg_humidity: f64,
    pub sunrise: String,
    pub sunset: String,
    pub hours: Vec<HourlyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub headline: String,
    pub description: String,
}

/// One successful fetch. Replaced wholesale by the next one, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastDay>,
    pub alerts: Vec<Alert>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(ParseOptionError {
                kind: "unit",
                value: s.to_string(),
                expected: "c, f",
            }),
        }
    }
}

/// Ordering of the multi-day list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Date,
    HighTemp,
    LowTemp,
    Precipitation,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::HighTemp => "highTemp",
            SortKey::LowTemp => "lowTemp",
            SortKey::Precipitation => "precipitation",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.trim().chars().filter(|c| *c != '-' && *c != '_').collect::<String>().to_lowercase();

        match normalized.as_str() {
            "date" => Ok(SortKey::Date),
            "hightemp" | "high" => Ok(SortKey::HighTemp),
            "lowtemp" | "low" => Ok(SortKey::LowTemp),
            "precipitation" | "rain" => Ok(SortKey::Precipitation),
            _ => Err(ParseOptionError {
                kind: "sort key",
                value: s.to_string(),
                expected: "date, highTemp, lowTemp, precipitation",
            }),
        }
    }
}

/// Optional rows on the current-conditions card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Wind,
    Humidity,
    Pressure,
    Uv,
}

impl Metric {
    pub const fn all() -> &'static [Metric] {
        &[Metric::Wind, Metric::Humidity, Metric::Pressure, Metric::Uv]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Wind => "Wind",
            Metric::Humidity => "Humidity",
            Metric::Pressure => "Pressure",
            Metric::Uv => "UV Index",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Metric::Wind => " kph",
            Metric::Humidity => "%",
            Metric::Pressure => " mb",
            Metric::Uv => "",
        }
    }
}

impl FromStr for Metric {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wind" => Ok(Metric::Wind),
            "humidity" => Ok(Metric::Humidity),
            "pressure" => Ok(Metric::Pressure),
            "uv" => Ok(Metric::Uv),
            _ => Err(ParseOptionError {
                kind: "metric",
                value: s.to_string(),
                expected: "wind, humidity, pressure, uv",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFilters {
    pub wind: bool,
    pub humidity: bool,
    pub pressure: bool,
    pub uv: bool,
}

impl Default for MetricFilters {
    fn default() -> Self {
        Self { wind: true, humidity: true, pressure: true, uv: true }
    }
}

impl MetricFilters {
    pub fn is_enabled(&self, metric: Metric) -> bool {
        *self.flag(metric)
    }

    pub fn set(&mut self, metric: Metric, enabled: bool) {
        *self.flag_mut(metric) = enabled;
    }

    pub fn toggle(&mut self, metric: Metric) {
        let flag = self.flag_mut(metric);
        *flag = !*flag;
    }

    fn flag(&self, metric: Metric) -> &bool {
        match metric {
            Metric::Wind => &self.wind,
            Metric::Humidity => &self.humidity,
            Metric::Pressure => &self.pressure,
            Metric::Uv => &self.uv,
        }
    }

    fn flag_mut(&mut self, metric: Metric) -> &mut bool {
        match metric {
            Metric::Wind => &mut self.wind,
            Metric::Humidity => &mut self.humidity,
            Metric::Pressure => &mut self.pressure,
            Metric::Uv => &mut self.uv,
        }
    }
}

pub const DEFAULT_HOURLY_HOURS: usize = 12;

/// Purely presentational choices. Changing any of these never triggers a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub unit: TemperatureUnit,
    pub sort_key: SortKey,
    pub hourly_hours: usize,
    pub metrics: MetricFilters,
    pub details_expanded: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::default(),
            sort_key: SortKey::default(),
            hourly_hours: DEFAULT_HOURLY_HOURS,
            metrics: MetricFilters::default(),
            details_expanded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }
}

/// Everything the dashboard knows at one instant.
///
/// Owned by the controller and only changed through its operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    pub draft: String,
    pub query: Option<Query>,
    pub forecast_days: u8,
    pub status: FetchStatus,
    pub snapshot: Option<WeatherSnapshot>,
    pub options: DisplayOptions,
    /// Id of the request whose answer we still accept.
    #[serde(skip)]
    pub(crate) in_flight: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed() {
        let query = Query::new("  Paris \n", 3).expect("non-empty query");
        assert_eq!(query.location(), "Paris");
        assert_eq!(query.days(), 3);
    }

    #[test]
    fn blank_query_is_rejected() {
        assert_eq!(Query::new("   \t", 3).unwrap_err(), FetchError::EmptyQuery);
        assert_eq!(Query::new("", 1).unwrap_err(), FetchError::EmptyQuery);
    }

    #[test]
    fn unit_toggles_back_and_forth() {
        let unit = TemperatureUnit::Celsius;
        assert_eq!(unit.toggled(), TemperatureUnit::Fahrenheit);
        assert_eq!(unit.toggled().toggled(), TemperatureUnit::Celsius);
    }

    #[test]
    fn sort_key_parses_its_own_names() {
        for key in [SortKey::Date, SortKey::HighTemp, SortKey::LowTemp, SortKey::Precipitation] {
            let parsed: SortKey = key.as_str().parse().expect("own name must parse");
            assert_eq!(key, parsed);
        }
        assert_eq!("high-temp".parse::<SortKey>(), Ok(SortKey::HighTemp));
    }

    #[test]
    fn unknown_sort_key_lists_choices() {
        let err = "wind".parse::<SortKey>().unwrap_err();
        assert!(err.to_string().contains("highTemp"));
    }

    #[test]
    fn metric_filters_toggle_one_flag() {
        let mut filters = MetricFilters::default();
        filters.toggle(Metric::Pressure);

        assert!(!filters.is_enabled(Metric::Pressure));
        assert!(filters.is_enabled(Metric::Wind));
        assert!(filters.is_enabled(Metric::Humidity));
        assert!(filters.is_enabled(Metric::Uv));
    }

    #[test]
    fn failed_status_serializes_with_reason() {
        let json = serde_json::to_value(FetchStatus::Failed("boom".into())).expect("serialize");
        assert_eq!(json, serde_json::json!({ "state": "Failed", "reason": "boom" }));
    }
}
