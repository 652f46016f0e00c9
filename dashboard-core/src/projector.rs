//! Pure derivation of what to render from a snapshot and the display options.
//!
//! Nothing in here performs I/O or keeps state; the same inputs always give the
//! same [`DashboardView`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    backdrop::{Backdrop, resolve_backdrop},
    model::{
        Alert, CurrentConditions, DisplayOptions, ForecastDay, HourlyEntry, Metric, MetricFilters,
        SortKey, TemperatureUnit, WeatherSnapshot,
    },
};

/// Pick the provider value for the active unit. No arithmetic happens here.
pub fn select_temperature(celsius: f64, fahrenheit: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => fahrenheit,
    }
}

/// Truncate to `count` days, then order by `sort_key`.
///
/// Temperature and precipitation keys sort descending. The sort is stable, so
/// ties keep provider (date) order.
pub fn sort_forecast(
    days: &[ForecastDay],
    count: usize,
    sort_key: SortKey,
    unit: TemperatureUnit,
) -> Vec<&ForecastDay> {
    let mut pool: Vec<&ForecastDay> = days.iter().take(count).collect();

    let key: fn(&ForecastDay, TemperatureUnit) -> f64 = match sort_key {
        SortKey::Date => return pool,
        SortKey::HighTemp => |d: &ForecastDay, unit| d.max_temp.in_unit(unit),
        SortKey::LowTemp => |d: &ForecastDay, unit| d.min_temp.in_unit(unit),
        SortKey::Precipitation => |d: &ForecastDay, _| f64::from(d.chance_of_rain),
    };

    pool.sort_by(|a, b| key(b, unit).total_cmp(&key(a, unit)));
    pool
}

/// First `hours` entries of a day, or all of them if there are fewer.
pub fn slice_hourly(first_day: &ForecastDay, hours: usize) -> &[HourlyEntry] {
    let end = hours.min(first_day.hours.len());
    &first_day.hours[..end]
}

/// Enabled metrics, always in wind/humidity/pressure/uv order.
pub fn visible_metrics(filters: &MetricFilters) -> Vec<Metric> {
    Metric::all().iter().copied().filter(|m| filters.is_enabled(*m)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub backdrop: Backdrop,
    pub unit: TemperatureUnit,
    pub alerts: Vec<Alert>,
    pub current: CurrentCard,
    pub hourly: Vec<HourlyCard>,
    pub forecast: Vec<ForecastCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCard {
    pub title: String,
    pub temperature: f64,
    pub condition: String,
    pub icon_url: String,
    pub is_day: bool,
    pub metrics: Vec<MetricReading>,
    /// Only present while the card is expanded.
    pub details: Option<CurrentDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReading {
    pub metric: Metric,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentDetails {
    pub region: String,
    pub local_time: String,
    pub last_updated: String,
    pub feels_like: f64,
    pub dewpoint: Option<f64>,
    pub windchill: Option<f64>,
    pub precip_mm: f64,
    pub visibility_km: f64,
    pub air_quality_index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyCard {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub condition: String,
    pub icon_url: String,
    pub chance_of_rain: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastCard {
    pub date: NaiveDate,
    pub condition: String,
    pub icon_url: String,
    pub high: f64,
    pub low: f64,
    pub chance_of_rain: u8,
    pub max_wind_kph: f64,
    pub avg_humidity: f64,
    pub sunrise: String,
    pub sunset: String,
}

/// Build the full view for `days` forecast days.
pub fn project(snapshot: &WeatherSnapshot, options: &DisplayOptions, days: usize) -> DashboardView {
    let unit = options.unit;

    let hourly = snapshot
        .forecast
        .first()
        .map(|day| slice_hourly(day, options.hourly_hours))
        .unwrap_or_default()
        .iter()
        .map(|h| HourlyCard {
            time: h.time,
            temperature: h.temperature.in_unit(unit),
            condition: h.condition.text.clone(),
            icon_url: icon_url(&h.condition.icon),
            chance_of_rain: h.chance_of_rain,
        })
        .collect();

    let forecast = sort_forecast(&snapshot.forecast, days, options.sort_key, unit)
        .into_iter()
        .map(|d| ForecastCard {
            date: d.date,
            condition: d.condition.text.clone(),
            icon_url: icon_url(&d.condition.icon),
            high: d.max_temp.in_unit(unit),
            low: d.min_temp.in_unit(unit),
            chance_of_rain: d.chance_of_rain,
            max_wind_kph: d.max_wind_kph,
            avg_humidity: d.avg_humidity,
            sunrise: d.sunrise.clone(),
            sunset: d.sunset.clone(),
        })
        .collect();

    DashboardView {
        backdrop: resolve_backdrop(&snapshot.current.condition.text),
        unit,
        alerts: snapshot.alerts.clone(),
        current: current_card(snapshot, options),
        hourly,
        forecast,
    }
}

fn current_card(snapshot: &WeatherSnapshot, options: &DisplayOptions) -> CurrentCard {
    let current = &snapshot.current;
    let unit = options.unit;

    let metrics = visible_metrics(&options.metrics)
        .into_iter()
        .map(|metric| MetricReading { metric, value: metric_value(current, metric) })
        .collect();

    let details = options.details_expanded.then(|| CurrentDetails {
        region: snapshot.location.region.clone(),
        local_time: snapshot.location.localtime.clone(),
        last_updated: current.last_updated.clone(),
        feels_like: current.feels_like.in_unit(unit),
        dewpoint: current.dewpoint.map(|t| t.in_unit(unit)),
        windchill: current.windchill.map(|t| t.in_unit(unit)),
        precip_mm: current.precip_mm,
        visibility_km: current.visibility_km,
        air_quality_index: current.air_quality.as_ref().and_then(|aq| aq.us_epa_index),
    });

    CurrentCard {
        title: format!("{}, {}", snapshot.location.name, snapshot.location.country),
        temperature: current.temperature.in_unit(unit),
        condition: current.condition.text.clone(),
        icon_url: icon_url(&current.condition.icon),
        is_day: current.is_day,
        metrics,
        details,
    }
}

fn metric_value(current: &CurrentConditions, metric: Metric) -> f64 {
    match metric {
        Metric::Wind => current.wind_kph,
        Metric::Humidity => f64::from(current.humidity_pct),
        Metric::Pressure => current.pressure_mb,
        Metric::Uv => current.uv,
    }
}

/// The provider serves protocol-relative icon paths (`//cdn...`).
fn icon_url(icon: &str) -> String {
    if icon.starts_with("//") { format!("https:{icon}") } else { icon.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backdrop::DEFAULT_BACKDROP,
        fixtures::{day, paris_snapshot},
    };

    fn dates(days: &[&ForecastDay]) -> Vec<String> {
        days.iter().map(|d| d.date.to_string()).collect()
    }

    fn five_days() -> Vec<ForecastDay> {
        vec![
            day("2024-05-14", 16.0, 9.0, 20),
            day("2024-05-15", 21.0, 11.0, 80),
            day("2024-05-16", 16.0, 7.0, 20),
            day("2024-05-17", 30.0, 18.0, 90),
            day("2024-05-18", 25.0, 15.0, 0),
        ]
    }

    #[test]
    fn select_temperature_picks_the_matching_unit() {
        assert_eq!(select_temperature(20.0, 68.0, TemperatureUnit::Celsius), 20.0);
        assert_eq!(select_temperature(20.0, 68.0, TemperatureUnit::Fahrenheit), 68.0);
    }

    #[test]
    fn date_order_is_provider_order() {
        let days = five_days();
        let sorted = sort_forecast(&days, 5, SortKey::Date, TemperatureUnit::Celsius);

        assert_eq!(
            dates(&sorted),
            ["2024-05-14", "2024-05-15", "2024-05-16", "2024-05-17", "2024-05-18"]
        );
    }

    #[test]
    fn high_temp_sorts_truncated_pool_descending_and_stable() {
        let days = five_days();
        let sorted = sort_forecast(&days, 3, SortKey::HighTemp, TemperatureUnit::Celsius);

        // Day 4 (30°) is outside the 3-day pool; 14th and 16th tie at 16° and keep order.
        assert_eq!(dates(&sorted), ["2024-05-15", "2024-05-14", "2024-05-16"]);
    }

    #[test]
    fn low_temp_uses_the_active_unit() {
        let days = five_days();
        let sorted = sort_forecast(&days, 5, SortKey::LowTemp, TemperatureUnit::Fahrenheit);

        assert_eq!(
            dates(&sorted),
            ["2024-05-17", "2024-05-18", "2024-05-15", "2024-05-14", "2024-05-16"]
        );
    }

    #[test]
    fn precipitation_sorts_descending_with_stable_ties() {
        let days = five_days();
        let sorted = sort_forecast(&days, 4, SortKey::Precipitation, TemperatureUnit::Celsius);

        assert_eq!(dates(&sorted), ["2024-05-17", "2024-05-15", "2024-05-14", "2024-05-16"]);
    }

    #[test]
    fn count_larger_than_forecast_returns_everything() {
        let days = five_days();
        assert_eq!(sort_forecast(&days, 10, SortKey::Date, TemperatureUnit::Celsius).len(), 5);
        assert!(sort_forecast(&days, 0, SortKey::HighTemp, TemperatureUnit::Celsius).is_empty());
    }

    #[test]
    fn slice_hourly_takes_the_first_hours_in_order() {
        let snapshot = paris_snapshot();
        let first = &snapshot.forecast[0];
        assert_eq!(first.hours.len(), 24);

        let slice = slice_hourly(first, 12);

        assert_eq!(slice.len(), 12);
        assert_eq!(slice, &first.hours[..12]);
    }

    #[test]
    fn slice_hourly_caps_at_available_entries() {
        let snapshot = paris_snapshot();
        let first = &snapshot.forecast[0];

        assert_eq!(slice_hourly(first, 48).len(), 24);
        assert!(slice_hourly(&day("2024-05-14", 1.0, 0.0, 0), 12).is_empty());
    }

    #[test]
    fn visible_metrics_follow_filters() {
        let mut filters = MetricFilters::default();
        assert_eq!(visible_metrics(&filters), Metric::all());

        filters.set(Metric::Humidity, false);
        filters.set(Metric::Uv, false);
        assert_eq!(visible_metrics(&filters), vec![Metric::Wind, Metric::Pressure]);
    }

    #[test]
    fn projection_uses_current_temp_and_default_date_order() {
        let snapshot = paris_snapshot();
        let view = project(&snapshot, &DisplayOptions::default(), 3);

        assert_eq!(view.current.temperature, 14.0);
        assert_eq!(view.current.title, "Paris, France");
        assert_eq!(view.current.icon_url, "https://cdn.weatherapi.com/weather/64x64/day/116.png");
        assert_eq!(view.forecast.len(), 3);
        assert!(view.forecast.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(view.hourly.len(), 12);
        assert_eq!(view.alerts.len(), 1);
        assert_eq!(view.backdrop, DEFAULT_BACKDROP);
    }

    #[test]
    fn projection_respects_unit_and_sort() {
        let snapshot = paris_snapshot();
        let options = DisplayOptions {
            unit: TemperatureUnit::Fahrenheit,
            sort_key: SortKey::HighTemp,
            ..DisplayOptions::default()
        };

        let view = project(&snapshot, &options, 3);

        assert_eq!(view.current.temperature, 57.2);
        let highs: Vec<f64> = view.forecast.iter().map(|c| c.high).collect();
        assert!(highs.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(view.forecast[0].date.to_string(), "2024-05-15");
    }

    #[test]
    fn details_only_when_expanded() {
        let snapshot = paris_snapshot();
        let mut options = DisplayOptions::default();

        assert!(project(&snapshot, &options, 3).current.details.is_none());

        options.details_expanded = true;
        let details = project(&snapshot, &options, 3).current.details.expect("expanded");
        assert_eq!(details.region, "Ile-de-France");
        assert_eq!(details.feels_like, 12.9);
        assert_eq!(details.dewpoint, Some(8.9));
        assert_eq!(details.air_quality_index, Some(1));
    }

    #[test]
    fn hidden_metrics_are_not_projected() {
        let snapshot = paris_snapshot();
        let mut options = DisplayOptions::default();
        options.metrics.toggle(Metric::Wind);

        let view = project(&snapshot, &options, 3);
        let shown: Vec<Metric> = view.current.metrics.iter().map(|r| r.metric).collect();

        assert_eq!(shown, vec![Metric::Humidity, Metric::Pressure, Metric::Uv]);
        assert_eq!(view.current.metrics[0].value, 72.0);
    }

    #[test]
    fn projecting_twice_gives_the_same_view() {
        let snapshot = paris_snapshot();
        let options = DisplayOptions {
            sort_key: SortKey::Precipitation,
            details_expanded: true,
            hourly_hours: 18,
            ..DisplayOptions::default()
        };

        assert_eq!(project(&snapshot, &options, 2), project(&snapshot, &options, 2));
    }

    #[test]
    fn empty_forecast_projects_no_cards() {
        let mut snapshot = paris_snapshot();
        snapshot.forecast.clear();

        let view = project(&snapshot, &DisplayOptions::default(), 3);
        assert!(view.hourly.is_empty());
        assert!(view.forecast.is_empty());
    }
}
