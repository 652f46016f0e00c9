//! Plain-text rendering of a projected dashboard.

use std::fmt::Write;

use dashboard_core::{
    AppState, DashboardView, FetchStatus, project,
    projector::{CurrentCard, ForecastCard, HourlyCard},
};

pub fn render_dashboard(view: &DashboardView, days: u8) -> String {
    let mut out = String::new();
    let unit = view.unit.symbol();

    if !view.alerts.is_empty() {
        let _ = writeln!(out, "Weather Alerts");
        for alert in &view.alerts {
            let _ = writeln!(out, "  {} - {}", alert.headline, alert.description);
        }
        out.push('\n');
    }

    render_current(&mut out, &view.current, unit);

    if !view.hourly.is_empty() {
        let _ = writeln!(out, "\nHourly Forecast");
        for hour in &view.hourly {
            render_hour(&mut out, hour, unit);
        }
    }

    let _ = writeln!(out, "\n{days}-Day Forecast");
    for day in &view.forecast {
        render_day(&mut out, day, unit);
    }

    out
}

fn render_current(out: &mut String, card: &CurrentCard, unit: &str) {
    let _ = writeln!(out, "Current Weather in {}", card.title);
    let _ = writeln!(
        out,
        "  {}{unit}  {}  ({})",
        card.temperature,
        card.condition,
        if card.is_day { "Day" } else { "Night" }
    );

    for reading in &card.metrics {
        let metric = reading.metric;
        let _ = writeln!(out, "  {}: {}{}", metric.label(), reading.value, metric.suffix());
    }

    if let Some(details) = &card.details {
        let _ = writeln!(out, "  Region: {}", details.region);
        let _ = writeln!(out, "  Local Time: {}", details.local_time);
        let _ = writeln!(out, "  Last Updated: {}", details.last_updated);
        let _ = writeln!(out, "  Feels Like: {}{unit}", details.feels_like);
        if let Some(dewpoint) = details.dewpoint {
            let _ = writeln!(out, "  Dewpoint: {dewpoint}{unit}");
        }
        if let Some(windchill) = details.windchill {
            let _ = writeln!(out, "  Windchill: {windchill}{unit}");
        }
        let _ = writeln!(out, "  Precipitation: {} mm", details.precip_mm);
        let _ = writeln!(out, "  Visibility: {} km", details.visibility_km);
        if let Some(aqi) = details.air_quality_index {
            let _ = writeln!(out, "  Air Quality (AQI): {aqi}");
        }
    }
}

fn render_hour(out: &mut String, hour: &HourlyCard, unit: &str) {
    let _ = writeln!(
        out,
        "  {:>8}  {:>6}  {:<24} rain {}%",
        hour.time.format("%-I:%M %p").to_string(),
        format!("{}{unit}", hour.temperature),
        hour.condition,
        hour.chance_of_rain
    );
}

fn render_day(out: &mut String, day: &ForecastCard, unit: &str) {
    let _ = writeln!(out, "  {}  {}", day.date.format("%A, %b %-d"), day.condition);
    let _ = writeln!(
        out,
        "    High: {}{unit}  Low: {}{unit}  Precipitation: {}%  Wind: {} kph  Humidity: {}%",
        day.high, day.low, day.chance_of_rain, day.max_wind_kph, day.avg_humidity
    );
    let _ = writeln!(out, "    Sunrise: {}  Sunset: {}", day.sunrise, day.sunset);
}

/// What the watch session prints for a state, if anything.
pub fn render_state(state: &AppState) -> Option<String> {
    match &state.status {
        FetchStatus::Idle => None,
        FetchStatus::Loading => {
            let location = state.query.as_ref().map(|q| q.location()).unwrap_or_default();
            Some(format!("Searching for {location}..."))
        }
        FetchStatus::Failed(reason) => Some(format!("Error: {reason}")),
        FetchStatus::Success => state.snapshot.as_ref().map(|snapshot| {
            let view = project(snapshot, &state.options, state.forecast_days.into());
            render_dashboard(&view, state.forecast_days)
        }),
    }
}
