//! Shared test data for unit tests.

use chrono::NaiveDate;

use crate::{
    model::{Condition, ForecastDay, HourlyEntry, Temperature, WeatherSnapshot},
    provider::weatherapi::parse_forecast,
};

pub const PARIS_FORECAST_JSON: &str = include_str!("../tests/fixtures/forecast_paris.json");

pub fn paris_snapshot() -> WeatherSnapshot {
    parse_forecast(PARIS_FORECAST_JSON).expect("Paris fixture must parse")
}

/// A forecast day with only the fields the sorter looks at filled in meaningfully.
pub fn day(date: &str, max_c: f64, min_c: f64, chance_of_rain: u8) -> ForecastDay {
    let to_f = |c: f64| c * 9.0 / 5.0 + 32.0;

    ForecastDay {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid fixture date"),
        max_temp: Temperature::new(max_c, to_f(max_c)),
        min_temp: Temperature::new(min_c, to_f(min_c)),
        condition: Condition { text: "Sunny".into(), icon: "//cdn/113.png".into() },
        chance_of_rain,
        max_wind_kph: 10.0,
        avg_humidity: 60.0,
        sunrise: "06:00 AM".into(),
        sunset: "09:00 PM".into(),
        hours: Vec::<HourlyEntry>::new(),
    }
}
