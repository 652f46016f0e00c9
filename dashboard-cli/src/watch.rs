//! Interactive session: every typed line is a draft search, `:` lines are commands.

use anyhow::{Context, Result};
use dashboard_core::{
    AppState, DisplayOptions, FetchStatus, Metric, QueryController, SortKey, TemperatureUnit,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};

use tracing::{debug, trace};

use crate::render::render_state;

const HELP: &str = "\
Type a place name to search (debounced), or a command:
  :go              search the current text now
  :unit [c|f]      switch or set the temperature unit
  :sort <key>      date, highTemp, lowTemp, precipitation
  :days <n>        forecast days
  :hours <n>       hourly entries to show
  :toggle <metric> wind, humidity, pressure, uv
  :more            show more / less current details
  :help            this text
  :quit            leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Draft(String),
    SearchNow,
    Unit(Option<TemperatureUnit>),
    Sort(SortKey),
    Days(u8),
    Hours(usize),
    Toggle(Metric),
    More,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Draft(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let parsed = match (name, arg) {
        ("go", None) => Ok(Input::SearchNow),
        ("unit", None) => Ok(Input::Unit(None)),
        ("unit", Some(v)) => v
            .parse::<TemperatureUnit>()
            .map(|u| Input::Unit(Some(u)))
            .map_err(|e| e.to_string()),
        ("sort", Some(v)) => v.parse::<SortKey>().map(Input::Sort).map_err(|e| e.to_string()),
        ("days", Some(v)) => {
            v.parse::<u8>().map(Input::Days).map_err(|_| format!("not a number: {v}"))
        }
        ("hours", Some(v)) => {
            v.parse::<usize>().map(Input::Hours).map_err(|_| format!("not a number: {v}"))
        }
        ("toggle", Some(v)) => {
            v.parse::<Metric>().map(Input::Toggle).map_err(|e| e.to_string())
        }
        ("more", None) => Ok(Input::More),
        ("help", None) => Ok(Input::Help),
        ("quit" | "q", None) => Ok(Input::Quit),
        _ => Err(format!("unknown command ':{command}', try :help")),
    };

    parsed.unwrap_or_else(Input::Invalid)
}

pub async fn run(controller: QueryController, location: Option<String>) -> Result<()> {
    let renderer = tokio::spawn(render_loop(controller.subscribe()));

    println!("{HELP}\n");
    match location {
        Some(location) => {
            controller.set_draft_query(location);
            controller.handle_search_now();
        }
        None => {
            controller.start();
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let input = parse_line(&line);
        debug!(?input, "watch input");
        match input {
            Input::Draft(text) => controller.set_draft_query(text),
            Input::SearchNow => {
                controller.handle_search_now();
            }
            Input::Unit(None) => controller.toggle_unit(),
            Input::Unit(Some(unit)) => controller.set_unit(unit),
            Input::Sort(key) => controller.set_sort_key(key),
            Input::Days(days) => {
                controller.set_forecast_days(days);
            }
            Input::Hours(hours) => controller.set_hourly_hours(hours),
            Input::Toggle(metric) => controller.toggle_metric(metric),
            Input::More => controller.toggle_details(),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Invalid(message) => eprintln!("{message}"),
        }
    }

    renderer.abort();
    Ok(())
}

/// The parts of the state that change what is on screen. Draft edits alone don't.
#[derive(Debug, PartialEq)]
struct Screen {
    status: FetchStatus,
    options: DisplayOptions,
    forecast_days: u8,
    fetched_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&AppState> for Screen {
    fn from(state: &AppState) -> Self {
        Self {
            status: state.status.clone(),
            options: state.options.clone(),
            forecast_days: state.forecast_days,
            fetched_at: state.snapshot.as_ref().map(|s| s.fetched_at),
        }
    }
}

async fn render_loop(mut rx: watch::Receiver<AppState>) {
    let mut last: Option<Screen> = None;

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        let screen = Screen::from(&state);
        if last.as_ref() == Some(&screen) {
            trace!("state change leaves the screen as is");
            continue;
        }
        last = Some(screen);

        if let Some(text) = render_state(&state) {
            println!("{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_drafts() {
        assert_eq!(parse_line("New York"), Input::Draft("New York".into()));
        assert_eq!(parse_line(""), Input::Draft(String::new()));
    }

    #[test]
    fn commands_parse_their_arguments() {
        assert_eq!(parse_line(":go"), Input::SearchNow);
        assert_eq!(parse_line(":unit"), Input::Unit(None));
        assert_eq!(parse_line(":unit f"), Input::Unit(Some(TemperatureUnit::Fahrenheit)));
        assert_eq!(parse_line(":sort highTemp"), Input::Sort(SortKey::HighTemp));
        assert_eq!(parse_line("  :days 2 "), Input::Days(2));
        assert_eq!(parse_line(":hours 18"), Input::Hours(18));
        assert_eq!(parse_line(":toggle uv"), Input::Toggle(Metric::Uv));
        assert_eq!(parse_line(":more"), Input::More);
        assert_eq!(parse_line(":q"), Input::Quit);
    }

    #[test]
    fn bad_commands_explain_themselves() {
        match parse_line(":sort wind") {
            Input::Invalid(msg) => assert!(msg.contains("Unknown sort key")),
            other => panic!("expected Invalid, got {other:?}"),
        }
        match parse_line(":days many") {
            Input::Invalid(msg) => assert!(msg.contains("not a number")),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert!(matches!(parse_line(":launch"), Input::Invalid(_)));
    }
}
