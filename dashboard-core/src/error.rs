use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between committing a search and holding a snapshot.
///
/// The controller turns every variant except [`FetchError::EmptyQuery`] into
/// a `FetchStatus::Failed` message; nothing here reaches the renderer as a panic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced an HTTP response.
    #[error("Could not reach the weather service: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("Weather service returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Weather service did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The body was not the forecast document we expect.
    #[error("Unexpected response from weather service: {0}")]
    Decode(String),

    /// Blank search text. Ignored by the controller, never displayed.
    #[error("Search text is empty")]
    EmptyQuery,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Returned when a display option is spelled in a way we don't know.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'. Expected one of: {expected}.")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Cut a provider body down to something fit for a one-line error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
