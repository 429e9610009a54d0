use std::fmt;

use reqwest::StatusCode;

/// The five outbound calls a run can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Now,
    Hourly,
    Warning,
    Air,
    Webhook,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Now => "current conditions",
            Endpoint::Hourly => "hourly forecast",
            Endpoint::Warning => "weather warnings",
            Endpoint::Air => "air quality",
            Endpoint::Webhook => "webhook",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single network call. Every variant is terminal for a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{endpoint} request failed")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse {endpoint} response")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Error::Transport { endpoint, .. }
            | Error::Status { endpoint, .. }
            | Error::Decode { endpoint, .. } => *endpoint,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
