//! Error types for geocoding and forecast lookups.

use thiserror::Error;

/// Coarse classification of a [`WeatherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or empty required input
    Input,
    Connection,
    Timeout,
    /// Non-2xx HTTP status
    Http,
    /// Zero geocoding candidates or an empty forecast body
    EmptyResult,
    Unexpected,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timed out: {message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("No results: {0}")]
    EmptyResult(String),

    #[error("Unexpected error: {message}")]
    Unexpected {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Failed to get coordinates for address '{address}': {source}")]
    Geocoding {
        address: String,
        #[source]
        source: Box<WeatherError>,
    },
}

impl WeatherError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
            source: None,
        }
    }

    /// Classify a transport failure. `what` names the operation for the message.
    pub fn from_reqwest(what: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: what.to_string(),
                source: Some(err),
            }
        } else if err.is_connect() || err.is_request() {
            Self::Connection {
                message: what.to_string(),
                source: Some(err),
            }
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: format!("{}: {}", what, err),
            }
        } else {
            Self::Unexpected {
                message: format!("{}: {}", what, err),
                source: Some(Box::new(err)),
            }
        }
    }

    /// Wrap a geocoding failure with the address that caused it.
    pub fn geocoding(address: impl Into<String>, source: WeatherError) -> Self {
        Self::Geocoding {
            address: address.into(),
            source: Box::new(source),
        }
    }

    /// The kind of the innermost failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Http { .. } => ErrorKind::Http,
            Self::EmptyResult(_) => ErrorKind::EmptyResult,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
            Self::Geocoding { source, .. } => source.kind(),
        }
    }

    /// HTTP status code, if the innermost failure was a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Geocoding { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the next geocoding provider in a chain should be tried.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Connection | ErrorKind::Timeout | ErrorKind::Http
        )
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(msg) => format!("Please check your input: {}", msg),
            Self::Connection { .. } => "Unable to connect. Check your internet connection.".to_string(),
            Self::Timeout { .. } => "The request timed out. Please try again.".to_string(),
            Self::Http { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Please try again later.".to_string()
            }
            Self::Http { status, .. } => format!("The request was rejected ({}).", status),
            Self::EmptyResult(_) => "No results found. Try a different address.".to_string(),
            Self::Unexpected { .. } => "Received an unexpected response. Please try again.".to_string(),
            Self::Geocoding { address, source } => {
                format!("Could not locate \"{}\". {}", address, source.user_message())
            }
        }
    }
}
