//! Application-level error types.
//!
//! Library crates keep their own error enums (the weather core has
//! `WeatherError`); this module covers configuration and local storage and
//! provides user-friendly messages for the CLI.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for display.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Database/storage errors (SQLite, saved addresses).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to access saved addresses. Check the database path."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Corruption(_) => {
                "Saved addresses may be corrupted. Consider deleting the database."
            }
            DatabaseError::NotFound(_) => "No matching saved address.",
            DatabaseError::InvalidData(_) => "The address could not be saved. Check your input.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound(self.to_string()),
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}
