//! Error types and handling for `TripPlan`

use thiserror::Error;

/// Main error type for the `TripPlan` library
#[derive(Error, Debug)]
pub enum TripPlanError {
    /// Input that the planning core cannot work with
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Malformed dates or times at a serialization boundary
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Attraction or hotel catalog failures
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Itinerary persistence failures
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON encoding or decoding errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl TripPlanError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlanError::InvalidInput { message } => format!("Invalid input: {message}"),
            TripPlanError::Parse { message } => format!("Could not parse value: {message}"),
            TripPlanError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and environment.")
            }
            TripPlanError::Catalog { message } => format!("Catalog unavailable: {message}"),
            TripPlanError::Storage { message } => {
                format!("Saving or loading the itinerary failed ({message}). Check the storage location.")
            }
            TripPlanError::Io { source } => {
                format!("File operation failed ({source}). Please check file permissions.")
            }
            TripPlanError::Serialization { source } => {
                format!("Malformed JSON data ({source}). Please check the input file.")
            }
        }
    }
}
