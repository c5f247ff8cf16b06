//! Error types for recomendar operations.
//!
//! Every failure class a caller can observe is a variant here. Scoring
//! paths degrade instead of erroring wherever the contract allows it, so
//! most variants surface from training and feed ingestion.

use thiserror::Error;

/// Main error type for recomendar operations.
///
/// # Examples
///
/// ```
/// use recomendar::error::RecomendarError;
///
/// let err = RecomendarError::data_validation("review 3 has an empty user_id");
/// assert!(err.to_string().contains("empty user_id"));
/// ```
#[derive(Debug, Error)]
pub enum RecomendarError {
    /// A required feed field is missing or malformed. Training aborts and
    /// no partial model is produced.
    #[error("data validation failed: {message}")]
    DataValidation {
        /// What was wrong with the feed row
        message: String,
    },

    /// A fitted model or index was requested but has never been trained.
    #[error("{what} has not been trained")]
    ModelUnavailable {
        /// Which model was asked for
        what: String,
    },

    /// A query referenced a business absent from the content index.
    #[error("business {business_id} is not indexed")]
    UnknownEntity {
        /// The id that could not be resolved
        business_id: String,
    },

    /// Training was attempted below the minimum volume threshold. Prior
    /// models remain in effect.
    #[error("insufficient data: {message}")]
    InsufficientData {
        /// Which threshold was not met
        message: String,
    },

    /// A retrain was requested while another one is still running.
    #[error("a training run is already in progress")]
    TrainingInProgress,

    /// I/O error from the feed layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse error from the feed layer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RecomendarError {
    /// Create a data validation error.
    #[must_use]
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a model unavailable error.
    #[must_use]
    pub fn model_unavailable(what: impl Into<String>) -> Self {
        Self::ModelUnavailable { what: what.into() }
    }

    /// Create an unknown entity error.
    #[must_use]
    pub fn unknown_entity(business_id: impl Into<String>) -> Self {
        Self::UnknownEntity {
            business_id: business_id.into(),
        }
    }

    /// Create an insufficient data error.
    #[must_use]
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, RecomendarError>;
