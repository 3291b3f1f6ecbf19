//! Error types for the scrim statistics pipeline

use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrimError>;

#[derive(Error, Debug)]
pub enum ScrimError {
    #[error("Match {match_id} is missing required field `{field}`")]
    MissingField { match_id: String, field: String },

    #[error("Match {match_id} has an invalid `{field}` value: {value}")]
    InvalidField {
        match_id: String,
        field: String,
        value: String,
    },

    #[error("Cannot parse a ddmmyyyy date from file name `{file_name}`")]
    DateToken { file_name: String },

    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    #[error("Unknown side: {side}")]
    UnknownSide { side: String },

    #[error("Match {match_id} does not have exactly one winning side")]
    InconsistentOutcome { match_id: String },

    #[error("Row-set has no `{column}` column to match the team dictionary against")]
    TeamSchema { column: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data frame operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}
