//! Error types for text2time operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Text2TimeError {
    #[error("Unrecognized phrase: {0}")]
    Unrecognized(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}

pub type Result<T> = std::result::Result<T, Text2TimeError>;
