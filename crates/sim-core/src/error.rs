//! Shared error type for configuration and parsing problems.
//!
//! Each `sim-*` crate keeps its own error enum for its own failure modes;
//! `CoreError` covers what every layer can hit (bad config values, parse
//! failures, I/O).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
