// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Resumatch

use thiserror::Error;

/// Result type alias for Resumatch operations
pub type Result<T> = std::result::Result<T, ResumatchError>;

/// Resumatch error types
#[derive(Error, Debug)]
pub enum ResumatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Analysis of {file_name} timed out")]
    Timeout { file_name: String },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<lopdf::Error> for ResumatchError {
    fn from(e: lopdf::Error) -> Self {
        ResumatchError::Pdf(e.to_string())
    }
}
