// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Resumatch: AI Resume Shortlisting
//!
//! Sends each uploaded resume with a job description to a remote analysis
//! service, ranks the results by overall score and presents them as text,
//! JSON, HTML or PDF reports. Ships a CLI and a web UI.

pub mod batch;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod render;
pub mod theme;
pub mod upload;
pub mod web;

pub use config::AppConfig;
pub use error::{ResumatchError, Result};
