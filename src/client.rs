// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTTP client for the remote resume analysis service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::model::{AnalysisResponse, ResumeAnalysisResult};
use crate::upload::ResumeFile;
use crate::{ResumatchError, Result};

/// Anything that can score one resume against a job description
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, file: &ResumeFile, job_description: &str) -> Result<ResumeAnalysisResult>;
}

/// Analysis service client
pub struct AnalysisClient {
    client: Client,
    endpoint: String,
}

impl AnalysisClient {
    /// Create a new client for the given endpoint URL
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check that the service host answers at all
    pub async fn health_check(&self) -> Result<()> {
        let origin = service_origin(&self.endpoint);

        self.client
            .get(&origin)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                ResumatchError::Server(format!(
                    "Cannot connect to analysis service at {}: {}",
                    origin, e
                ))
            })?;

        Ok(())
    }
}

#[async_trait]
impl ResumeAnalyzer for AnalysisClient {
    async fn analyze(&self, file: &ResumeFile, job_description: &str) -> Result<ResumeAnalysisResult> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())?;

        let form = Form::new()
            .part("resume", part)
            .text("jobDescription", job_description.to_string());

        debug!("Submitting {} ({} bytes) to {}", file.name(), file.size(), self.endpoint);

        let response = self.client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ResumatchError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalysisResponse = serde_json::from_str(&body)?;
        Ok(parsed.result)
    }
}

/// Scheme and authority of a URL, e.g. `http://localhost:3001`
fn service_origin(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(_) => url.to_string(),
    }
}
