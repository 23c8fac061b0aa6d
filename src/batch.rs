// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Batch analysis: fan files out to the analyzer, collect and rank the results

use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::ResumeAnalyzer;
use crate::config::ServiceConfig;
use crate::model::ResumeResult;
use crate::upload::ResumeFile;
use crate::{ResumatchError, Result};

/// Owner side of a batch cancellation
pub struct Cancellation {
    tx: watch::Sender<bool>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Cancel every request holding a signal from this handle
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal(self.tx.subscribe())
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Request side of a batch cancellation
#[derive(Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancelled; pending forever if the owner is gone
    pub async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Outcome of one file in a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub outcome: Result<ResumeResult>,
}

/// Sends every file of a batch to the analyzer
pub struct BatchOrchestrator {
    analyzer: Arc<dyn ResumeAnalyzer>,
    max_concurrency: usize,
    request_timeout: Option<Duration>,
}

impl BatchOrchestrator {
    /// Unbounded concurrency, no deadline
    pub fn new(analyzer: Arc<dyn ResumeAnalyzer>) -> Self {
        Self {
            analyzer,
            max_concurrency: 0,
            request_timeout: None,
        }
    }

    pub fn from_config(analyzer: Arc<dyn ResumeAnalyzer>, config: &ServiceConfig) -> Self {
        Self::new(analyzer)
            .with_max_concurrency(config.max_concurrency)
            .with_request_timeout(config.request_timeout())
    }

    /// Cap on simultaneous requests (0 means one request per file at once)
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn limit_for(&self, files: usize) -> usize {
        match self.max_concurrency {
            0 => files.max(1),
            n => n.min(files.max(1)),
        }
    }

    /// Analyze every file; the first failure fails the whole batch.
    ///
    /// Results come back ranked by overall score, highest first.
    pub async fn analyze_all(
        &self,
        files: &[ResumeFile],
        job_description: &str,
        cancel: &CancelSignal,
    ) -> Result<Vec<ResumeResult>> {
        check_batch(files, job_description)?;
        let limit = self.limit_for(files.len());
        info!("Analyzing {} resumes ({} at a time)", files.len(), limit);

        // futures are built up front so the stream holds no borrowing closure
        let requests: Vec<_> = files
            .iter()
            .map(|file| self.analyze_one(file, job_description, cancel.clone()))
            .collect();

        let results: Vec<ResumeResult> = stream::iter(requests)
            .buffered(limit)
            .try_collect()
            .await?;

        Ok(rank_results(results))
    }

    /// Analyze every file and report each outcome separately, in input order
    pub async fn analyze_each(
        &self,
        files: &[ResumeFile],
        job_description: &str,
        cancel: &CancelSignal,
    ) -> Result<Vec<FileOutcome>> {
        check_batch(files, job_description)?;
        let limit = self.limit_for(files.len());
        info!("Analyzing {} resumes individually ({} at a time)", files.len(), limit);

        let requests: Vec<_> = files
            .iter()
            .map(|file| {
                let request = self.analyze_one(file, job_description, cancel.clone());
                async move {
                    FileOutcome {
                        file_name: file.name().to_string(),
                        outcome: request.await,
                    }
                }
            })
            .collect();

        let outcomes: Vec<FileOutcome> = stream::iter(requests)
            .buffered(limit)
            .collect()
            .await;

        Ok(outcomes)
    }

    async fn analyze_one(
        &self,
        file: &ResumeFile,
        job_description: &str,
        mut cancel: CancelSignal,
    ) -> Result<ResumeResult> {
        if cancel.is_cancelled() {
            return Err(ResumatchError::Cancelled);
        }

        debug!("Analyzing {}", file.name());
        let request = self.analyzer.analyze(file, job_description);

        let bounded = async {
            match self.request_timeout {
                Some(limit) => match tokio::time::timeout(limit, request).await {
                    Ok(result) => result,
                    Err(_) => Err(ResumatchError::Timeout {
                        file_name: file.name().to_string(),
                    }),
                },
                None => request.await,
            }
        };

        let outcome = tokio::select! {
            result = bounded => result,
            _ = cancel.cancelled() => Err(ResumatchError::Cancelled),
        };

        match outcome {
            Ok(result) => {
                info!("{}: overall score {}", file.name(), result.overall_score);
                Ok(ResumeResult::new(file.name(), result))
            }
            Err(e) => {
                warn!("Analysis of {} failed: {}", file.name(), e);
                Err(e)
            }
        }
    }
}

fn check_batch(files: &[ResumeFile], job_description: &str) -> Result<()> {
    if files.is_empty() {
        return Err(ResumatchError::Validation("No resumes to analyze".to_string()));
    }
    if job_description.is_empty() {
        return Err(ResumatchError::Validation("Job description is empty".to_string()));
    }
    Ok(())
}

/// Sort by overall score, highest first. Ties keep their order; NaN sorts last.
pub fn rank_results(mut results: Vec<ResumeResult>) -> Vec<ResumeResult> {
    fn key(score: f64) -> f64 {
        if score.is_nan() { f64::NEG_INFINITY } else { score }
    }
    results.sort_by(|a, b| key(b.overall_score()).total_cmp(&key(a.overall_score())));
    results
}
