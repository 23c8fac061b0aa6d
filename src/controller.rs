// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Application state and the analyze workflow

use serde::Serialize;
use tracing::{error, info, warn};

use crate::batch::{BatchOrchestrator, CancelSignal, FileOutcome};
use crate::config::{AppConfig, FailurePolicy};
use crate::model::ResumeResult;
use crate::theme::{Theme, ThemeState};
use crate::upload::{InputChange, InputState, ResumeFile};
use crate::{ResumatchError, Result};

pub const MISSING_INPUT_MESSAGE: &str =
    "Please upload at least one resume and enter a job description";

pub const ANALYSIS_FAILED_MESSAGE: &str = "An error occurred during analysis. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A file that failed when running with [`FailurePolicy::Partial`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub file_name: String,
    pub message: String,
}

/// Snapshot of the inputs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub files: Vec<ResumeFile>,
    pub job_description: String,
    pub policy: FailurePolicy,
}

impl AnalysisRequest {
    /// Run the batch according to the request's failure policy
    pub async fn run(&self, orchestrator: &BatchOrchestrator, cancel: &CancelSignal) -> Result<AnalysisOutcome> {
        match self.policy {
            FailurePolicy::AllOrNothing => orchestrator
                .analyze_all(&self.files, &self.job_description, cancel)
                .await
                .map(AnalysisOutcome::Complete),
            FailurePolicy::Partial => orchestrator
                .analyze_each(&self.files, &self.job_description, cancel)
                .await
                .map(AnalysisOutcome::PerFile),
        }
    }
}

/// What a finished batch produced
#[derive(Debug)]
pub enum AnalysisOutcome {
    Complete(Vec<ResumeResult>),
    PerFile(Vec<FileOutcome>),
}

/// Owns everything the UI shows: inputs, results, loading and error flags, theme
pub struct AppController {
    files: Vec<ResumeFile>,
    job_description: String,
    results: Vec<ResumeResult>,
    failures: Vec<FileFailure>,
    loading: bool,
    error: Option<String>,
    phase: AnalysisPhase,
    max_file_size: Option<u64>,
    policy: FailurePolicy,
    theme: ThemeState,
}

impl AppController {
    pub fn new(config: &AppConfig, theme: ThemeState) -> Self {
        Self {
            files: Vec::new(),
            job_description: String::new(),
            results: Vec::new(),
            failures: Vec::new(),
            loading: false,
            error: None,
            phase: AnalysisPhase::Idle,
            max_file_size: config.upload.max_file_size_bytes,
            policy: config.analysis.failure_policy,
            theme,
        }
    }

    pub fn files(&self) -> &[ResumeFile] {
        &self.files
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// Ranked results of the last successful run
    pub fn results(&self) -> &[ResumeResult] {
        &self.results
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    pub fn find_result(&self, id: &uuid::Uuid) -> Option<&ResumeResult> {
        self.results.iter().find(|r| &r.id == id)
    }

    /// Take an input change; stale results and errors are cleared
    pub fn apply(&mut self, change: InputChange) {
        match change {
            InputChange::Files(files) => self.files = files,
            InputChange::JobDescription(text) => self.job_description = text,
        }
        self.results.clear();
        self.failures.clear();
        self.error = None;
        if !self.loading {
            self.phase = AnalysisPhase::Idle;
        }
    }

    /// Check the inputs without touching state
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() || self.job_description.is_empty() {
            return Err(ResumatchError::Validation(MISSING_INPUT_MESSAGE.to_string()));
        }

        if let Some(limit) = self.max_file_size {
            if let Some(big) = self.files.iter().find(|f| f.size() > limit) {
                return Err(ResumatchError::Validation(format!(
                    "{} is {}, larger than the {:.0} MB limit per file",
                    big.name(),
                    big.size_label(),
                    limit as f64 / (1024.0 * 1024.0)
                )));
            }
        }

        Ok(())
    }

    /// Validate and enter the loading state; returns what to analyze.
    ///
    /// On a validation failure the message is shown and nothing else changes.
    pub fn begin_analysis(&mut self) -> Result<AnalysisRequest> {
        if let Err(e) = self.validate() {
            self.error = Some(e.to_string());
            self.phase = AnalysisPhase::Failed;
            return Err(e);
        }

        self.loading = true;
        self.error = None;
        self.phase = AnalysisPhase::Loading;

        Ok(AnalysisRequest {
            files: self.files.clone(),
            job_description: self.job_description.clone(),
            policy: self.policy,
        })
    }

    /// Record the batch outcome; always leaves the loading state
    pub fn finish_analysis(&mut self, outcome: Result<AnalysisOutcome>) {
        self.loading = false;

        match outcome {
            Ok(AnalysisOutcome::Complete(results)) => {
                info!("Analysis complete: {} resumes ranked", results.len());
                self.results = results;
                self.failures.clear();
                self.phase = AnalysisPhase::Succeeded;
            }
            Ok(AnalysisOutcome::PerFile(outcomes)) => self.finish_per_file(outcomes),
            Err(e) => {
                error!("Error during analysis: {}", e);
                self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                self.phase = AnalysisPhase::Failed;
            }
        }
    }

    fn finish_per_file(&mut self, outcomes: Vec<FileOutcome>) {
        let mut results = Vec::new();
        let mut failures = Vec::new();

        for FileOutcome { file_name, outcome } in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Skipping {}: {}", file_name, e);
                    failures.push(FileFailure {
                        file_name,
                        message: e.to_string(),
                    });
                }
            }
        }

        if results.is_empty() {
            error!("Every resume in the batch failed ({} files)", failures.len());
            self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
            self.phase = AnalysisPhase::Failed;
        } else {
            info!("Analysis complete: {} ranked, {} failed", results.len(), failures.len());
            self.phase = AnalysisPhase::Succeeded;
        }

        self.results = crate::batch::rank_results(results);
        self.failures = failures;
    }

    /// The full analyze cycle: validate, run the batch, store the outcome
    pub async fn analyze(&mut self, orchestrator: &BatchOrchestrator, cancel: &CancelSignal) -> Result<()> {
        let request = self.begin_analysis()?;
        let outcome = request.run(orchestrator, cancel).await;
        self.finish_analysis(outcome);
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn theme_class(&self) -> &'static str {
        self.theme.css_class()
    }

    /// Flip light/dark and persist the choice
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.theme.toggle()?;
        info!("Theme switched to {:?}", theme);
        Ok(theme)
    }
}

/// The input holder wired to the controller: every input change reaches the controller
pub struct Session {
    pub input: InputState,
    pub controller: AppController,
}

impl Session {
    pub fn new(config: &AppConfig, theme: ThemeState) -> Self {
        Self {
            input: InputState::new(),
            controller: AppController::new(config, theme),
        }
    }

    pub fn add_picked(&mut self, files: Vec<ResumeFile>) {
        let change = self.input.add_picked(files);
        self.controller.apply(change);
    }

    pub fn add_dropped(&mut self, files: Vec<ResumeFile>) {
        let change = self.input.add_dropped(files);
        self.controller.apply(change);
    }

    pub fn remove_file(&mut self, index: usize) {
        let change = self.input.remove(index);
        self.controller.apply(change);
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        let change = self.input.set_job_description(text);
        self.controller.apply(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::test_support::{files, MockAnalyzer};
    use crate::theme::ThemeStore;
    use std::sync::Arc;

    struct Fixture {
        _dir: tempfile::TempDir,
        controller: AppController,
    }

    fn fixture(config: AppConfig) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let theme = ThemeState::init_with(ThemeStore::new(dir.path().join("prefs.json")), || false);
        Fixture {
            controller: AppController::new(&config, theme),
            _dir: dir,
        }
    }

    fn orchestrator(mock: MockAnalyzer) -> (Arc<MockAnalyzer>, BatchOrchestrator) {
        let mock = Arc::new(mock);
        (mock.clone(), BatchOrchestrator::new(mock))
    }

    #[tokio::test]
    async fn test_missing_job_description_sends_nothing() {
        let mut fx = fixture(AppConfig::default());
        let (mock, batch) = orchestrator(MockAnalyzer::new(&[]));
        fx.controller.apply(InputChange::Files(files(&["alice.pdf"])));

        let err = fx.controller.analyze(&batch, &CancelSignal::never()).await.unwrap_err();

        assert!(matches!(err, ResumatchError::Validation(_)));
        assert_eq!(fx.controller.error(), Some(MISSING_INPUT_MESSAGE));
        assert!(!fx.controller.is_loading());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_files_sends_nothing() {
        let mut fx = fixture(AppConfig::default());
        let (mock, batch) = orchestrator(MockAnalyzer::new(&[]));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));

        assert!(fx.controller.analyze(&batch, &CancelSignal::never()).await.is_err());
        assert_eq!(fx.controller.error(), Some(MISSING_INPUT_MESSAGE));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_replaces_results() {
        let mut fx = fixture(AppConfig::default());
        let (_, batch) = orchestrator(MockAnalyzer::new(&[("alice.pdf", 6.0), ("bob.pdf", 9.0)]));
        fx.controller.apply(InputChange::Files(files(&["alice.pdf", "bob.pdf"])));
        fx.controller.apply(InputChange::JobDescription("Senior Backend Engineer...".to_string()));

        fx.controller.analyze(&batch, &CancelSignal::never()).await.unwrap();

        let names: Vec<_> = fx.controller.results().iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["bob.pdf", "alice.pdf"]);
        assert_eq!(fx.controller.phase(), AnalysisPhase::Succeeded);
        assert!(!fx.controller.is_loading());
        assert_eq!(fx.controller.error(), None);
    }

    #[tokio::test]
    async fn test_failure_sets_generic_error() {
        let mut fx = fixture(AppConfig::default());
        let (_, batch) = orchestrator(MockAnalyzer::new(&[("a.pdf", 8.0)]).failing("b.pdf"));
        fx.controller.apply(InputChange::Files(files(&["a.pdf", "b.pdf"])));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));

        fx.controller.analyze(&batch, &CancelSignal::never()).await.unwrap();

        assert_eq!(fx.controller.error(), Some(ANALYSIS_FAILED_MESSAGE));
        assert!(fx.controller.results().is_empty());
        assert!(!fx.controller.is_loading());
        assert_eq!(fx.controller.phase(), AnalysisPhase::Failed);
    }

    #[tokio::test]
    async fn test_partial_policy_keeps_successes() {
        let mut config = AppConfig::default();
        config.analysis.failure_policy = FailurePolicy::Partial;
        let mut fx = fixture(config);
        let (_, batch) = orchestrator(MockAnalyzer::new(&[("a.pdf", 4.0), ("c.pdf", 9.0)]).failing("b.pdf"));
        fx.controller.apply(InputChange::Files(files(&["a.pdf", "b.pdf", "c.pdf"])));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));

        fx.controller.analyze(&batch, &CancelSignal::never()).await.unwrap();

        let names: Vec<_> = fx.controller.results().iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["c.pdf", "a.pdf"]);
        assert_eq!(fx.controller.failures().len(), 1);
        assert_eq!(fx.controller.failures()[0].file_name, "b.pdf");
        assert_eq!(fx.controller.error(), None);
    }

    #[tokio::test]
    async fn test_partial_policy_all_failed() {
        let mut config = AppConfig::default();
        config.analysis.failure_policy = FailurePolicy::Partial;
        let mut fx = fixture(config);
        let (_, batch) = orchestrator(MockAnalyzer::new(&[]).failing("a.pdf"));
        fx.controller.apply(InputChange::Files(files(&["a.pdf"])));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));

        fx.controller.analyze(&batch, &CancelSignal::never()).await.unwrap();
        assert_eq!(fx.controller.error(), Some(ANALYSIS_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_input_change_clears_results_and_error() {
        let mut fx = fixture(AppConfig::default());
        let (_, batch) = orchestrator(MockAnalyzer::new(&[]));
        fx.controller.apply(InputChange::Files(files(&["a.pdf"])));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));
        fx.controller.analyze(&batch, &CancelSignal::never()).await.unwrap();
        assert_eq!(fx.controller.results().len(), 1);

        fx.controller.apply(InputChange::JobDescription("Engineer II".to_string()));
        assert!(fx.controller.results().is_empty());
        assert_eq!(fx.controller.phase(), AnalysisPhase::Idle);

        fx.controller.apply(InputChange::Files(Vec::new()));
        let _ = fx.controller.begin_analysis();
        assert!(fx.controller.error().is_some());
        fx.controller.apply(InputChange::Files(files(&["a.pdf"])));
        assert_eq!(fx.controller.error(), None);
    }

    #[test]
    fn test_loading_flag_lifecycle() {
        let mut fx = fixture(AppConfig::default());
        fx.controller.apply(InputChange::Files(files(&["a.pdf"])));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));

        let request = fx.controller.begin_analysis().unwrap();
        assert!(fx.controller.is_loading());
        assert_eq!(fx.controller.phase(), AnalysisPhase::Loading);
        assert_eq!(request.files.len(), 1);

        fx.controller.finish_analysis(Err(ResumatchError::Cancelled));
        assert!(!fx.controller.is_loading());
    }

    #[test]
    fn test_size_guideline() {
        let mut config = AppConfig::default();
        config.upload.max_file_size_bytes = Some(10);
        let mut fx = fixture(config);
        fx.controller.apply(InputChange::Files(vec![ResumeFile::new("huge.pdf", vec![0; 11])]));
        fx.controller.apply(InputChange::JobDescription("Engineer".to_string()));

        let err = fx.controller.begin_analysis().unwrap_err();
        assert!(err.to_string().starts_with("huge.pdf"));
        assert!(!fx.controller.is_loading());
    }

    #[test]
    fn test_toggle_theme_twice() {
        let mut fx = fixture(AppConfig::default());
        assert_eq!(fx.controller.theme(), Theme::Light);

        assert_eq!(fx.controller.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(fx.controller.theme_class(), "dark");
        assert_eq!(fx.controller.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(fx.controller.theme_class(), "");
    }

    #[tokio::test]
    async fn test_session_forwards_every_change() {
        let dir = tempfile::tempdir().unwrap();
        let theme = ThemeState::init_with(ThemeStore::new(dir.path().join("prefs.json")), || false);
        let mut session = Session::new(&AppConfig::default(), theme);
        let (_, batch) = orchestrator(MockAnalyzer::new(&[("a.pdf", 2.0), ("b.pdf", 8.0)]));

        session.add_picked(files(&["a.pdf", "x.pdf"]));
        session.add_dropped(files(&["b.pdf"]));
        session.remove_file(1);
        session.set_job_description("Engineer");

        let names: Vec<_> = session.controller.files().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(session.controller.job_description(), "Engineer");

        session.controller.analyze(&batch, &CancelSignal::never()).await.unwrap();
        assert_eq!(session.controller.results()[0].file_name, "b.pdf");

        session.remove_file(0);
        assert!(session.controller.results().is_empty());
    }
}
