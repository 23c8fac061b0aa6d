// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Resume files and job description collected before an analysis run

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Result;

/// File extensions offered by the picker. A hint only, never enforced on explicit files.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// A resume held in memory, ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    name: String,
    bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a resume from disk, named after its final path component
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size as shown in the file list, e.g. "12.34 KB"
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size() as f64 / 1024.0)
    }

    /// MIME type guessed from the extension
    pub fn mime_type(&self) -> &'static str {
        match extension(&self.name).as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            _ => "application/octet-stream",
        }
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Whether a file name matches the picker's filter hint
pub fn is_accepted(name: &str) -> bool {
    extension(name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Expand CLI paths: files are taken as given, directories contribute accepted files
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .filter(|p| p.file_name().and_then(|n| n.to_str()).map(is_accepted).unwrap_or(false))
                .collect();
            found.sort();
            debug!("Found {} resumes in {:?}", found.len(), path);
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

/// Change notification carrying the full new state of one input
#[derive(Debug, Clone, PartialEq)]
pub enum InputChange {
    Files(Vec<ResumeFile>),
    JobDescription(String),
}

/// Selected files and job description text.
///
/// Every mutation returns an [`InputChange`] with the complete new value, which the
/// owner forwards to the controller.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    files: Vec<ResumeFile>,
    job_description: String,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ResumeFile] {
        &self.files
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn job_description_chars(&self) -> usize {
        self.job_description.chars().count()
    }

    /// Append files chosen in the picker
    pub fn add_picked(&mut self, files: Vec<ResumeFile>) -> InputChange {
        self.files.extend(files);
        InputChange::Files(self.files.clone())
    }

    /// Append files dropped on the upload area; the hover highlight lives in the page script
    pub fn add_dropped(&mut self, files: Vec<ResumeFile>) -> InputChange {
        self.add_picked(files)
    }

    /// Remove the file at `index`; out of range leaves the list untouched
    pub fn remove(&mut self, index: usize) -> InputChange {
        if index < self.files.len() {
            let removed = self.files.remove(index);
            debug!("Removed {} from selection", removed.name());
        }
        InputChange::Files(self.files.clone())
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) -> InputChange {
        self.job_description = text.into();
        InputChange::JobDescription(self.job_description.clone())
    }

    /// Mirrors the analyze button's enabled state
    pub fn can_analyze(&self, loading: bool) -> bool {
        !self.files.is_empty() && !self.job_description.is_empty() && !loading
    }

    pub fn analyze_label(&self, loading: bool) -> String {
        if loading {
            return "Analyzing Resumes...".to_string();
        }
        let n = self.files.len();
        format!("Analyze {} Resume{}", n, if n == 1 { "" } else { "s" })
    }
}
