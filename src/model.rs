// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Analysis data returned by the remote service and the ranked results built from it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score and feedback for one assessment category (score nominally 0-10)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub score: f64,
    pub feedback: String,
}

/// Full analysis of one resume against a job description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysisResult {
    pub overall_score: f64,
    pub technical_skills: CategoryResult,
    pub work_experience: CategoryResult,
    pub relevance_to_software_engineering: CategoryResult,
    pub clarity_and_structure: CategoryResult,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ResumeAnalysisResult {
    /// Categories with their display titles, in report order
    pub fn categories(&self) -> [(&'static str, &CategoryResult); 4] {
        [
            ("Technical Skills", &self.technical_skills),
            ("Work Experience", &self.work_experience),
            ("Relevance to Role", &self.relevance_to_software_engineering),
            ("Structure & Clarity", &self.clarity_and_structure),
        ]
    }
}

/// Response envelope of the analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub result: ResumeAnalysisResult,
}

/// One analyzed resume, tagged for display and ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResult {
    pub id: Uuid,
    pub file_name: String,
    pub result: ResumeAnalysisResult,
    pub upload_time: DateTime<Utc>,
}

impl ResumeResult {
    /// Wrap a service result with a fresh id and the current time
    pub fn new(file_name: impl Into<String>, result: ResumeAnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            result,
            upload_time: Utc::now(),
        }
    }

    pub fn overall_score(&self) -> f64 {
        self.result.overall_score
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(score: f64, feedback: &str) -> CategoryResult {
        CategoryResult {
            score,
            feedback: feedback.to_string(),
        }
    }

    pub fn analysis(overall: f64) -> ResumeAnalysisResult {
        ResumeAnalysisResult {
            overall_score: overall,
            technical_skills: category(overall, "Solid Rust and Go background"),
            work_experience: category(overall, "Five years of backend work"),
            relevance_to_software_engineering: category(overall, "Strong match"),
            clarity_and_structure: category(overall, "Well organized"),
            recommendations: vec![
                "Add measurable outcomes to each role".to_string(),
                "Improve the summary section".to_string(),
                "Great use of action verbs".to_string(),
            ],
        }
    }
}
