// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Presentation of analysis results: score tiers, recommendation icons, report views

pub mod html;
pub mod pdf;

use chrono::Local;
use serde::Serialize;
use std::fmt::Write as _;

use crate::model::ResumeResult;

/// Coloring of an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Good,
    Medium,
    Poor,
}

impl ScoreTier {
    pub fn of(score: f64) -> Self {
        if score >= 7.0 {
            ScoreTier::Good
        } else if score >= 4.0 {
            ScoreTier::Medium
        } else {
            ScoreTier::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Good => "good",
            ScoreTier::Medium => "medium",
            ScoreTier::Poor => "poor",
        }
    }
}

/// Fill color of a category gauge bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeTier {
    Low,
    Mid,
    High,
}

impl GaugeTier {
    pub fn of(score: f64) -> Self {
        if score <= 3.0 {
            GaugeTier::Low
        } else if score <= 6.0 {
            GaugeTier::Mid
        } else {
            GaugeTier::High
        }
    }
}

/// Icon shown next to a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationIcon {
    Warning,
    Info,
    Success,
}

impl RecommendationIcon {
    /// Keyword heuristic; checks run in this order and the first match wins
    pub fn for_text(recommendation: &str) -> Self {
        let lower = recommendation.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if has(&["provide", "add", "include"]) {
            RecommendationIcon::Warning
        } else if has(&["improve", "enhance", "detail"]) {
            RecommendationIcon::Info
        } else {
            RecommendationIcon::Success
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            RecommendationIcon::Warning => "[!]",
            RecommendationIcon::Info => "[?]",
            RecommendationIcon::Success => "[+]",
        }
    }
}

/// Scores print like the service sent them: 8 stays "8", 7.5 stays "7.5"
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub title: &'static str,
    pub score: String,
    pub feedback: String,
    pub gauge: GaugeTier,
    pub gauge_percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub text: String,
    pub icon: RecommendationIcon,
}

/// Everything a report shows for one ranked result
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub rank: usize,
    pub id: String,
    pub file_name: String,
    pub generated_on: String,
    pub overall_score: String,
    pub tier: ScoreTier,
    pub categories: Vec<CategoryView>,
    pub recommendations: Vec<RecommendationView>,
    pub pdf_name: String,
}

impl ReportView {
    /// `rank` is 1-based
    pub fn new(result: &ResumeResult, rank: usize) -> Self {
        let analysis = &result.result;

        let categories = analysis
            .categories()
            .into_iter()
            .map(|(title, category)| CategoryView {
                title,
                score: format_score(category.score),
                feedback: category.feedback.clone(),
                gauge: GaugeTier::of(category.score),
                gauge_percent: (category.score * 10.0).clamp(0.0, 100.0) as u32,
            })
            .collect();

        let recommendations = analysis
            .recommendations
            .iter()
            .map(|text| RecommendationView {
                text: text.clone(),
                icon: RecommendationIcon::for_text(text),
            })
            .collect();

        Self {
            rank,
            id: result.id.to_string(),
            file_name: result.file_name.clone(),
            generated_on: Local::now().format("%Y-%m-%d").to_string(),
            overall_score: format_score(analysis.overall_score),
            tier: ScoreTier::of(analysis.overall_score),
            categories,
            recommendations,
            pdf_name: pdf::report_file_name(&result.file_name),
        }
    }

    pub fn all(results: &[ResumeResult]) -> Vec<Self> {
        results
            .iter()
            .enumerate()
            .map(|(i, r)| Self::new(r, i + 1))
            .collect()
    }
}

/// Plain-text report for the terminal
pub fn render_text(results: &[ResumeResult]) -> String {
    let mut out = String::new();

    for view in ReportView::all(results) {
        // writing to a String cannot fail
        let _ = write_report(&mut out, &view);
        out.push('\n');
    }

    out
}

fn write_report(out: &mut String, view: &ReportView) -> std::fmt::Result {
    writeln!(out, "#{}  {}", view.rank, view.file_name)?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Resume Analysis Report")?;
    writeln!(out, "File: {}", view.file_name)?;
    writeln!(out, "Generated On: {}", view.generated_on)?;
    writeln!(out, "Overall Score: {}/10 ({})", view.overall_score, view.tier.label())?;
    writeln!(out)?;

    for category in &view.categories {
        writeln!(out, "{} - {}/10", category.title, category.score)?;
        writeln!(out, "    {}", category.feedback)?;
    }

    writeln!(out)?;
    writeln!(out, "Summary Recommendations")?;
    if view.recommendations.is_empty() {
        writeln!(out, "    No recommendations available.")?;
    }
    for rec in &view.recommendations {
        writeln!(out, "  {} {}", rec.icon.glyph(), rec.text)?;
    }

    Ok(())
}

/// Ranked results as pretty JSON
pub fn render_json(results: &[ResumeResult]) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn test_score_tiers() {
        assert_eq!(ScoreTier::of(10.0), ScoreTier::Good);
        assert_eq!(ScoreTier::of(7.0), ScoreTier::Good);
        assert_eq!(ScoreTier::of(6.9), ScoreTier::Medium);
        assert_eq!(ScoreTier::of(4.0), ScoreTier::Medium);
        assert_eq!(ScoreTier::of(3.99), ScoreTier::Poor);
        assert_eq!(ScoreTier::of(0.0), ScoreTier::Poor);
    }

    #[test]
    fn test_gauge_tiers() {
        assert_eq!(GaugeTier::of(3.0), GaugeTier::Low);
        assert_eq!(GaugeTier::of(3.5), GaugeTier::Mid);
        assert_eq!(GaugeTier::of(6.0), GaugeTier::Mid);
        assert_eq!(GaugeTier::of(6.1), GaugeTier::High);
    }

    #[test]
    fn test_recommendation_icon_precedence() {
        assert_eq!(RecommendationIcon::for_text("Provide links to your projects"), RecommendationIcon::Warning);
        assert_eq!(RecommendationIcon::for_text("INCLUDE certifications"), RecommendationIcon::Warning);
        assert_eq!(RecommendationIcon::for_text("Improve the summary"), RecommendationIcon::Info);
        assert_eq!(RecommendationIcon::for_text("More detail on impact"), RecommendationIcon::Info);
        assert_eq!(RecommendationIcon::for_text("Strong action verbs"), RecommendationIcon::Success);
        // first rule wins when both match
        assert_eq!(RecommendationIcon::for_text("Add detail to enhance roles"), RecommendationIcon::Warning);
        // substring match, as in "address"
        assert_eq!(RecommendationIcon::for_text("Address gaps"), RecommendationIcon::Warning);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(8.0), "8");
        assert_eq!(format_score(7.5), "7.5");
    }

    #[test]
    fn test_report_view() {
        let result = ResumeResult::new("alice.pdf", fixtures::analysis(7.5));
        let view = ReportView::new(&result, 1);

        assert_eq!(view.overall_score, "7.5");
        assert_eq!(view.tier, ScoreTier::Good);
        assert_eq!(view.categories.len(), 4);
        assert_eq!(view.categories[0].gauge_percent, 75);
        assert_eq!(view.recommendations[0].icon, RecommendationIcon::Warning);
        assert_eq!(view.recommendations[1].icon, RecommendationIcon::Info);
        assert_eq!(view.recommendations[2].icon, RecommendationIcon::Success);
        assert_eq!(view.pdf_name, "alice.pdf_report.pdf");
    }

    #[test]
    fn test_render_text() {
        let mut analysis = fixtures::analysis(9.0);
        analysis.recommendations.clear();
        let results = vec![
            ResumeResult::new("bob.pdf", analysis),
            ResumeResult::new("alice.pdf", fixtures::analysis(6.0)),
        ];

        let text = render_text(&results);
        assert!(text.starts_with("#1  bob.pdf"));
        assert!(text.contains("#2  alice.pdf"));
        assert!(text.contains("Overall Score: 9/10 (good)"));
        assert!(text.contains("Overall Score: 6/10 (medium)"));
        assert!(text.contains("No recommendations available."));
        assert!(text.contains("[!] Add measurable outcomes"));
    }

    #[test]
    fn test_render_json() {
        let results = vec![ResumeResult::new("bob.pdf", fixtures::analysis(9.0))];
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        assert_eq!(json[0]["fileName"], "bob.pdf");
    }
}
