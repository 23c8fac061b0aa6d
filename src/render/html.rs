// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTML rendering for the web UI and standalone report documents

use minijinja::{context, Environment};
use serde::Serialize;

use super::ReportView;
use crate::controller::{AppController, FileFailure};
use crate::model::ResumeResult;
use crate::upload::{InputState, ACCEPTED_EXTENSIONS};
use crate::Result;

const BASE: &str = r#"<!DOCTYPE html>
<html lang="en" class="{{ theme_class }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}{% endblock %} - ResuMatch</title>
    <style>
        :root {
            --bg-primary: #f9fafb;
            --bg-card: #ffffff;
            --bg-muted: #f3f4f6;
            --text-primary: #111827;
            --text-secondary: #4b5563;
            --accent: #4f46e5;
            --border: #e5e7eb;
            --good: #059669;
            --medium: #d97706;
            --poor: #dc2626;
            --info: #3b82f6;
        }
        html.dark {
            --bg-primary: #111827;
            --bg-card: #1f2937;
            --bg-muted: #0f172a;
            --text-primary: #f3f4f6;
            --text-secondary: #9ca3af;
            --accent: #818cf8;
            --border: #374151;
            --good: #34d399;
            --medium: #fbbf24;
            --poor: #f87171;
            --info: #60a5fa;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
            transition: background 0.3s, color 0.3s;
        }
        .container { max-width: 1100px; margin: 0 auto; padding: 32px 16px; }
        header {
            display: flex; justify-content: space-between; align-items: center;
            padding: 16px 24px; background: var(--bg-card); border-bottom: 1px solid var(--border);
        }
        header .brand { font-size: 1.25em; font-weight: bold; }
        header .tagline { font-size: 0.75em; color: var(--text-secondary); }
        button, .button {
            cursor: pointer; border: none; border-radius: 6px; padding: 8px 16px;
            background: var(--accent); color: white; font-weight: 500; text-decoration: none;
        }
        button:disabled { background: #9ca3af; cursor: not-allowed; }
        .theme-toggle { background: var(--bg-muted); color: var(--text-primary); border-radius: 999px; }
        .hero { text-align: center; margin-bottom: 40px; }
        .hero p { color: var(--text-secondary); }
        .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 24px; }
        .card { background: var(--bg-card); border-radius: 10px; padding: 24px; margin-bottom: 24px; border: 1px solid var(--border); }
        textarea {
            width: 100%; height: 160px; padding: 12px; border-radius: 6px;
            border: 1px solid var(--border); background: var(--bg-primary); color: var(--text-primary);
        }
        .hint { display: flex; justify-content: space-between; font-size: 0.75em; color: var(--text-secondary); }
        .dropzone {
            min-height: 160px; border: 2px dashed var(--border); border-radius: 6px;
            display: flex; flex-direction: column; align-items: center; justify-content: center; cursor: pointer;
        }
        .dropzone.dragging { border-color: var(--accent); }
        .file { display: flex; justify-content: space-between; background: var(--bg-muted); padding: 6px 10px; border-radius: 6px; margin: 4px; width: 95%; }
        .file .size { color: var(--text-secondary); font-size: 0.8em; margin-left: 8px; }
        .error { background: rgba(220, 38, 38, 0.1); color: var(--poor); padding: 16px; border-radius: 8px; margin-bottom: 24px; }
        .rank { display: inline-flex; width: 32px; height: 32px; border-radius: 50%; background: var(--accent); color: white; align-items: center; justify-content: center; font-weight: 600; margin-right: 8px; }
        .score-good { color: var(--good); }
        .score-medium { color: var(--medium); }
        .score-poor { color: var(--poor); }
        .categories { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin-top: 16px; }
        .category { padding: 16px; border: 1px solid var(--border); border-radius: 8px; }
        .gauge { height: 8px; background: var(--bg-muted); border-radius: 4px; overflow: hidden; margin: 6px 0; }
        .gauge-fill { height: 100%; }
        .gauge-low { background: var(--poor); }
        .gauge-mid { background: var(--medium); }
        .gauge-high { background: var(--good); }
        .rec { display: flex; gap: 10px; padding: 8px; border-radius: 6px; background: var(--bg-muted); margin: 6px 0; }
        .icon-warning { color: var(--medium); }
        .icon-info { color: var(--info); }
        .icon-success { color: var(--good); }
        footer { padding: 24px; text-align: center; font-size: 0.85em; color: var(--text-secondary); border-top: 1px solid var(--border); }
        @media (max-width: 768px) { .grid, .categories { grid-template-columns: 1fr; } }
    </style>
</head>
<body>
{% block body %}{% endblock %}
</body>
</html>"#;

const REPORT: &str = r#"{% macro report(r, download) %}
<div class="card report" id="report-{{ r.id }}">
    <p><strong>File:</strong> {{ r.file_name }}</p>
    <p><strong>Generated On:</strong> {{ r.generated_on }}</p>
    <h2>Resume Analysis Report
        <span style="float: right; font-size: 0.7em;">Overall Score:
            <span class="score-{{ r.tier }}">{{ r.overall_score }}/10</span>
        </span>
    </h2>
    <div class="categories">
    {% for c in r.categories %}
        <div class="category">
            <strong>{{ c.title }} - {{ c.score }}/10</strong>
            <div class="gauge"><div class="gauge-fill gauge-{{ c.gauge }}" style="width: {{ c.gauge_percent }}%"></div></div>
            <p>{{ c.feedback }}</p>
        </div>
    {% endfor %}
    </div>
    <h3 style="margin-top: 24px;">Summary Recommendations</h3>
    {% for rec in r.recommendations %}
        <div class="rec"><span class="icon-{{ rec.icon }}">{% if rec.icon == "warning" %}&#9888;{% elif rec.icon == "info" %}&#9432;{% else %}&#10004;{% endif %}</span><span>{{ rec.text }}</span></div>
    {% else %}
        <p class="hint">No recommendations available.</p>
    {% endfor %}
    {% if download %}
    <p style="text-align: center; margin-top: 16px;">
        <a class="button" href="/api/results/{{ r.id }}/report.pdf" download="{{ r.pdf_name }}">Download Full Report</a>
    </p>
    {% endif %}
</div>
{% endmacro %}"#;

const INDEX: &str = r#"{% extends "base.html" %}
{% block title %}AI Resume Shortlisting{% endblock %}
{% block body %}
{% from "report.html" import report %}
<header>
    <div>
        <div class="brand">ResuMatch</div>
        <div class="tagline">AI Resume Shortlisting</div>
    </div>
    <form method="post" action="/api/theme/toggle" onsubmit="return toggleTheme(event)">
        <button class="theme-toggle" aria-label="{{ toggle_label }}">{% if theme_class %}&#9728;{% else %}&#9790;{% endif %}</button>
    </form>
</header>
<main class="container">
    <div class="hero">
        <h1>AI Resume Shortlisting</h1>
        <p>Upload multiple resumes and enter a job description to get AI-powered analysis and ranking of candidates.</p>
    </div>

    <div class="grid">
        <div class="card">
            <h2>Job Description</h2>
            <textarea id="job" placeholder="Paste job description here...">{{ job_description }}</textarea>
            <div class="hint"><span>Characters: <span id="chars">{{ job_chars }}</span></span><span>Recommended: 100-500 characters</span></div>
        </div>
        <div class="card">
            <h2>Resume Upload</h2>
            <div id="dropzone" class="dropzone">
                <input type="file" id="picker" accept="{{ accept }}" multiple hidden>
                {% for f in files %}
                <div class="file"><span>{{ f.name }}<span class="size">({{ f.size }})</span></span>
                    <button type="button" class="remove" data-index="{{ f.index }}" aria-label="Remove {{ f.name }}">&times;</button></div>
                {% endfor %}
                {% if files %}
                <p class="hint">Click or drag to add more resumes</p>
                {% else %}
                <p><strong>Click to upload</strong> or drag and drop</p>
                <p class="hint">PDF, DOC, or DOCX (max 5MB per file)</p>
                {% endif %}
            </div>
            <button id="analyze" style="width: 100%; margin-top: 16px;" {% if not can_analyze %}disabled{% endif %}>{{ analyze_label }}</button>
        </div>
    </div>

    {% if error %}<div class="error" role="alert">{{ error }}</div>{% endif %}
    {% for f in failures %}<div class="error">{{ f.fileName }}: {{ f.message }}</div>{% endfor %}

    {% for r in results %}
    <section>
        <h2><span class="rank">{{ r.rank }}</span>{{ r.file_name }}</h2>
        {{ report(r, true) }}
    </section>
    {% endfor %}
</main>
<footer><p>&copy; 2025 ResuMatch | AI-powered resume analysis</p></footer>
<script>
const zone = document.getElementById('dropzone');
const picker = document.getElementById('picker');
const job = document.getElementById('job');
async function upload(files) {
    const form = new FormData();
    for (const f of files) form.append('resume', f);
    await fetch('/api/files', { method: 'POST', body: form });
    location.reload();
}
zone.addEventListener('click', (e) => { if (!e.target.classList.contains('remove')) picker.click(); });
picker.addEventListener('change', () => upload(picker.files));
zone.addEventListener('dragover', (e) => { e.preventDefault(); zone.classList.add('dragging'); });
zone.addEventListener('dragleave', (e) => { e.preventDefault(); zone.classList.remove('dragging'); });
zone.addEventListener('drop', (e) => { e.preventDefault(); zone.classList.remove('dragging'); upload(e.dataTransfer.files); });
document.querySelectorAll('.remove').forEach((b) => b.addEventListener('click', async (e) => {
    e.stopPropagation();
    await fetch('/api/files/' + b.dataset.index, { method: 'DELETE' });
    location.reload();
}));
job.addEventListener('input', async () => {
    document.getElementById('chars').textContent = job.value.length;
    await fetch('/api/job-description', {
        method: 'PUT',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ jobDescription: job.value }),
    });
    const ready = job.value.length > 0 && document.querySelectorAll('.file').length > 0;
    document.getElementById('analyze').disabled = !ready;
});
document.getElementById('analyze').addEventListener('click', async (e) => {
    e.target.disabled = true;
    e.target.textContent = 'Analyzing Resumes...';
    await fetch('/api/analyze', { method: 'POST' });
    location.reload();
});
async function toggleTheme(e) {
    e.preventDefault();
    await fetch('/api/theme/toggle', { method: 'POST' });
    location.reload();
    return false;
}
</script>
{% endblock %}"#;

const DOCUMENT: &str = r#"{% extends "base.html" %}
{% block title %}Resume Analysis Reports{% endblock %}
{% block body %}
{% from "report.html" import report %}
<main class="container">
    {% for r in results %}
    <section>
        <h2><span class="rank">{{ r.rank }}</span>{{ r.file_name }}</h2>
        {{ report(r, false) }}
    </section>
    {% endfor %}
</main>
{% endblock %}"#;

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("base.html", BASE)?;
    env.add_template("report.html", REPORT)?;
    env.add_template("index.html", INDEX)?;
    env.add_template("document.html", DOCUMENT)?;
    Ok(env)
}

#[derive(Debug, Serialize)]
struct FileView {
    index: usize,
    name: String,
    size: String,
}

/// Everything the main page shows
#[derive(Debug, Serialize)]
pub struct PageView {
    theme_class: &'static str,
    toggle_label: &'static str,
    job_description: String,
    job_chars: usize,
    files: Vec<FileView>,
    accept: String,
    can_analyze: bool,
    analyze_label: String,
    error: Option<String>,
    failures: Vec<FileFailure>,
    results: Vec<ReportView>,
}

impl PageView {
    pub fn new(input: &InputState, controller: &AppController) -> Self {
        let loading = controller.is_loading();

        Self {
            theme_class: controller.theme_class(),
            toggle_label: controller.theme().toggle_label(),
            job_description: input.job_description().to_string(),
            job_chars: input.job_description_chars(),
            files: input
                .files()
                .iter()
                .enumerate()
                .map(|(index, f)| FileView {
                    index,
                    name: f.name().to_string(),
                    size: f.size_label(),
                })
                .collect(),
            accept: ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(","),
            can_analyze: input.can_analyze(loading),
            analyze_label: input.analyze_label(loading),
            error: controller.error().map(String::from),
            failures: controller.failures().to_vec(),
            results: ReportView::all(controller.results()),
        }
    }
}

/// The interactive upload and results page
pub fn render_page(view: &PageView) -> Result<String> {
    let env = environment()?;
    let html = env.get_template("index.html")?.render(view)?;
    Ok(html)
}

/// A standalone document with every ranked report
pub fn render_document(results: &[ResumeResult], dark: bool) -> Result<String> {
    let env = environment()?;
    let html = env.get_template("document.html")?.render(context! {
        theme_class => if dark { crate::theme::DARK_CLASS } else { "" },
        results => ReportView::all(results),
    })?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::model::fixtures;
    use crate::theme::{ThemeState, ThemeStore};
    use crate::upload::ResumeFile;

    fn controller(dark: bool) -> (tempfile::TempDir, AppController) {
        let dir = tempfile::tempdir().unwrap();
        let theme = ThemeState::init_with(ThemeStore::new(dir.path().join("p.json")), || dark);
        (dir, AppController::new(&AppConfig::default(), theme))
    }

    #[test]
    fn test_page_escapes_user_text() {
        let (_dir, mut controller) = controller(false);
        let mut input = InputState::new();
        controller.apply(input.add_picked(vec![ResumeFile::new("<script>x</script>.pdf", vec![0; 10])]));
        controller.apply(input.set_job_description("Rust & <Go>"));

        let html = render_page(&PageView::new(&input, &controller)).unwrap();
        assert!(html.contains("&lt;script&gt;x&lt;&#x2f;script&gt;.pdf") || html.contains("&lt;script&gt;x&lt;/script&gt;.pdf"));
        assert!(html.contains("Rust &amp; &lt;Go&gt;"));
        assert!(html.contains("Analyze 1 Resume"));
        assert!(html.contains(".pdf,.doc,.docx"));
    }

    #[test]
    fn test_page_theme_marker() {
        let (_dir, controller) = controller(true);
        let html = render_page(&PageView::new(&InputState::new(), &controller)).unwrap();
        assert!(html.contains(r#"<html lang="en" class="dark">"#));
        assert!(html.contains("Switch to light mode"));
    }

    #[test]
    fn test_page_script_counts_files_from_dom() {
        let (_dir, mut controller) = controller(false);
        let mut input = InputState::new();
        controller.apply(input.add_picked(vec![ResumeFile::new("a.pdf", vec![1])]));

        let html = render_page(&PageView::new(&input, &controller)).unwrap();
        assert!(html.contains("document.querySelectorAll('.file').length > 0"));
        assert!(html.contains(r#"class="dropzone""#));
        assert_eq!(html.matches(r#"<div class="file">"#).count(), 1);
    }

    #[test]
    fn test_document_lists_ranked_reports() {
        let results = vec![
            ResumeResult::new("bob.pdf", fixtures::analysis(9.0)),
            ResumeResult::new("alice.pdf", fixtures::analysis(3.0)),
        ];
        let html = render_document(&results, false).unwrap();

        let bob = html.find("bob.pdf").unwrap();
        let alice = html.find("alice.pdf").unwrap();
        assert!(bob < alice);
        assert!(html.contains("score-good"));
        assert!(html.contains("score-poor"));
        assert!(html.contains("Technical Skills - 9/10"));
        assert!(!html.contains("Download Full Report"));
    }
}
