// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! PDF export of a single analysis report (US letter, portrait)

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use tracing::info;

use super::ReportView;
use crate::model::ResumeResult;
use crate::Result;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
/// Half an inch
const MARGIN: i64 = 36;
/// Helvetica averages a little over half an em per glyph
const AVG_GLYPH_WIDTH: f64 = 0.52;

/// `{fileName}_report.pdf`, with path separators neutralized
pub fn report_file_name(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}_report.pdf", safe)
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    size: i64,
    bold: bool,
    space_before: i64,
}

impl Line {
    fn new(text: impl Into<String>, size: i64, bold: bool, space_before: i64) -> Self {
        Self {
            text: text.into(),
            size,
            bold,
            space_before,
        }
    }

    fn leading(&self) -> i64 {
        self.size * 14 / 10
    }
}

/// Greedy word wrap to at most `width` characters per line
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

fn chars_per_line(size: i64, indent: i64) -> usize {
    let usable = (PAGE_WIDTH - 2 * MARGIN - indent) as f64;
    (usable / (size as f64 * AVG_GLYPH_WIDTH)).floor().max(10.0) as usize
}

/// Encode for the WinAnsiEncoding fonts: Latin-1 plus the typographic punctuation
/// WinAnsi keeps in 0x80..0x9F. Anything else becomes `?`.
fn pdf_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if ('\u{80}'..'\u{A0}').contains(&c) => b'?',
            c if (c as u32) < 0x100 => c as u8,
            _ => b'?',
        })
        .collect()
}

fn report_lines(view: &ReportView) -> Vec<Line> {
    let mut lines = vec![
        Line::new("Resume Analysis Report", 18, true, 0),
        Line::new(format!("File: {}", view.file_name), 10, false, 6),
        Line::new(format!("Generated On: {}", view.generated_on), 10, false, 0),
        Line::new(
            format!("Overall Score: {}/10 ({})", view.overall_score, view.tier.label()),
            13,
            true,
            10,
        ),
    ];

    for category in &view.categories {
        lines.push(Line::new(
            format!("{} - {}/10", category.title, category.score),
            12,
            true,
            12,
        ));
        for part in wrap(&category.feedback, chars_per_line(10, 0)) {
            lines.push(Line::new(part, 10, false, 0));
        }
    }

    lines.push(Line::new("Summary Recommendations", 14, true, 16));
    if view.recommendations.is_empty() {
        lines.push(Line::new("No recommendations available.", 10, false, 0));
    }
    for rec in &view.recommendations {
        let wrapped = wrap(&rec.text, chars_per_line(10, 24));
        for (i, part) in wrapped.into_iter().enumerate() {
            let prefix = if i == 0 { format!("{} ", rec.icon.glyph()) } else { "     ".to_string() };
            lines.push(Line::new(format!("{}{}", prefix, part), 10, false, if i == 0 { 4 } else { 0 }));
        }
    }

    lines
}

/// Split lines into pages of positioned text operations
fn paginate(lines: &[Line]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut ops = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let needed = line.space_before + line.leading();
        if y - needed < MARGIN && !ops.is_empty() {
            pages.push(std::mem::take(&mut ops));
            y = PAGE_HEIGHT - MARGIN;
        } else {
            y -= line.space_before;
        }
        y -= line.leading();

        let font = if line.bold { "F2" } else { "F1" };
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
        ops.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(pdf_text(&line.text))]));
        ops.push(Operation::new("ET", vec![]));
    }

    if !ops.is_empty() || pages.is_empty() {
        pages.push(ops);
    }
    pages
}

/// Build the report document in memory
pub fn render_pdf(result: &ResumeResult) -> Result<Vec<u8>> {
    let view = ReportView::new(result, 1);
    let pages = paginate(&report_lines(&view));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(pdf_text(&format!("Resume Analysis Report - {}", result.file_name))),
        "Producer" => Object::string_literal("resumatch"),
    });
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Write `{fileName}_report.pdf` into `dir`
pub fn export_report(result: &ResumeResult, dir: &Path) -> Result<PathBuf> {
    let bytes = render_pdf(result)?;
    std::fs::create_dir_all(dir)?;

    let path = dir.join(report_file_name(&result.file_name));
    std::fs::write(&path, bytes)?;
    info!("Exported report to {:?}", path);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("alice.pdf"), "alice.pdf_report.pdf");
        assert_eq!(report_file_name("../bob.docx"), ".._bob.docx_report.pdf");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("unbreakablewordhere", 5), vec!["unbreakablewordhere"]);
    }

    #[test]
    fn test_pdf_text_is_win_ansi() {
        assert_eq!(pdf_text("Skills \u{2014} 8/10"), b"Skills \x97 8/10".to_vec());
        assert_eq!(pdf_text("caf\u{e9} \u{4e2d}"), vec![b'c', b'a', b'f', 0xe9, b' ', b'?']);
        assert_eq!(pdf_text("\u{201C}ok\u{201D} \u{85}"), vec![0x93, b'o', b'k', 0x94, b' ', b'?']);
    }

    #[test]
    fn test_accented_report_uses_win_ansi_fonts() {
        let mut analysis = fixtures::analysis(6.0);
        analysis.technical_skills.feedback = "Caf\u{e9} r\u{e9}sum\u{e9} na\u{ef}ve \u{2013} fa\u{e7}ade".to_string();
        let result = ResumeResult::new("r\u{e9}sum\u{e9}.pdf", analysis);

        let doc = Document::load_mem(&render_pdf(&result).unwrap()).unwrap();
        let fonts: Vec<_> = doc
            .objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|dict| matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Font"))
            .collect();

        assert_eq!(fonts.len(), 2);
        for font in fonts {
            assert!(matches!(font.get(b"Encoding"), Ok(Object::Name(name)) if name == b"WinAnsiEncoding"));
        }
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_single_page_letter_document() {
        let result = ResumeResult::new("alice.pdf", fixtures::analysis(7.0));
        let bytes = render_pdf(&result).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_long_report_paginates() {
        let mut analysis = fixtures::analysis(5.0);
        analysis.recommendations = (0..120)
            .map(|i| format!("Include more detail about project {} and its measurable impact", i))
            .collect();
        let result = ResumeResult::new("long.pdf", analysis);

        let doc = Document::load_mem(&render_pdf(&result).unwrap()).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ResumeResult::new("bob.pdf", fixtures::analysis(9.0));

        let path = export_report(&result, &dir.path().join("reports")).unwrap();
        assert_eq!(path.file_name().unwrap(), "bob.pdf_report.pdf");
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
