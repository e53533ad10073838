//! Document export for reports.
//!
//! Report text is turned into a block structure by looking at each line's
//! leading marker (banner bars, section emoji, bullets, numbering), then
//! rendered as a Word (`.docx`) document suitable for download.

use docx_rs::{Docx, Paragraph, Run, Style, StyleType, Table, TableCell, TableRow};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::{currency, display_amount};
use crate::report::{Report, ReportSource};
use crate::types::FinancialProfile;

/// Media type of rendered documents.
pub const DOCUMENT_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DISCLAIMER: &str = "This report is for informational purposes only and should not be \
considered as professional financial advice.";

/// Characters that only draw boxes and rules.
const DECORATION: &[char] = &['╔', '╗', '╚', '╝', '═', '━', '─', '║'];
const SECTION_MARKERS: &[&str] = &["📊", "💰", "🎯", "📈", "💡", "📋"];
const BULLET_MARKERS: &[&str] = &["•", "□", "-", "*"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render document: {0}")]
    Render(String),
}

/// One structural element of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading { level: u8, text: String },
    Bullet(String),
    Numbered(String),
    Paragraph(String),
    Details(Vec<(String, String)>),
}

/// Classify one line of report text. Blank and purely decorative lines yield `None`.
pub fn classify_line(line: &str) -> Option<Block> {
    let line = line.trim();
    if line.is_empty() || line.chars().all(|c| DECORATION.contains(&c) || c.is_whitespace()) {
        return None;
    }

    if line.starts_with('║') {
        let text = line.trim_matches(|c: char| c == '║' || c.is_whitespace());
        return Some(Block::Heading {
            level: 2,
            text: text.to_string(),
        });
    }

    if line.starts_with('#') {
        let hashes = line.chars().take_while(|c| *c == '#').count();
        let text = line[hashes..].trim();
        if !text.is_empty() {
            return Some(Block::Heading {
                level: hashes.clamp(2, 4) as u8,
                text: text.to_string(),
            });
        }
    }

    if SECTION_MARKERS.iter().any(|m| line.starts_with(m)) {
        return Some(Block::Heading {
            level: 3,
            text: line.to_string(),
        });
    }

    for marker in BULLET_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            // "-$250" or "**bold**" are not bullets
            if rest.starts_with(char::is_whitespace) {
                return Some(Block::Bullet(rest.trim().to_string()));
            }
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        return Some(Block::Numbered(line.to_string()));
    }

    Some(Block::Paragraph(line.to_string()))
}

/// Who wrote the report, for the document footer.
pub fn source_label(source: ReportSource) -> &'static str {
    match source {
        ReportSource::PrimaryBackend => "Primary report-generation service",
        ReportSource::SecondaryBackend => "Hosted chat model (fallback analysis)",
        ReportSource::LocalTemplate => "Local analysis engine (no AI model)",
    }
}

/// A report laid out as a downloadable document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
    pub filename: String,
}

impl ReportDocument {
    /// Lay out `report` for the user described by `profile`.
    pub fn build(report: &Report, profile: &FinancialProfile) -> Self {
        let generated_on = report
            .generated_at
            .format("%B %d, %Y at %I:%M %p UTC")
            .to_string();

        let goal = if profile.has_goal() {
            profile.goal.trim().to_string()
        } else {
            "Not specified".to_string()
        };
        let goal_amount = profile
            .goal_target()
            .map(currency)
            .unwrap_or_else(|| "Not specified".to_string());

        let mut blocks = vec![
            Block::Title("Comprehensive Financial Report".to_string()),
            Block::Heading {
                level: 2,
                text: "Report Details".to_string(),
            },
            Block::Details(vec![
                ("User Type".to_string(), profile.user_type.title().to_string()),
                ("Generated On".to_string(), generated_on.clone()),
                (
                    "Monthly Income".to_string(),
                    display_amount(profile.income.as_ref(), "Not specified"),
                ),
                (
                    "Monthly Expenses".to_string(),
                    display_amount(profile.expenses.as_ref(), "Not specified"),
                ),
                ("Financial Goal".to_string(), goal),
                ("Goal Amount".to_string(), goal_amount),
            ]),
            Block::Heading {
                level: 2,
                text: "Financial Analysis".to_string(),
            },
        ];

        blocks.extend(report.render().lines().filter_map(classify_line));

        blocks.push(Block::Heading {
            level: 2,
            text: "Report Generation Information".to_string(),
        });
        blocks.push(Block::Paragraph(format!(
            "This report was generated by: {}",
            source_label(report.source)
        )));
        blocks.push(Block::Paragraph(format!("Generated on: {}", generated_on)));
        blocks.push(Block::Paragraph(DISCLAIMER.to_string()));

        let filename = format!(
            "financial_report_{}_{}.docx",
            profile.user_type,
            report.generated_at.format("%Y%m%d_%H%M%S")
        );

        Self { blocks, filename }
    }

    /// Lay the blocks out as a Word document.
    fn to_docx(&self) -> Docx {
        let mut docx = Docx::new()
            .add_style(paragraph_style("Title", "Title", 40))
            .add_style(paragraph_style("Heading2", "Heading 2", 32))
            .add_style(paragraph_style("Heading3", "Heading 3", 28))
            .add_style(paragraph_style("Heading4", "Heading 4", 24))
            .add_style(Style::new("ListParagraph", StyleType::Paragraph).name("List Paragraph"));

        for block in &self.blocks {
            docx = match block {
                Block::Title(text) => docx.add_paragraph(text_paragraph(text).style("Title")),
                Block::Heading { level, text } => {
                    docx.add_paragraph(text_paragraph(text).style(&format!("Heading{}", level)))
                }
                Block::Bullet(text) => docx.add_paragraph(
                    text_paragraph(&format!("\u{2022} {}", text)).style("ListParagraph"),
                ),
                Block::Numbered(text) => {
                    docx.add_paragraph(text_paragraph(text).style("ListParagraph"))
                }
                Block::Paragraph(text) => docx.add_paragraph(text_paragraph(text)),
                Block::Details(rows) => docx.add_table(details_table(rows)),
            };
        }

        docx
    }

    /// The packed `.docx` bytes, ready to send or save.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut buf = Cursor::new(Vec::new());
        self.to_docx()
            .build()
            .pack(&mut buf)
            .map_err(|e| ExportError::Render(e.to_string()))?;
        Ok(buf.into_inner())
    }

    /// Write the document into `dir` (created if missing) and return its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let bytes = self.to_bytes()?;
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "Report document written");
        Ok(path)
    }
}

fn paragraph_style(id: &str, name: &str, half_points: usize) -> Style {
    Style::new(id, StyleType::Paragraph)
        .name(name)
        .size(half_points)
        .bold()
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn details_table(rows: &[(String, String)]) -> Table {
    Table::new(
        rows.iter()
            .map(|(label, value)| {
                TableRow::new(vec![
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(label).bold())),
                    TableCell::new().add_paragraph(text_paragraph(value)),
                ])
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesizer::ReportSynthesizer;
    use crate::types::UserType;
    use chrono::{TimeZone, Utc};
    use docx_rs::DocumentChild;

    #[test]
    fn test_classify_markers() {
        assert_eq!(classify_line("━━━━━━"), None);
        assert_eq!(classify_line("   "), None);
        assert_eq!(
            classify_line("║   FINANCIAL ANALYSIS REPORT   ║"),
            Some(Block::Heading { level: 2, text: "FINANCIAL ANALYSIS REPORT".into() })
        );
        assert_eq!(
            classify_line("💡 RECOMMENDATIONS"),
            Some(Block::Heading { level: 3, text: "💡 RECOMMENDATIONS".into() })
        );
        assert_eq!(classify_line("• Save more"), Some(Block::Bullet("Save more".into())));
        assert_eq!(classify_line("□ Track expenses"), Some(Block::Bullet("Track expenses".into())));
        assert_eq!(
            classify_line("2. Review expenses"),
            Some(Block::Numbered("2. Review expenses".into()))
        );
        assert_eq!(
            classify_line("-$250.00 deficit"),
            Some(Block::Paragraph("-$250.00 deficit".into()))
        );
        assert_eq!(
            classify_line("## Next steps"),
            Some(Block::Heading { level: 2, text: "Next steps".into() })
        );
    }

    #[test]
    fn test_document_from_local_report() {
        let profile = FinancialProfile::new(UserType::Professional)
            .with_income(4000.0)
            .with_expenses(3000.0)
            .with_goal("Vacation");
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 5).unwrap();
        let report = ReportSynthesizer::new().synthesize_at(&profile, now);

        let doc = ReportDocument::build(&report, &profile);
        assert_eq!(doc.filename, "financial_report_professional_20260102_150405.docx");
        assert!(matches!(doc.blocks[0], Block::Title(_)));

        let details = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Details(rows) => Some(rows.clone()),
                _ => None,
            })
            .unwrap();
        assert!(details.contains(&("Monthly Income".to_string(), "$4,000.00".to_string())));
        assert!(details.contains(&("Goal Amount".to_string(), "Not specified".to_string())));

        assert!(doc.blocks.contains(&Block::Heading {
            level: 3,
            text: "📋 ACTION ITEMS".into()
        }));
        assert!(doc
            .blocks
            .contains(&Block::Bullet("Continue maintaining positive cash flow".into())));
        assert!(doc.blocks.iter().any(|b| matches!(
            b,
            Block::Paragraph(t) if t.starts_with("This report was generated by: Local analysis engine")
        )));
        assert!(!doc.blocks.iter().any(|b| matches!(b, Block::Paragraph(t) if t.contains("━━━"))));
    }

    #[test]
    fn test_docx_has_one_element_per_block() {
        let profile = FinancialProfile::new(UserType::Student).with_income(1500.0);
        let report = ReportSynthesizer::new().synthesize(&profile);
        let doc = ReportDocument::build(&report, &profile);

        let docx = doc.to_docx();
        let children = &docx.document.children;
        assert_eq!(children.len(), doc.blocks.len());

        let tables = children
            .iter()
            .filter(|c| matches!(c, DocumentChild::Table(_)))
            .count();
        assert_eq!(tables, 1);

        let bytes = doc.to_bytes().unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn test_write_to_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reports");
        let profile = FinancialProfile::default();
        let report = ReportSynthesizer::new().synthesize(&profile);

        let path = ReportDocument::build(&report, &profile).write_to(&dir).unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("docx"));
        let written = fs::read(&path).unwrap();
        assert!(written.starts_with(b"PK"));
    }
}
