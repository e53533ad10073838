//! Generated reports and their provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tier of the fallback chain produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportSource {
    /// The dedicated report-generation service
    PrimaryBackend,
    /// The hosted chat-completion model
    SecondaryBackend,
    /// The deterministic local template
    LocalTemplate,
}

impl ReportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSource::PrimaryBackend => "primary-backend",
            ReportSource::SecondaryBackend => "secondary-backend",
            ReportSource::LocalTemplate => "local-template",
        }
    }

    /// Whether a remote model wrote the body.
    pub fn is_remote(&self) -> bool {
        !matches!(self, ReportSource::LocalTemplate)
    }
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated financial report.
///
/// `source` must name the tier that actually wrote `body`. Notes explain
/// why earlier tiers were skipped; they never change attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub body: String,
    pub source: ReportSource,
    pub report_type: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Report {
    pub fn new(
        body: impl Into<String>,
        source: ReportSource,
        report_type: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            body: body.into(),
            source,
            report_type: report_type.into(),
            generated_at,
            notes: Vec::new(),
        }
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Body followed by any notes, as shown to the user.
    pub fn render(&self) -> String {
        if self.notes.is_empty() {
            return self.body.clone();
        }
        let mut text = self.body.clone();
        for note in &self.notes {
            text.push_str("\n\n");
            text.push_str(note);
        }
        text
    }
}
