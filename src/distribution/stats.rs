use crate::classifier::{Classification, DocumentType};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A failure that was logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub file: PathBuf,
    pub message: String,
    /// Operation frames active when the failure happened, outermost first
    pub context: Vec<String>,
}

/// A file written into the distribution, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProducedFile {
    pub doc_type: DocumentType,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    pub converted_to_text: usize,
    pub converted_to_html: usize,
    pub copied: usize,
    /// Successfully placed documents per type
    pub by_type: BTreeMap<DocumentType, usize>,
    pub produced: Vec<ProducedFile>,
    pub errors: Vec<ErrorRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgramCopy {
    pub copied: usize,
    pub errors: Vec<ErrorRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionStats {
    pub source: PathBuf,
    pub output: PathBuf,
    pub generated_at: DateTime<Local>,
    /// Classified files per type, including excluded ones
    pub by_type: BTreeMap<DocumentType, usize>,
    pub total_files: usize,
    pub excluded: usize,
    pub converted_to_text: usize,
    pub converted_to_html: usize,
    pub copied: usize,
    pub program_files: usize,
    pub errors: Vec<ErrorRecord>,
    pub archive: Option<PathBuf>,
}

impl DistributionStats {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            generated_at: Local::now(),
            by_type: BTreeMap::new(),
            total_files: 0,
            excluded: 0,
            converted_to_text: 0,
            converted_to_html: 0,
            copied: 0,
            program_files: 0,
            errors: Vec::new(),
            archive: None,
        }
    }

    pub fn record_classification(&mut self, classification: &Classification) {
        self.by_type = classification.summary();
        self.total_files = classification.total();
        self.excluded = classification.get(DocumentType::Exclude).len();
    }

    pub fn record_processing(&mut self, report: &ProcessReport) {
        self.converted_to_text += report.converted_to_text;
        self.converted_to_html += report.converted_to_html;
        self.copied += report.copied;
        self.errors.extend(report.errors.iter().cloned());
    }

    pub fn record_program_copy(&mut self, copy: &ProgramCopy) {
        self.program_files += copy.copied;
        self.errors.extend(copy.errors.iter().cloned());
    }

    /// Documents that ended up in the distribution.
    pub fn shipped_documents(&self) -> usize {
        self.converted_to_text + self.converted_to_html + self.copied
    }
}
