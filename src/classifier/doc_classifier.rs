use super::document_type::{ConversionStrategy, DocumentType};
use super::rules::{normalize_separators, ClassificationRules};
use crate::error::Result;
use log::{debug, trace};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Priority order within each rule phase.
const PRIORITY: [DocumentType; 5] = [
    DocumentType::UserEssential,
    DocumentType::Example,
    DocumentType::UserGuide,
    DocumentType::Technical,
    DocumentType::Developer,
];

/// Result of classifying a directory: source-relative paths per type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Classification {
    entries: BTreeMap<DocumentType, Vec<PathBuf>>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            entries: DocumentType::all()
                .into_iter()
                .map(|t| (t, Vec::new()))
                .collect(),
        }
    }
}

impl Classification {
    pub fn get(&self, doc_type: DocumentType) -> &[PathBuf] {
        self.entries
            .get(&doc_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, doc_type: DocumentType, path: PathBuf) {
        self.entries.entry(doc_type).or_default().push(path);
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentType, &[PathBuf])> {
        self.entries.iter().map(|(t, paths)| (*t, paths.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    /// Count of files per type; every type is present.
    pub fn summary(&self) -> BTreeMap<DocumentType, usize> {
        DocumentType::all()
            .into_iter()
            .map(|t| (t, self.get(t).len()))
            .collect()
    }

    fn sort(&mut self) {
        for paths in self.entries.values_mut() {
            paths.sort();
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    rules: ClassificationRules,
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self {
            rules: ClassificationRules::default(),
        }
    }
}

impl DocumentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ClassificationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ClassificationRules {
        &self.rules
    }

    pub fn classify_file(&self, path: &Path, base: &Path) -> DocumentType {
        self.classify_relative(&relative_path(path, base))
    }

    /// Classifies a `/`-separated path relative to the source root.
    pub fn classify_relative(&self, rel: &str) -> DocumentType {
        if self.rules.is_excluded(rel) {
            return DocumentType::Exclude;
        }

        // Exact names beat prefixes, prefixes beat patterns
        for doc_type in PRIORITY {
            if self.rules.get(doc_type).map_or(false, |r| r.matches_file(rel)) {
                return doc_type;
            }
        }
        for doc_type in PRIORITY {
            if self.rules.get(doc_type).map_or(false, |r| r.matching_prefix(rel).is_some()) {
                return doc_type;
            }
        }
        for doc_type in PRIORITY {
            if self.rules.get(doc_type).map_or(false, |r| r.matches_pattern(rel)) {
                return doc_type;
            }
        }

        fallback_type(rel)
    }

    /// The prefix that placed `rel` in `doc_type`, if it was a prefix rule.
    pub fn matched_prefix(&self, rel: &str, doc_type: DocumentType) -> Option<String> {
        self.rules
            .get(doc_type)
            .and_then(|r| r.matching_prefix(rel))
            .map(|p| p.to_string())
    }

    pub fn classify_directory(&self, root: &Path) -> Result<Classification> {
        self.classify_directory_skipping(root, &[])
    }

    /// Like `classify_directory`, but never descends into `skip` paths
    /// (used to keep an output directory nested in the source out of the walk).
    pub fn classify_directory_skipping(&self, root: &Path, skip: &[PathBuf]) -> Result<Classification> {
        let mut classification = Classification::default();

        let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if skip.iter().any(|s| entry.path() == s.as_path()) {
                debug!("Skipping {}", entry.path().display());
                return false;
            }
            if entry.file_type().is_dir() {
                let rel = relative_path(entry.path(), root);
                if self.rules.is_excluded(&rel) {
                    trace!("Pruned excluded directory {}", rel);
                    return false;
                }
            }
            true
        });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = relative_path(entry.path(), root);
            let doc_type = self.classify_relative(&rel);
            trace!("{} -> {}", rel, doc_type);
            classification.push(doc_type, PathBuf::from(rel));
        }

        classification.sort();
        debug!("Classified {} files under {}", classification.total(), root.display());

        Ok(classification)
    }

    pub fn conversion_strategy(&self, doc_type: DocumentType) -> ConversionStrategy {
        doc_type.conversion_strategy()
    }
}

fn fallback_type(rel: &str) -> DocumentType {
    if rel.to_lowercase().ends_with(".md") {
        if rel.starts_with("docs/") {
            DocumentType::UserGuide
        } else {
            DocumentType::Developer
        }
    } else {
        DocumentType::Exclude
    }
}

/// `path` relative to `base` with `/` separators; unchanged if not under `base`.
pub fn relative_path(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    normalize_separators(&rel.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essential_files() {
        let classifier = DocumentClassifier::new();
        for name in ["README.md", "LICENSE", "CHANGELOG.md"] {
            assert_eq!(classifier.classify_relative(name), DocumentType::UserEssential, "{}", name);
        }
    }

    #[test]
    fn test_prefix_beats_pattern() {
        let classifier = DocumentClassifier::new();
        // "syntax" would match the technical pattern, but docs/user/ is a prefix rule
        assert_eq!(
            classifier.classify_relative("docs/user/syntax_guide.md"),
            DocumentType::UserGuide
        );
        assert_eq!(
            classifier.classify_relative("docs/dev/user_notes.md"),
            DocumentType::Developer
        );
    }

    #[test]
    fn test_fallback() {
        let classifier = DocumentClassifier::new();
        assert_eq!(classifier.classify_relative("docs/intro.md"), DocumentType::UserGuide);
        assert_eq!(classifier.classify_relative("notes.md"), DocumentType::Developer);
        assert_eq!(classifier.classify_relative("requirements.txt"), DocumentType::Exclude);
    }

    #[test]
    fn test_relative_path_outside_base() {
        let rel = relative_path(Path::new("/elsewhere/README.md"), Path::new("/project"));
        assert_eq!(rel, "/elsewhere/README.md");
        let rel = relative_path(Path::new("/project/docs/a.md"), Path::new("/project"));
        assert_eq!(rel, "docs/a.md");
    }
}
