use super::document_type::DocumentType;
use crate::error::{DistError, Result};
use glob::{MatchOptions, Pattern};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uncompiled rules for one document type, as written in config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSpec {
    pub files: Vec<String>,
    pub prefixes: Vec<String>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    files: Vec<String>,
    prefixes: Vec<String>,
    patterns: Vec<Regex>,
}

impl RuleSet {
    pub fn from_spec(spec: &RuleSpec) -> Result<Self> {
        let mut set = RuleSet::default();
        set.extend(spec)?;
        Ok(set)
    }

    pub fn extend(&mut self, spec: &RuleSpec) -> Result<()> {
        self.files
            .extend(spec.files.iter().map(|f| normalize_separators(f)));

        for prefix in &spec.prefixes {
            let mut prefix = normalize_separators(prefix);
            if !prefix.ends_with('/') {
                prefix.push('/');
            }
            self.prefixes.push(prefix);
        }

        for pattern in &spec.patterns {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| DistError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            self.patterns.push(regex);
        }

        Ok(())
    }

    pub fn matches_file(&self, rel: &str) -> bool {
        self.files.iter().any(|f| f == rel)
    }

    /// Returns the matching prefix, used to keep sub-paths when copying.
    pub fn matching_prefix(&self, rel: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|p| rel.starts_with(p.as_str()))
            .map(|p| p.as_str())
    }

    pub fn matches_pattern(&self, rel: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(rel))
    }

    pub fn matches_any(&self, rel: &str) -> bool {
        self.matches_file(rel) || self.matching_prefix(rel).is_some() || self.matches_pattern(rel)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.prefixes.is_empty() && self.patterns.is_empty()
    }
}

/// Rule table consulted by the classifier.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    rules: BTreeMap<DocumentType, RuleSet>,
    exclude_globs: Vec<Pattern>,
}

static HIDDEN_COMPONENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|/)\.[^/]").unwrap()
});

static DEFAULT_RULES: Lazy<ClassificationRules> = Lazy::new(|| {
    let mut rules = ClassificationRules::empty();
    for (doc_type, spec) in default_specs() {
        rules.extend(doc_type, &spec).unwrap();
    }
    rules
});

fn spec(files: &[&str], prefixes: &[&str], patterns: &[&str]) -> RuleSpec {
    let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
    RuleSpec {
        files: owned(files),
        prefixes: owned(prefixes),
        patterns: owned(patterns),
    }
}

fn default_specs() -> Vec<(DocumentType, RuleSpec)> {
    vec![
        (
            DocumentType::Exclude,
            spec(
                &[],
                &[],
                &[
                    r"(^|/)(__pycache__|node_modules|venv|dist|build|target|tmp|htmlcov)(/|$)",
                    r"\.(pyc|pyo|log|tmp|bak|swp)$",
                    r"(^|/)(CLAUDE\.md|Thumbs\.db)$",
                ],
            ),
        ),
        (
            DocumentType::UserEssential,
            spec(
                &["README.md", "LICENSE", "LICENSE.md", "CHANGELOG.md", "QUICKSTART.md", "docs/QUICKSTART.md"],
                &[],
                &[],
            ),
        ),
        (
            DocumentType::Example,
            spec(&[], &["examples/", "samples/", "sample/"], &[]),
        ),
        (
            DocumentType::UserGuide,
            spec(
                &[],
                &["docs/user/", "docs/guide/"],
                &[r"^docs/.*(user|guide|tutorial|manual|faq|usage)[^/]*\.md$"],
            ),
        ),
        (
            DocumentType::Technical,
            spec(
                &[],
                &["docs/specs/", "docs/technical/", "docs/reference/", "docs/architecture/"],
                &[r"(spec|specification|syntax|architecture|api)[^/]*\.md$"],
            ),
        ),
        (
            DocumentType::Developer,
            spec(
                &["CONTRIBUTING.md", "CODE_OF_CONDUCT.md"],
                &["docs/dev/", "docs/developer/", "dev/"],
                &[r"(contributing|development|roadmap|design)[^/]*\.md$"],
            ),
        ),
    ]
}

impl Default for ClassificationRules {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

impl ClassificationRules {
    /// A table with no rules at all; only hidden paths are excluded.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
            exclude_globs: Vec::new(),
        }
    }

    pub fn extend(&mut self, doc_type: DocumentType, spec: &RuleSpec) -> Result<()> {
        self.rules.entry(doc_type).or_default().extend(spec)
    }

    pub fn add_exclude_glob(&mut self, pattern: &str) -> Result<()> {
        let compiled = Pattern::new(pattern).map_err(|source| DistError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;
        self.exclude_globs.push(compiled);
        Ok(())
    }

    pub fn get(&self, doc_type: DocumentType) -> Option<&RuleSet> {
        self.rules.get(&doc_type)
    }

    /// Exclusion check on a `/`-separated relative path (file or directory).
    pub fn is_excluded(&self, rel: &str) -> bool {
        if HIDDEN_COMPONENT_REGEX.is_match(rel) {
            return true;
        }

        if self
            .get(DocumentType::Exclude)
            .map_or(false, |set| set.matches_any(rel))
        {
            return true;
        }

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.exclude_globs
            .iter()
            .any(|glob| glob.matches_with(rel, options))
    }
}

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
