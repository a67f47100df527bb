use crate::error::DistError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distribution category assigned to a source file.
///
/// Variant order is the priority order used when several rules of the
/// same kind match one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// README, LICENSE and friends, converted to plain text
    UserEssential,
    /// Sample documents shipped to the user as-is
    Example,
    /// End-user guides, converted to HTML
    UserGuide,
    /// Specifications and reference material
    Technical,
    /// Contributor documentation
    Developer,
    /// Never shipped
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    MarkdownToText,
    MarkdownToHtml,
    CopyAsIs,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStrategy {
    pub kind: ConversionKind,
    /// Target directory relative to the distribution root
    pub target: Option<&'static str>,
}

impl DocumentType {
    pub fn all() -> [DocumentType; 6] {
        [
            DocumentType::UserEssential,
            DocumentType::Example,
            DocumentType::UserGuide,
            DocumentType::Technical,
            DocumentType::Developer,
            DocumentType::Exclude,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::UserEssential => "user_essential",
            DocumentType::Example => "example",
            DocumentType::UserGuide => "user_guide",
            DocumentType::Technical => "technical",
            DocumentType::Developer => "developer",
            DocumentType::Exclude => "exclude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::UserEssential => "必須ドキュメント",
            DocumentType::Example => "サンプルファイル",
            DocumentType::UserGuide => "ユーザーガイド",
            DocumentType::Technical => "技術資料",
            DocumentType::Developer => "開発者向け資料",
            DocumentType::Exclude => "除外",
        }
    }

    pub fn conversion_strategy(&self) -> ConversionStrategy {
        let (kind, target) = match self {
            DocumentType::UserEssential => (ConversionKind::MarkdownToText, Some("docs/essential")),
            DocumentType::UserGuide => (ConversionKind::MarkdownToHtml, Some("docs/user")),
            DocumentType::Developer => (ConversionKind::CopyAsIs, Some("docs/developer")),
            DocumentType::Technical => (ConversionKind::CopyAsIs, Some("docs/technical")),
            DocumentType::Example => (ConversionKind::CopyAsIs, Some("examples")),
            DocumentType::Exclude => (ConversionKind::Skip, None),
        };
        ConversionStrategy { kind, target }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        DocumentType::all()
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DistError::UnknownDocumentType(s.to_string()))
    }
}
