pub mod document_type;
pub mod rules;
pub mod doc_classifier;

pub use document_type::{DocumentType, ConversionKind, ConversionStrategy};
pub use rules::{ClassificationRules, RuleSet, RuleSpec};
pub use doc_classifier::{DocumentClassifier, Classification, relative_path};
