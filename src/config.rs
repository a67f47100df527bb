use crate::classifier::{ClassificationRules, DocumentType, RuleSpec};
use crate::error::{DistError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the source root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "kumihan-dist.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistConfig {
    pub program: ProgramConfig,
    pub classifier: ClassifierConfig,
    pub converter: ConverterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Directory name of the program inside the distribution
    pub dir_name: String,
    /// Source directories copied into the program directory
    pub dirs: Vec<String>,
    /// Top-level files (globs) copied into the distribution root
    pub files: Vec<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            dir_name: "kumihan_formatter".to_string(),
            dirs: vec!["kumihan_formatter".to_string()],
            files: vec![
                "pyproject.toml".to_string(),
                "setup.py".to_string(),
                "requirements.txt".to_string(),
                "*.bat".to_string(),
                "*.command".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub exclude_globs: Vec<String>,
    /// Extra rules keyed by document type id (e.g. `user_guide`)
    pub rules: BTreeMap<String, RuleSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub theme: String,
    /// Overrides for the friendly-name table, keyed by source file name
    pub filenames: BTreeMap<String, String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            filenames: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub info_file_name: String,
    pub archive: bool,
    pub clean: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            info_file_name: "配布情報.txt".to_string(),
            archive: false,
            clean: false,
        }
    }
}

impl DistConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DistConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DistError::io(path, e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Explicit path if given, else `kumihan-dist.toml` in `source`, else defaults.
    pub fn discover(explicit: Option<&Path>, source: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate: PathBuf = source.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let name = self.program.dir_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DistError::Config(format!(
                "program.dir_name must be a plain directory name, got '{}'",
                self.program.dir_name
            )));
        }

        if self.output.info_file_name.trim().is_empty() {
            return Err(DistError::Config("output.info_file_name must not be empty".to_string()));
        }

        for key in self.classifier.rules.keys() {
            key.parse::<DocumentType>()?;
        }

        Ok(())
    }

    /// Default rules extended with the configured ones.
    pub fn classification_rules(&self) -> Result<ClassificationRules> {
        let mut rules = ClassificationRules::default();

        for (key, spec) in &self.classifier.rules {
            let doc_type: DocumentType = key.parse()?;
            rules.extend(doc_type, spec)?;
        }

        for glob in &self.classifier.exclude_globs {
            rules.add_exclude_glob(glob)?;
        }

        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DistConfig::from_toml_str("").unwrap();
        assert_eq!(config.program.dir_name, "kumihan_formatter");
        assert_eq!(config.output.info_file_name, "配布情報.txt");
        assert_eq!(config.converter.theme, "light");
        assert!(!config.output.archive);
    }

    #[test]
    fn test_extra_rules() {
        let config = DistConfig::from_toml_str(
            r#"
[classifier]
exclude_globs = ["drafts/**"]

[classifier.rules.technical]
prefixes = ["docs/format"]
"#,
        )
        .unwrap();

        let rules = config.classification_rules().unwrap();
        assert!(rules
            .get(DocumentType::Technical)
            .unwrap()
            .matching_prefix("docs/format/blocks.md")
            .is_some());
        assert!(rules.is_excluded("drafts/new.md"));
    }

    #[test]
    fn test_unknown_rule_type_rejected() {
        let err = DistConfig::from_toml_str("[classifier.rules.novel]\nfiles = [\"a.md\"]\n").unwrap_err();
        assert!(matches!(err, DistError::UnknownDocumentType(_)));
    }

    #[test]
    fn test_bad_program_dir_rejected() {
        let err = DistConfig::from_toml_str("[program]\ndir_name = \"a/b\"\n").unwrap_err();
        assert!(matches!(err, DistError::Config(_)));
    }
}
