use crate::classifier::DocumentType;
use crate::error::{DistError, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub const DOCS_DIR: &str = "docs";

/// The fixed directory layout of a distribution.
#[derive(Debug, Clone)]
pub struct DistributionStructure {
    root: PathBuf,
    program_dir_name: String,
}

impl DistributionStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program_dir_name: "kumihan_formatter".to_string(),
        }
    }

    pub fn with_program_dir(mut self, name: impl Into<String>) -> Self {
        self.program_dir_name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(DOCS_DIR)
    }

    pub fn program_dir(&self) -> PathBuf {
        self.root.join(&self.program_dir_name)
    }

    pub fn dir_for(&self, doc_type: DocumentType) -> Option<PathBuf> {
        doc_type
            .conversion_strategy()
            .target
            .map(|target| self.root.join(target))
    }

    /// Every directory of the layout, in creation order.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.root.clone(), self.docs_dir()];
        dirs.extend(DocumentType::all().into_iter().filter_map(|t| self.dir_for(t)));
        dirs.push(self.program_dir());
        dirs
    }

    /// Creates the layout, wiping an existing root first when `clean` is set.
    /// Returns the directories that did not exist before.
    pub fn create(&self, clean: bool) -> Result<Vec<PathBuf>> {
        if clean && self.root.exists() {
            info!("Removing previous distribution at {}", self.root.display());
            fs::remove_dir_all(&self.root).map_err(|e| DistError::io(&self.root, e))?;
        }

        let mut created = Vec::new();
        for dir in self.directories() {
            if dir.is_dir() {
                continue;
            }
            fs::create_dir_all(&dir).map_err(|e| DistError::io(&dir, e))?;
            debug!("Created {}", dir.display());
            created.push(dir);
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_layout() {
        let temp = TempDir::new().unwrap();
        let structure = DistributionStructure::new(temp.path().join("dist_out"));
        let created = structure.create(false).unwrap();

        for sub in ["docs/essential", "docs/user", "docs/developer", "docs/technical", "examples", "kumihan_formatter"] {
            assert!(structure.root().join(sub).is_dir(), "{} missing", sub);
        }
        assert_eq!(created.len(), structure.directories().len());

        // Second run creates nothing new
        assert!(structure.create(false).unwrap().is_empty());
    }

    #[test]
    fn test_clean_removes_old_content() {
        let temp = TempDir::new().unwrap();
        let structure = DistributionStructure::new(temp.path().join("out")).with_program_dir("app");
        structure.create(false).unwrap();
        let stale = structure.root().join("docs/user/old.html");
        fs::write(&stale, "old").unwrap();

        structure.create(true).unwrap();
        assert!(!stale.exists());
        assert!(structure.program_dir().ends_with("app"));
        assert!(structure.program_dir().is_dir());
    }

    #[test]
    fn test_exclude_has_no_dir() {
        let structure = DistributionStructure::new("out");
        assert!(structure.dir_for(DocumentType::Exclude).is_none());
        assert_eq!(
            structure.dir_for(DocumentType::Example),
            Some(PathBuf::from("out/examples"))
        );
    }
}
