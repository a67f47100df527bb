use super::archive::pack_tar_gz;
use super::converter::DistributionConverter;
use super::index_page::{render_index, INDEX_FILE_NAME};
use super::processor::{DistributionProcessor, PlannedAction};
use super::stats::DistributionStats;
use super::structure::DistributionStructure;
use crate::classifier::{Classification, DocumentClassifier};
use crate::config::DistConfig;
use crate::context::ContextTracker;
use crate::error::{DistError, Result};
use crate::ui::Theme;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct DistributionOptions {
    /// Remove an existing output directory first
    pub clean: bool,
    /// Also pack `<output>.tar.gz`
    pub archive: bool,
    pub show_progress: bool,
}

/// Runs the whole packaging pipeline for one source tree.
pub struct DistributionManager {
    source: PathBuf,
    output: PathBuf,
    config: DistConfig,
    tracker: ContextTracker,
}

impl DistributionManager {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>, config: DistConfig) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            config,
            tracker: ContextTracker::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn config(&self) -> &DistConfig {
        &self.config
    }

    fn classifier(&self) -> Result<DocumentClassifier> {
        Ok(DocumentClassifier::with_rules(self.config.classification_rules()?))
    }

    fn structure(&self) -> DistributionStructure {
        DistributionStructure::new(&self.output).with_program_dir(&self.config.program.dir_name)
    }

    fn converter(&self) -> DistributionConverter {
        DistributionConverter::new()
            .with_theme(Theme::from_name(&self.config.converter.theme))
            .with_filenames(&self.config.converter.filenames)
    }

    fn validate_source(&self) -> Result<()> {
        if self.source.is_dir() {
            Ok(())
        } else {
            Err(DistError::SourceNotFound(self.source.clone()))
        }
    }

    /// Output directory as seen from the source walk, if it is nested inside it.
    fn nested_output(&self) -> Vec<PathBuf> {
        let (source, output) = match (absolutize(&self.source), absolutize(&self.output)) {
            (Some(s), Some(o)) => (s, o),
            _ => return Vec::new(),
        };

        match output.strip_prefix(&source) {
            Ok(rel) if !rel.as_os_str().is_empty() => vec![self.source.join(rel)],
            _ => Vec::new(),
        }
    }

    /// Paths the document walk never enters: a nested output directory and
    /// the program directories, which ship whole through the program copy.
    fn walk_skips(&self) -> Vec<PathBuf> {
        let mut skip = self.nested_output();
        skip.extend(self.config.program.dirs.iter().map(|dir| self.source.join(dir)));
        skip
    }

    pub fn classify(&self) -> Result<Classification> {
        self.validate_source()?;
        let _step = self.tracker.enter("classify", self.source.display().to_string());
        self.classifier()?
            .classify_directory_skipping(&self.source, &self.walk_skips())
    }

    /// Dry run: what would be written, without touching the output.
    pub fn plan(&self) -> Result<Vec<PlannedAction>> {
        let classification = self.classify()?;
        let processor = DistributionProcessor::new(self.structure(), self.converter())
            .with_classifier(self.classifier()?);
        Ok(processor.plan(&classification))
    }

    pub fn create_distribution(&self, options: &DistributionOptions) -> Result<DistributionStats> {
        self.validate_source()?;
        let _run = self.tracker.enter("create distribution", self.output.display().to_string());
        info!(
            "Building distribution from {} into {}",
            self.source.display(),
            self.output.display()
        );

        let mut stats = DistributionStats::new(&self.source, &self.output);
        let structure = self.structure();
        let clean = options.clean || self.config.output.clean;
        structure.create(clean)?;

        let classification = self.classify()?;
        stats.record_classification(&classification);
        debug!("Classification summary: {:?}", classification.summary());

        let info_file = &self.config.output.info_file_name;
        let processor = DistributionProcessor::new(structure.clone(), self.converter())
            .with_classifier(self.classifier()?)
            .with_tracker(self.tracker.clone())
            .with_progress(options.show_progress)
            .with_reserved_names([INDEX_FILE_NAME, info_file.as_str()]);

        let report = processor.process(&self.source, &classification);
        stats.record_processing(&report);

        let program = processor.copy_program_files(&self.source, &self.config.program)?;
        stats.record_program_copy(&program);

        processor.write_info_file(&stats, info_file)?;

        let index_path = structure.root().join(INDEX_FILE_NAME);
        let theme = Theme::from_name(&self.config.converter.theme);
        fs::write(&index_path, render_index(&theme, &stats, &report.produced, info_file))
            .map_err(|e| DistError::io(&index_path, e))?;

        if options.archive || self.config.output.archive {
            let dest = archive_path(&self.output);
            stats.archive = Some(pack_tar_gz(&self.output, &dest)?);
        }

        if !stats.errors.is_empty() {
            warn!("Distribution finished with {} errors", stats.errors.len());
        }
        info!(
            "Distribution ready: {} documents, {} program files",
            stats.shipped_documents(),
            stats.program_files
        );

        Ok(stats)
    }
}

/// `<output>.tar.gz`, next to the output directory.
pub fn archive_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "distribution".to_string());
    output.with_file_name(format!("{}.tar.gz", name))
}

fn absolutize(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path) {
        return Some(canonical);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path.file_name()?;
    fs::canonicalize(parent).ok().map(|p| p.join(name))
}
