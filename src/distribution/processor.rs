use super::converter::DistributionConverter;
use super::stats::{DistributionStats, ErrorRecord, ProcessReport, ProducedFile, ProgramCopy};
use super::structure::DistributionStructure;
use crate::classifier::{relative_path, Classification, ConversionKind, DocumentClassifier, DocumentType};
use crate::config::ProgramConfig;
use crate::context::ContextTracker;
use crate::error::{DistError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file operation of a distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAction {
    /// Path relative to the source root
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: ConversionKind,
    pub doc_type: DocumentType,
}

pub struct DistributionProcessor {
    structure: DistributionStructure,
    converter: DistributionConverter,
    classifier: DocumentClassifier,
    tracker: ContextTracker,
    show_progress: bool,
    reserved_names: Vec<String>,
}

impl DistributionProcessor {
    pub fn new(structure: DistributionStructure, converter: DistributionConverter) -> Self {
        Self {
            structure,
            converter,
            classifier: DocumentClassifier::new(),
            tracker: ContextTracker::new(),
            show_progress: false,
            reserved_names: Vec::new(),
        }
    }

    /// Classifier whose prefix rules decide which sub-paths copies keep.
    pub fn with_classifier(mut self, classifier: DocumentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_tracker(mut self, tracker: ContextTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Root file names written by the pipeline itself. Program files with
    /// these names are stored under a suffixed name instead.
    pub fn with_reserved_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn structure(&self) -> &DistributionStructure {
        &self.structure
    }

    pub fn plan(&self, classification: &Classification) -> Vec<PlannedAction> {
        let mut actions = Vec::new();
        let mut used: HashSet<PathBuf> = HashSet::new();

        for (doc_type, paths) in classification.iter() {
            let strategy = doc_type.conversion_strategy();
            let target_dir = match (strategy.kind, self.structure.dir_for(doc_type)) {
                (ConversionKind::Skip, _) | (_, None) => continue,
                (_, Some(dir)) => dir,
            };

            for source in paths {
                let rel = relative_path(source, Path::new(""));
                let file_name = source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| rel.clone());

                let destination = match strategy.kind {
                    ConversionKind::CopyAsIs => {
                        let sub = self
                            .classifier
                            .matched_prefix(&rel, doc_type)
                            .map(|prefix| rel[prefix.len()..].to_string())
                            .unwrap_or(file_name);
                        target_dir.join(sub)
                    }
                    kind => target_dir.join(self.converter.friendly_name(&file_name, kind)),
                };

                actions.push(PlannedAction {
                    source: source.clone(),
                    destination: unique_destination(destination, &mut used),
                    kind: strategy.kind,
                    doc_type,
                });
            }
        }

        actions
    }

    /// Runs the plan. Failures are logged and recorded; the run continues.
    pub fn process(&self, source_root: &Path, classification: &Classification) -> ProcessReport {
        let _run = self.tracker.enter("process documents", source_root.display().to_string());
        let actions = self.plan(classification);
        let progress = self.progress_bar(actions.len() as u64);
        let mut report = ProcessReport::default();

        for action in &actions {
            let source_display = action.source.display().to_string();
            progress.set_message(source_display.clone());
            let _file = self.tracker.enter(verb(action.kind), source_display);

            match self
                .converter
                .convert_to(&source_root.join(&action.source), &action.destination, action.kind)
            {
                Ok(()) => self.record_success(&mut report, action),
                Err(err) => {
                    warn!("Failed to process {}: {}", action.source.display(), err);
                    report.errors.push(ErrorRecord {
                        file: action.source.clone(),
                        message: err.to_string(),
                        context: self.tracker.snapshot(),
                    });
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Processed {} documents ({} errors)",
            actions.len() - report.errors.len(),
            report.errors.len()
        );
        report
    }

    fn record_success(&self, report: &mut ProcessReport, action: &PlannedAction) {
        match action.kind {
            ConversionKind::MarkdownToText => report.converted_to_text += 1,
            ConversionKind::MarkdownToHtml => report.converted_to_html += 1,
            ConversionKind::CopyAsIs => report.copied += 1,
            ConversionKind::Skip => return,
        }
        *report.by_type.entry(action.doc_type).or_default() += 1;

        let path = action
            .destination
            .strip_prefix(self.structure.root())
            .unwrap_or(&action.destination)
            .to_path_buf();
        report.produced.push(ProducedFile {
            doc_type: action.doc_type,
            path,
        });
    }

    /// Copies the program directories into the program dir and the
    /// top-level program files into the distribution root.
    pub fn copy_program_files(&self, source_root: &Path, program: &ProgramConfig) -> Result<ProgramCopy> {
        let _run = self.tracker.enter("copy program files", source_root.display().to_string());
        let mut outcome = ProgramCopy::default();
        let program_dir = self.structure.program_dir();

        for dir in &program.dirs {
            let src_dir = source_root.join(dir);
            if !src_dir.is_dir() {
                warn!("Program directory {} not found, skipping", src_dir.display());
                continue;
            }

            let _dir = self.tracker.enter("walk program directory", dir.clone());
            let rules = self.classifier.rules();
            let walker = WalkDir::new(&src_dir).into_iter().filter_entry(|entry| {
                entry.depth() == 0 || !rules.is_excluded(&relative_path(entry.path(), source_root))
            });

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        let file = err
                            .path()
                            .map(|p| relative_path(p, source_root))
                            .unwrap_or_else(|| dir.clone());
                        warn!("Failed to read {}: {}", file, err);
                        outcome.errors.push(ErrorRecord {
                            file: PathBuf::from(file),
                            message: DistError::from(err).to_string(),
                            context: self.tracker.snapshot(),
                        });
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let inner = entry.path().strip_prefix(&src_dir).unwrap_or(entry.path());
                self.copy_one(entry.path(), &program_dir.join(inner), source_root, &mut outcome);
            }
        }

        let root = self.structure.root();
        let mut taken: HashSet<PathBuf> = self.reserved_names.iter().map(|name| root.join(name)).collect();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let escaped_root = glob::Pattern::escape(&source_root.to_string_lossy());
        for pattern in &program.files {
            let full = format!("{}/{}", escaped_root, pattern);
            let paths = glob::glob(&full).map_err(|source| DistError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;

            for path in paths {
                let path = match path {
                    Ok(path) => path,
                    Err(err) => {
                        warn!("Unreadable path while matching {}: {}", pattern, err);
                        outcome.errors.push(ErrorRecord {
                            file: PathBuf::from(relative_path(err.path(), source_root)),
                            message: err.to_string(),
                            context: self.tracker.snapshot(),
                        });
                        continue;
                    }
                };
                // Overlapping patterns may match the same file twice
                if !path.is_file() || !seen.insert(path.clone()) {
                    continue;
                }
                if let Some(name) = path.file_name() {
                    let wanted = root.join(name);
                    let dest = unique_destination(wanted.clone(), &mut taken);
                    if dest != wanted {
                        warn!(
                            "{} clashes with a generated file, copied as {}",
                            path.display(),
                            dest.display()
                        );
                    }
                    self.copy_one(&path, &dest, source_root, &mut outcome);
                }
            }
        }

        info!("Copied {} program files", outcome.copied);
        Ok(outcome)
    }

    fn copy_one(&self, src: &Path, dest: &Path, source_root: &Path, outcome: &mut ProgramCopy) {
        let _file = self.tracker.enter("copy", relative_path(src, source_root));
        let result = dest
            .parent()
            .map_or(Ok(()), |parent| fs::create_dir_all(parent).map_err(|e| DistError::io(parent, e)))
            .and_then(|_| fs::copy(src, dest).map_err(|e| DistError::io(src, e)));

        match result {
            Ok(_) => {
                debug!("Copied {}", dest.display());
                outcome.copied += 1;
            }
            Err(err) => {
                warn!("Failed to copy {}: {}", src.display(), err);
                outcome.errors.push(ErrorRecord {
                    file: PathBuf::from(relative_path(src, source_root)),
                    message: err.to_string(),
                    context: self.tracker.snapshot(),
                });
            }
        }
    }

    /// Writes the plain-text summary into the distribution root.
    pub fn write_info_file(&self, stats: &DistributionStats, file_name: &str) -> Result<PathBuf> {
        let path = self.structure.root().join(file_name);
        fs::write(&path, render_info(stats)).map_err(|e| DistError::io(&path, e))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        progress.set_style(style);
        progress
    }
}

fn verb(kind: ConversionKind) -> &'static str {
    match kind {
        ConversionKind::MarkdownToText => "convert to text",
        ConversionKind::MarkdownToHtml => "convert to html",
        ConversionKind::CopyAsIs => "copy",
        ConversionKind::Skip => "skip",
    }
}

/// `dest`, or `stem_2.ext`, `stem_3.ext`, ... if already taken.
fn unique_destination(dest: PathBuf, used: &mut HashSet<PathBuf>) -> PathBuf {
    if used.insert(dest.clone()) {
        return dest;
    }

    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = dest.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 2;
    loop {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        let candidate = dest.with_file_name(name);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

pub fn render_info(stats: &DistributionStats) -> String {
    let mut out = String::new();
    let rule = "=".repeat(40);

    let _ = writeln!(out, "Kumihan-Formatter 配布パッケージ情報");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "生成日時: {}", stats.generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "ソース: {}", stats.source.display());
    let _ = writeln!(out, "出力先: {}", stats.output.display());
    let _ = writeln!(out);

    let _ = writeln!(out, "■ ドキュメント分類 (合計 {} 件)", stats.total_files);
    for doc_type in DocumentType::all() {
        let count = stats.by_type.get(&doc_type).copied().unwrap_or(0);
        let _ = writeln!(out, "  {} ({}): {}", doc_type.label(), doc_type.as_str(), count);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "■ 処理結果");
    let _ = writeln!(out, "  テキスト変換: {}", stats.converted_to_text);
    let _ = writeln!(out, "  HTML変換: {}", stats.converted_to_html);
    let _ = writeln!(out, "  コピー: {}", stats.copied);
    let _ = writeln!(out, "  プログラムファイル: {}", stats.program_files);
    let _ = writeln!(out, "  除外: {}", stats.excluded);

    if !stats.errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "■ エラー ({} 件)", stats.errors.len());
        for error in &stats.errors {
            let _ = writeln!(out, "  - {}: {}", error.file.display(), error.message);
        }
    }

    out
}
