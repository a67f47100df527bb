use crate::classifier::{ConversionKind, DocumentClassifier};
use crate::config::DistConfig;
use crate::distribution::{DistributionConverter, DistributionManager, DistributionOptions};
use crate::ui::{report, Theme};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "kumihan-dist")]
#[command(version, about = "Build an end-user distribution of Kumihan-Formatter", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Source checkout to package
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "distribution")]
    pub output: PathBuf,

    /// Configuration file (default: SOURCE/kumihan-dist.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (suppress output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Dry run (show what would be done)
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Also pack OUTPUT.tar.gz
    #[arg(long)]
    pub archive: bool,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Classify the documents of a directory without building anything
    Classify {
        /// Directory to classify
        dir: PathBuf,

        /// Print the classification as JSON
        #[arg(long)]
        json: bool,

        /// Also list excluded files
        #[arg(long)]
        all: bool,
    },

    /// Convert a single Markdown file
    Convert {
        /// Markdown file to convert
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Html,
}

impl From<Format> for ConversionKind {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => ConversionKind::MarkdownToText,
            Format::Html => ConversionKind::MarkdownToHtml,
        }
    }
}

pub fn init_logging(args: &Args) {
    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "warn"
    };

    // RUST_LOG still wins over the flags
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

pub fn run(args: Args) -> Result<()> {
    match &args.command {
        Some(Commands::Classify { dir, json, all }) => classify(&args, dir, *json, *all),
        Some(Commands::Convert { file, format, output }) => convert(&args, file, *format, output),
        None => {
            let source = match &args.source {
                Some(source) => source.clone(),
                None => bail!("SOURCE is required unless a subcommand is given"),
            };
            build_distribution(&args, &source)
        }
    }
}

fn load_config(args: &Args, source: &Path) -> Result<DistConfig> {
    DistConfig::discover(args.config.as_deref(), source).context("Failed to load configuration")
}

fn classify(args: &Args, dir: &Path, json: bool, show_excluded: bool) -> Result<()> {
    let config = load_config(args, dir)?;
    let classifier = DocumentClassifier::with_rules(config.classification_rules()?);
    let classification = classifier
        .classify_directory(dir)
        .with_context(|| format!("Failed to classify {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    } else {
        report::print_classification(&classification, show_excluded);
    }

    Ok(())
}

fn convert(args: &Args, file: &Path, format: Format, output: &Path) -> Result<()> {
    let base = file.parent().unwrap_or_else(|| Path::new("."));
    let config = load_config(args, base)?;
    let converter = DistributionConverter::new()
        .with_theme(Theme::from_name(&config.converter.theme))
        .with_filenames(&config.converter.filenames);

    let written = converter
        .convert_file(file, output, format.into())
        .with_context(|| format!("Failed to convert {}", file.display()))?;

    if !args.quiet {
        println!("✓ {} -> {}", file.display(), written.display());
    }

    Ok(())
}

fn build_distribution(args: &Args, source: &Path) -> Result<()> {
    let config = load_config(args, source)?;
    let manager = DistributionManager::new(source, &args.output, config);

    if args.dry_run {
        let actions = manager
            .plan()
            .with_context(|| format!("Failed to plan distribution of {}", source.display()))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&actions)?);
        } else if !args.quiet {
            report::print_plan(&actions);
        }
        return Ok(());
    }

    let options = DistributionOptions {
        clean: args.clean,
        archive: args.archive,
        show_progress: !args.quiet && !args.json,
    };

    let stats = manager
        .create_distribution(&options)
        .with_context(|| format!("Failed to build distribution from {}", source.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if !args.quiet {
        report::print_stats(&stats);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_args() {
        let args = Args::try_parse_from(["kumihan-dist", "repo", "-o", "out", "--clean", "-n"]).unwrap();
        assert_eq!(args.source, Some(PathBuf::from("repo")));
        assert_eq!(args.output, PathBuf::from("out"));
        assert!(args.clean);
        assert!(args.dry_run);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_parse_convert_subcommand() {
        let args = Args::try_parse_from(["kumihan-dist", "convert", "README.md", "--format", "html", "-v"]).unwrap();
        match args.command {
            Some(Commands::Convert { file, format, output }) => {
                assert_eq!(file, PathBuf::from("README.md"));
                assert_eq!(format, Format::Html);
                assert_eq!(output, PathBuf::from("."));
            }
            other => panic!("Expected convert command, got {:?}", other),
        }
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let args = Args::try_parse_from(["kumihan-dist"]).unwrap();
        assert!(run(args).is_err());
    }
}
