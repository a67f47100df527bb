use crate::classifier::{Classification, DocumentType};
use crate::distribution::{DistributionStats, PlannedAction};
use colored::*;

pub fn print_classification(classification: &Classification, show_excluded: bool) {
    println!("{}", "Document classification".bold().blue());
    println!("{}", "=======================".blue());

    for (doc_type, paths) in classification.iter() {
        if paths.is_empty() || (doc_type == DocumentType::Exclude && !show_excluded) {
            continue;
        }
        println!(
            "\n{} {} ({})",
            doc_type.label().bold(),
            format!("[{}]", doc_type.as_str()).dimmed(),
            paths.len()
        );
        for path in paths {
            println!("  {}", path.display());
        }
    }

    println!("\nTotal: {} files", classification.total());
}

pub fn print_plan(actions: &[PlannedAction]) {
    println!("{}", "Planned actions (dry run)".bold().yellow());
    for action in actions {
        println!(
            "  {:<18} {} -> {}",
            format!("{:?}", action.kind),
            action.source.display(),
            action.destination.display()
        );
    }
    println!("{} files would be written", actions.len());
}

pub fn print_stats(stats: &DistributionStats) {
    println!("\n{} {}", "✓".green(), format!("Distribution created in {}", stats.output.display()).green());

    for doc_type in DocumentType::all() {
        let count = stats.by_type.get(&doc_type).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:<20} {}", doc_type.label(), count);
        }
    }

    println!(
        "  text: {}  html: {}  copied: {}  program: {}",
        stats.converted_to_text, stats.converted_to_html, stats.copied, stats.program_files
    );

    if let Some(archive) = &stats.archive {
        println!("  archive: {}", archive.display());
    }

    if !stats.errors.is_empty() {
        println!("{} {}", "⚠️ ".yellow(), format!("{} files failed", stats.errors.len()).yellow());
        for error in &stats.errors {
            eprintln!("  {} {}: {}", "✗".red(), error.file.display(), error.message);
            if !error.context.is_empty() {
                eprintln!("      at {}", error.context.join(" > "));
            }
        }
    }
}
