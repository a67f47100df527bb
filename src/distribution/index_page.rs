use super::converter::render_page;
use super::stats::{DistributionStats, ProducedFile};
use crate::classifier::DocumentType;
use crate::ui::Theme;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::path::Path;

pub const INDEX_FILE_NAME: &str = "index.html";

/// Relative link with `/` separators.
fn href(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn render_index(theme: &Theme, stats: &DistributionStats, produced: &[ProducedFile], info_file: &str) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Kumihan-Formatter 配布パッケージ</h1>");
    let _ = writeln!(
        body,
        "<p>まずは <a href=\"{}\">{}</a> をご覧ください。</p>",
        encode_double_quoted_attribute(info_file),
        encode_text(info_file)
    );

    for doc_type in DocumentType::all() {
        let mut files: Vec<_> = produced.iter().filter(|f| f.doc_type == doc_type).collect();
        if files.is_empty() {
            continue;
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let _ = writeln!(body, "<h2>{}</h2>", encode_text(doc_type.label()));
        let _ = writeln!(body, "<ul>");
        for file in files {
            let link = href(&file.path);
            let _ = writeln!(
                body,
                "<li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(&link),
                encode_text(&link)
            );
        }
        let _ = writeln!(body, "</ul>");
    }

    let _ = writeln!(body, "<h2>統計</h2>");
    let _ = writeln!(body, "<table>");
    let rows = [
        ("分類されたファイル", stats.total_files),
        ("テキスト変換", stats.converted_to_text),
        ("HTML変換", stats.converted_to_html),
        ("コピー", stats.copied),
        ("プログラムファイル", stats.program_files),
        ("除外", stats.excluded),
        ("エラー", stats.errors.len()),
    ];
    for (label, value) in rows {
        let _ = writeln!(body, "<tr><th>{}</th><td>{}</td></tr>", label, value);
    }
    let _ = writeln!(body, "</table>");
    let _ = writeln!(
        body,
        "<p><small>生成日時: {}</small></p>",
        stats.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    render_page(theme, "Kumihan-Formatter 配布パッケージ", &body)
}
