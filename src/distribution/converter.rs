use crate::classifier::ConversionKind;
use crate::error::{DistError, Result};
use crate::ui::Theme;
use html_escape::encode_text;
use log::{debug, warn};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

static HTML_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->").unwrap()
});

static FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(```|~~~)").unwrap()
});

static HR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s{0,3}(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").unwrap()
});

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").unwrap()
});

static FIRST_H1_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s{0,3}#\s+(.+?)\s*$").unwrap()
});

static BLOCKQUOTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*>\s?(.*)$").unwrap()
});

static LIST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)[-*+]\s+(.*)$").unwrap()
});

static IMAGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap()
});

static LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[([^\]]+)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).unwrap()
});

static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`([^`]+)`").unwrap()
});

static BOLD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").unwrap()
});

static ITALIC_STAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^*\s][^*]*)\*").unwrap()
});

// Leaves snake_case identifiers alone
static ITALIC_UNDERSCORE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\W)_([^_\s][^_]*)_(\W|$)").unwrap()
});

static STRIKE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"~~(.+?)~~").unwrap()
});

const RULE_WIDTH: usize = 40;

fn default_filenames() -> BTreeMap<String, String> {
    [
        ("README.md", "はじめにお読みください"),
        ("CHANGELOG.md", "更新履歴"),
        ("LICENSE", "ライセンス"),
        ("LICENSE.md", "ライセンス"),
        ("QUICKSTART.md", "クイックスタート"),
        ("CONTRIBUTING.md", "開発への参加方法"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Converts documents into the formats shipped to end users.
#[derive(Debug, Clone)]
pub struct DistributionConverter {
    theme: Theme,
    filenames: BTreeMap<String, String>,
}

impl Default for DistributionConverter {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            filenames: default_filenames(),
        }
    }
}

impl DistributionConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Adds or replaces entries of the friendly-name table.
    pub fn with_filenames(mut self, overrides: &BTreeMap<String, String>) -> Self {
        self.filenames
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn markdown_to_text(&self, markdown: &str) -> String {
        let without_comments = HTML_COMMENT_REGEX.replace_all(markdown, "");
        let mut lines: Vec<String> = Vec::new();
        let mut in_fence = false;

        for line in without_comments.lines() {
            if FENCE_REGEX.is_match(line) {
                in_fence = !in_fence;
                continue;
            }

            if in_fence {
                lines.push(format!("    {}", line));
                continue;
            }

            if HR_REGEX.is_match(line) {
                lines.push("─".repeat(RULE_WIDTH));
                continue;
            }

            if let Some(caps) = HEADING_REGEX.captures(line) {
                let title = strip_inline(&caps[2]);
                let heading = match caps[1].len() {
                    1 => format!("【{}】", title),
                    2 => format!("■ {}", title),
                    _ => format!("● {}", title),
                };
                lines.push(heading);
                continue;
            }

            let quoted = match BLOCKQUOTE_REGEX.captures(line) {
                Some(caps) => format!("  {}", &caps[1]),
                None => line.to_string(),
            };
            let listed = LIST_REGEX
                .captures(&quoted)
                .map(|caps| format!("{}・{}", &caps[1], &caps[2]));

            lines.push(strip_inline(listed.as_deref().unwrap_or(&quoted)));
        }

        collapse_blank_lines(&lines)
    }

    pub fn markdown_to_html(&self, markdown: &str, title: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, options);
        let mut body = String::new();
        html::push_html(&mut body, parser);

        render_page(&self.theme, title, &body)
    }

    /// Output file name for `source_name` converted with `kind`.
    pub fn friendly_name(&self, source_name: &str, kind: ConversionKind) -> String {
        let extension = match kind {
            ConversionKind::MarkdownToText => "txt",
            ConversionKind::MarkdownToHtml => "html",
            ConversionKind::CopyAsIs | ConversionKind::Skip => return source_name.to_string(),
        };

        let base = self.filenames.get(source_name).cloned().unwrap_or_else(|| {
            Path::new(source_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_name.to_string())
        });

        if base.ends_with(&format!(".{}", extension)) {
            base
        } else {
            format!("{}.{}", base, extension)
        }
    }

    /// Converts `src` into `dest_dir` under its friendly name.
    pub fn convert_file(&self, src: &Path, dest_dir: &Path, kind: ConversionKind) -> Result<PathBuf> {
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dest = dest_dir.join(self.friendly_name(&name, kind));
        self.convert_to(src, &dest, kind)?;
        Ok(dest)
    }

    /// Converts (or copies) `src` into exactly `dest`.
    pub fn convert_to(&self, src: &Path, dest: &Path, kind: ConversionKind) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| DistError::io(parent, e))?;
        }

        match kind {
            ConversionKind::Skip => return Ok(()),
            ConversionKind::CopyAsIs => {
                fs::copy(src, dest).map_err(|e| DistError::io(src, e))?;
                return Ok(());
            }
            ConversionKind::MarkdownToText | ConversionKind::MarkdownToHtml => {}
        }

        let markdown = read_lossy(src)?;
        let output = if kind == ConversionKind::MarkdownToText {
            self.markdown_to_text(&markdown)
        } else {
            let title = document_title(&markdown, src);
            self.markdown_to_html(&markdown, &title)
        };

        fs::write(dest, output).map_err(|e| DistError::io(dest, e))?;
        debug!("Converted {} -> {}", src.display(), dest.display());
        Ok(())
    }
}

/// First level-1 heading, or the file stem.
pub fn document_title(markdown: &str, path: &Path) -> String {
    FIRST_H1_REGEX
        .captures(markdown)
        .map(|caps| strip_inline(&caps[1]))
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

pub(crate) fn render_page(theme: &Theme, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        encode_text(title),
        theme.stylesheet(),
        body
    )
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| DistError::io(path, e))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            warn!("{} is not valid UTF-8; invalid bytes replaced", path.display());
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

fn strip_inline(text: &str) -> String {
    let text = IMAGE_REGEX.replace_all(text, "[画像: $1]");
    let text = LINK_REGEX.replace_all(&text, |caps: &Captures| {
        if caps[1] == caps[2] {
            caps[2].to_string()
        } else {
            format!("{} ({})", &caps[1], &caps[2])
        }
    });
    let text = INLINE_CODE_REGEX.replace_all(&text, "$1");
    let text = BOLD_REGEX.replace_all(&text, "${1}${2}");
    let text = ITALIC_STAR_REGEX.replace_all(&text, "$1");
    let text = strip_underscore_italics(&text);
    let text = STRIKE_REGEX.replace_all(&text, "$1");
    text.into_owned()
}

// Each match consumes its neighbouring delimiters, so adjacent spans
// need another pass. Every replacement drops two underscores.
fn strip_underscore_italics(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ITALIC_UNDERSCORE_REGEX
            .replace_all(&current, "${1}${2}${3}")
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse_blank_lines(lines: &[String]) -> String {
    let mut out = String::new();
    let mut previous_blank = true;

    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            if !previous_blank {
                out.push('\n');
            }
            previous_blank = true;
        } else {
            out.push_str(line);
            out.push('\n');
            previous_blank = false;
        }
    }

    // Drop a trailing blank separator
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        let converter = DistributionConverter::new();
        let text = converter.markdown_to_text("# Kumihan\n\n## 使い方\n\n### 詳細 ###\n");
        assert_eq!(text, "【Kumihan】\n\n■ 使い方\n\n● 詳細\n");
    }

    #[test]
    fn test_inline_markup_is_stripped() {
        let converter = DistributionConverter::new();
        let text = converter.markdown_to_text(
            "**太字** と *斜体* と `code` と ~~削除~~ と snake_case_name",
        );
        assert_eq!(text, "太字 と 斜体 と code と 削除 と snake_case_name\n");
        assert_eq!(converter.markdown_to_text("_a_ _b_"), "a b\n");
        assert_eq!(converter.markdown_to_text("(_x_,_y_,_z_)"), "(x,y,z)\n");
    }

    #[test]
    fn test_links_and_images() {
        let converter = DistributionConverter::new();
        let text = converter.markdown_to_text(
            "[公式サイト](https://example.com) ![スクリーンショット](img/shot.png) [https://a.jp](https://a.jp)",
        );
        assert_eq!(
            text,
            "公式サイト (https://example.com) [画像: スクリーンショット] https://a.jp\n"
        );
    }

    #[test]
    fn test_lists_quotes_and_rules() {
        let converter = DistributionConverter::new();
        let text = converter.markdown_to_text("- one\n  * two\n1. three\n> quoted\n---\n");
        let expected = format!("・one\n  ・two\n1. three\n  quoted\n{}\n", "─".repeat(40));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_code_fence_contents_are_indented() {
        let converter = DistributionConverter::new();
        let text = converter.markdown_to_text("前\n```bash\n# not a heading\n```\n後\n");
        assert_eq!(text, "前\n    # not a heading\n後\n");
    }

    #[test]
    fn test_blank_lines_and_comments_collapse() {
        let converter = DistributionConverter::new();
        let text = converter.markdown_to_text("\n\na\n\n\n\n<!-- hidden\nnote -->\nb   \n\n\n");
        assert_eq!(text, "a\n\nb\n");
        assert_eq!(converter.markdown_to_text(""), "");
    }

    #[test]
    fn test_friendly_names() {
        let converter = DistributionConverter::new();
        assert_eq!(
            converter.friendly_name("README.md", ConversionKind::MarkdownToText),
            "はじめにお読みください.txt"
        );
        assert_eq!(converter.friendly_name("LICENSE", ConversionKind::MarkdownToText), "ライセンス.txt");
        assert_eq!(converter.friendly_name("usage.md", ConversionKind::MarkdownToHtml), "usage.html");
        assert_eq!(converter.friendly_name("sample.txt", ConversionKind::CopyAsIs), "sample.txt");
    }

    #[test]
    fn test_filename_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("usage.md".to_string(), "使い方".to_string());
        let converter = DistributionConverter::new().with_filenames(&overrides);
        assert_eq!(converter.friendly_name("usage.md", ConversionKind::MarkdownToHtml), "使い方.html");
        assert_eq!(
            converter.friendly_name("README.md", ConversionKind::MarkdownToHtml),
            "はじめにお読みください.html"
        );
    }

    #[test]
    fn test_html_document() {
        let converter = DistributionConverter::new();
        let html = converter.markdown_to_html("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n", "A & B");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"ja\">"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title("intro\n# **Guide**\n", Path::new("x/usage.md")), "Guide");
        assert_eq!(document_title("## only h2\n", Path::new("x/usage.md")), "usage");
    }
}
