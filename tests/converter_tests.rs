use kumihan_dist::classifier::ConversionKind;
use kumihan_dist::distribution::DistributionConverter;
use kumihan_dist::ui::Theme;
use std::fs;
use tempfile::TempDir;

const README: &str = r#"# Kumihan-Formatter

**Kumihan-Formatter** は同人作家向けの *組版* ツールです。

## インストール

1. ダウンロードする
2. `setup.bat` を実行する

- Windows: [ガイド](docs/user/windows.md)
- macOS

```
kumihan convert input.txt
```

---
"#;

#[test]
fn test_readme_to_text() {
    let converter = DistributionConverter::new();
    let text = converter.markdown_to_text(README);

    let expected = format!(
        "【Kumihan-Formatter】\n\n\
         Kumihan-Formatter は同人作家向けの 組版 ツールです。\n\n\
         ■ インストール\n\n\
         1. ダウンロードする\n\
         2. setup.bat を実行する\n\n\
         ・Windows: ガイド (docs/user/windows.md)\n\
         ・macOS\n\n    \
         kumihan convert input.txt\n\n\
         {}\n",
        "─".repeat(40)
    );
    assert_eq!(text, expected);
}

#[test]
fn test_convert_file_to_text_uses_friendly_name() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("README.md");
    fs::write(&src, README).unwrap();
    let out = temp.path().join("out");

    let written = DistributionConverter::new()
        .convert_file(&src, &out, ConversionKind::MarkdownToText)
        .unwrap();

    assert_eq!(written, out.join("はじめにお読みください.txt"));
    let content = fs::read_to_string(&written).unwrap();
    assert!(content.starts_with("【Kumihan-Formatter】"));
}

#[test]
fn test_convert_file_to_html_uses_heading_as_title() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("usage.md");
    fs::write(&src, "# 使い方ガイド\n\n本文 <b>です</b>\n").unwrap();

    let written = DistributionConverter::new()
        .with_theme(Theme::Dark)
        .convert_file(&src, temp.path(), ConversionKind::MarkdownToHtml)
        .unwrap();

    assert_eq!(written.file_name().unwrap(), "usage.html");
    let html = fs::read_to_string(&written).unwrap();
    assert!(html.contains("<title>使い方ガイド</title>"));
    assert!(html.contains("<h1>使い方ガイド</h1>"));
    assert!(html.contains(Theme::Dark.background_color()));
}

#[test]
fn test_invalid_utf8_is_converted_lossily() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("broken.md");
    fs::write(&src, b"# Title\n\nbad \xff byte\n").unwrap();

    let written = DistributionConverter::new()
        .convert_file(&src, temp.path(), ConversionKind::MarkdownToText)
        .unwrap();

    let text = fs::read_to_string(written).unwrap();
    assert!(text.contains("【Title】"));
    assert!(text.contains("bad \u{FFFD} byte"));
}

#[test]
fn test_copy_as_is_keeps_bytes() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("sample.txt");
    fs::write(&src, ";;;太字;;;\n見出し\n;;;\n").unwrap();
    let out = temp.path().join("examples/nested");

    let written = DistributionConverter::new()
        .convert_file(&src, &out, ConversionKind::CopyAsIs)
        .unwrap();

    assert_eq!(written, out.join("sample.txt"));
    assert_eq!(fs::read(&written).unwrap(), fs::read(&src).unwrap());
}

#[test]
fn test_missing_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = DistributionConverter::new().convert_file(
        &temp.path().join("missing.md"),
        temp.path(),
        ConversionKind::MarkdownToText,
    );
    assert!(result.is_err());
}
