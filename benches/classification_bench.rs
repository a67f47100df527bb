use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kumihan_dist::classifier::DocumentClassifier;
use kumihan_dist::distribution::DistributionConverter;

fn bench_document_classifier(c: &mut Criterion) {
    let classifier = DocumentClassifier::new();
    let paths = vec![
        "README.md",
        "docs/user/usage.md",
        "docs/specs/notation.md",
        "docs/dev/testing.md",
        "examples/basic/01-basic.txt",
        "kumihan_formatter/__pycache__/cli.cpython-312.pyc",
        ".github/workflows/ci.yml",
        "docs/tutorial_basics.md",
        "notes.md",
    ];

    c.bench_function("document_classification", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(classifier.classify_relative(black_box(path)));
            }
        });
    });
}

fn bench_markdown_to_text(c: &mut Criterion) {
    let converter = DistributionConverter::new();
    let markdown = r#"# Kumihan-Formatter

**Kumihan-Formatter** は同人作家向けの *組版* ツールです。

## インストール

1. ダウンロードする
2. `setup.bat` を実行する

- Windows: [ガイド](docs/user/windows.md)
- macOS

```
kumihan convert input.txt
```
"#
    .repeat(20);

    c.bench_function("markdown_to_text", |b| {
        b.iter(|| black_box(converter.markdown_to_text(black_box(&markdown))));
    });
}

criterion_group!(benches, bench_document_classifier, bench_markdown_to_text);
criterion_main!(benches);
