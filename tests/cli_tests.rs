use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    write(&repo, "README.md", "# Kumihan\n");
    write(&repo, "docs/user/usage.md", "# Usage\n");
    write(&repo, "examples/a.txt", "sample\n");
    write(&repo, "kumihan_formatter/cli.py", "print('hi')\n");
    temp
}

#[test]
fn test_build_distribution_json() {
    let temp = sample_repo();
    let out = temp.path().join("out");

    Command::cargo_bin("kumihan-dist")
        .unwrap()
        .arg(temp.path().join("repo"))
        .arg("-o")
        .arg(&out)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"converted_to_text\": 1"))
        .stdout(predicate::str::contains("\"user_essential\": 1"));

    assert!(out.join("index.html").is_file());
}

#[test]
fn test_dry_run_lists_plan() {
    let temp = sample_repo();
    let out = temp.path().join("out");

    Command::cargo_bin("kumihan-dist")
        .unwrap()
        .arg(temp.path().join("repo"))
        .arg("-o")
        .arg(&out)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 files would be written"));

    assert!(!out.exists());
}

#[test]
fn test_classify_subcommand() {
    let temp = sample_repo();

    Command::cargo_bin("kumihan-dist")
        .unwrap()
        .arg("classify")
        .arg(temp.path().join("repo"))
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"user_guide\""))
        .stdout(predicate::str::contains("docs/user/usage.md"));
}

#[test]
fn test_convert_subcommand() {
    let temp = sample_repo();
    let out = temp.path().join("converted");

    Command::cargo_bin("kumihan-dist")
        .unwrap()
        .arg("convert")
        .arg(temp.path().join("repo/README.md"))
        .args(["--format", "text", "-o"])
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(out.join("はじめにお読みください.txt")).unwrap();
    assert_eq!(text, "【Kumihan】\n");
}

#[test]
fn test_missing_source_fails() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("kumihan-dist")
        .unwrap()
        .arg(temp.path().join("does-not-exist"))
        .arg("-o")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source directory not found"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = sample_repo();
    write(&temp.path().join("repo"), "kumihan-dist.toml", "[classifier.rules.novel]\nfiles = []\n");

    Command::cargo_bin("kumihan-dist")
        .unwrap()
        .arg(temp.path().join("repo"))
        .arg("-o")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown document type: novel"));
}
