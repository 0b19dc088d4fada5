//! Tests for the `inline-critical` binary

mod common;

use assert_cmd::Command;
use common::{CRITICAL, create_single_link_html, file_names, write_fixture};
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("inline-critical").expect("Failed to locate inline-critical binary")
}

fn fixtures() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_fixture(dir.path(), "index.html", &create_single_link_html("a.css"));
    write_fixture(dir.path(), "critical.css", CRITICAL);
    dir
}

#[test]
fn test_positional_files_are_classified_by_content() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["critical.css", "index.html"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("<style>body{color:red}</style>"))
        .stdout(predicate::str::contains(r#"rel="preload""#));
}

#[test]
fn test_named_flags_and_strategy() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["-h", "index.html", "-c", "critical.css", "--strategy", "media"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"media="print""#))
        .stdout(predicate::str::contains("this.media='all'"));
}

#[test]
fn test_html_from_stdin() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["--css", "critical.css", "--polyfill"])
        .write_stdin(create_single_link_html("a.css"))
        .assert()
        .success()
        .stdout(predicate::str::contains("loadCSS"))
        .stdout(predicate::str::contains("<noscript>"));
}

#[test]
fn test_ignore_flag_accepts_patterns() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["index.html", "critical.css", "-i", "/^A\\.css$/i"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<link rel="stylesheet" href="a.css">"#))
        .stdout(predicate::str::contains("preload").not());
}

#[test]
fn test_extract_defaults_base_to_current_directory() {
    let dir = fixtures();
    write_fixture(dir.path(), "a.css", "body{color:red}.rest{margin:0}");

    cli()
        .current_dir(dir.path())
        .args(["index.html", "critical.css", "--extract"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.css").not());

    assert_eq!(file_names(dir.path()).len(), 4);
}

#[test]
fn test_config_file_is_overridden_by_flags() {
    let dir = fixtures();
    write_fixture(
        dir.path(),
        "options.json",
        r#"{ "strategy": "swap", "noscript": false }"#,
    );

    cli()
        .current_dir(dir.path())
        .args(["index.html", "critical.css", "--config", "options.json", "--strategy", "media"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"media="print""#))
        .stdout(predicate::str::contains("<noscript>").not());
}

#[test]
fn test_missing_css_prints_usage() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["index.html"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Missing CSS input"))
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_stylesheet_is_reported() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["index.html", "critical.css", "-e", "-b", "."])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Specify base path"));
}

#[test]
fn test_unknown_strategy_fails() {
    let dir = fixtures();
    cli()
        .current_dir(dir.path())
        .args(["index.html", "critical.css", "--strategy", "eager"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown strategy"));
}
