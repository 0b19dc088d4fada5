//! Test utilities and helper functions for the critical_inline test suite

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use kuchiki::traits::*;

/// Critical CSS used by most scenarios
#[allow(dead_code)]
pub const CRITICAL: &str = "body{color:red}";

/// Creates a test HTML document with the given head and body markup
#[allow(dead_code)]
pub fn create_test_html(head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    <title>Page</title>\n{head}\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

/// Creates a page with a single blocking stylesheet link to `href`
#[allow(dead_code)]
pub fn create_single_link_html(href: &str) -> String {
    create_test_html(
        &format!("    <link rel=\"stylesheet\" href=\"{href}\">"),
        "    <p>Hello</p>",
    )
}

/// Writes a fixture file below `dir`, creating parent directories
#[allow(dead_code)]
pub fn write_fixture(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Collapses whitespace between tags so assertions ignore indentation
#[allow(dead_code)]
pub fn strip(html: &str) -> String {
    html.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

/// Attributes of every live `<link>` element in document order
///
/// Parsed with scripting enabled, so links wrapped in `<noscript>` are text
/// and do not show up here.
#[allow(dead_code)]
pub fn live_links(html: &str) -> Vec<BTreeMap<String, String>> {
    let document = kuchiki::parse_html().one(html);
    document
        .select("link")
        .expect("Failed to select links")
        .map(|link| {
            link.attributes
                .borrow()
                .map
                .iter()
                .map(|(name, attr)| (name.local.to_string(), attr.value.clone()))
                .collect()
        })
        .collect()
}

/// Number of non-overlapping occurrences of `needle`
#[allow(dead_code)]
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Byte offset of `needle`, panicking with context when absent
#[allow(dead_code)]
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{haystack}"))
}

/// File names in `dir`, sorted
#[allow(dead_code)]
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
