//! Removing inlined rules from stylesheets on disk
//!
//! Extraction never touches the source stylesheet. The remaining rules are
//! written to a sibling file whose name carries a hash of its content, so
//! repeated runs with the same input produce the same file and href.

use std::fs;
use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

use super::types::{InlineError, InlineResult};
use crate::css::{compute_missing, compute_missing_pretty};
use crate::utils::{is_external_href, normalize_path, split_href};

/// Hex digest identifying a piece of content
#[must_use]
pub fn content_hash(content: &str) -> String {
    format!("{:016x}", xxh3_64(content.as_bytes()))
}

/// `<dir>/<stem>.<hash>.<ext>` for the given path and content
#[must_use]
pub fn revision(path: &Path, content: &str) -> PathBuf {
    let hash = content_hash(content);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match path.extension() {
        Some(ext) => format!("{stem}.{hash}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{hash}"),
    };

    path.with_file_name(name)
}

/// Revisioned href with forward slashes, keeping any query or fragment
#[must_use]
pub fn revision_href(href: &str, content: &str) -> String {
    let (path, suffix) = split_href(href);
    let revisioned = revision(Path::new(path), content);
    format!("{}{suffix}", normalize_path(&revisioned.to_string_lossy()))
}

/// Locate the file behind an href
///
/// External hrefs and empty hrefs resolve to `None`. Root-relative hrefs are
/// resolved below `base_path` like relative ones.
///
/// # Errors
///
/// Returns `InlineError::Configuration` when a local href has no base path and
/// `InlineError::MissingResource` when the resolved file does not exist.
pub fn resolve_source(href: &str, base_path: Option<&Path>) -> InlineResult<Option<PathBuf>> {
    if is_external_href(href) {
        log::debug!("Skipping extraction for external stylesheet {href}");
        return Ok(None);
    }

    let (path, _) = split_href(href);
    if path.is_empty() {
        return Ok(None);
    }

    let base = base_path.ok_or_else(|| InlineError::Configuration {
        href: href.to_string(),
    })?;

    let file = base.join(path.trim_start_matches('/'));
    if !file.is_file() {
        return Err(InlineError::MissingResource {
            href: href.to_string(),
            base: base.to_path_buf(),
        });
    }

    Ok(Some(file))
}

/// Write `source` minus the inlined rules to its revisioned path
///
/// Returns the href pointing at the written file.
///
/// # Errors
///
/// Returns `InlineError::Io` if the source cannot be read or the result cannot be written.
pub fn extract_stylesheet(
    source: &Path,
    href: &str,
    inlined: &[String],
    minify: bool,
) -> InlineResult<String> {
    let bytes = fs::read(source).map_err(|e| InlineError::io(source, e))?;
    let original = String::from_utf8_lossy(&bytes);

    let diff = if minify {
        compute_missing(&original, inlined)
    } else {
        compute_missing_pretty(&original, inlined)
    };

    let target = revision(source, &diff);
    if target.is_file() {
        log::debug!("{} already extracted", target.display());
    } else {
        fs::write(&target, &diff).map_err(|e| InlineError::io(&target, e))?;
        log::info!("Extracted {} -> {}", source.display(), target.display());
    }

    Ok(revision_href(href, &diff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_revision_naming() {
        let path = revision(Path::new("css/site.css"), "a{color:red}");
        let name = path.file_name().expect("file name").to_string_lossy().into_owned();
        assert!(name.starts_with("site."));
        assert!(name.ends_with(".css"));
        assert_eq!(name.len(), "site.".len() + 16 + ".css".len());
        assert_eq!(path.parent(), Some(Path::new("css")));
    }

    #[test]
    fn test_revision_href_keeps_suffix_and_slashes() {
        let href = revision_href("/css/site.css?v=3", "a{color:red}");
        let hash = content_hash("a{color:red}");
        assert_eq!(href, format!("/css/site.{hash}.css?v=3"));
    }

    #[test]
    fn test_resolve_source_errors() {
        let dir = TempDir::new().expect("temp dir");

        let err = resolve_source("css/a.css", None).expect_err("no base path");
        assert!(matches!(err, InlineError::Configuration { .. }));

        let err = resolve_source("css/a.css", Some(dir.path())).expect_err("missing file");
        assert!(matches!(err, InlineError::MissingResource { .. }));

        assert_eq!(resolve_source("https://cdn.example.com/a.css", None).expect("external"), None);
        assert_eq!(resolve_source("//cdn.example.com/a.css", None).expect("external"), None);
    }

    #[test]
    fn test_resolve_source_root_relative_and_query() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("css")).expect("mkdir");
        fs::write(dir.path().join("css/a.css"), "a{color:red}").expect("write");

        let found = resolve_source("/css/a.css?v=1", Some(dir.path())).expect("resolves");
        assert_eq!(found, Some(dir.path().join("css/a.css")));
    }

    #[test]
    fn test_extract_stylesheet_writes_remaining_rules() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("a.css");
        fs::write(&source, "body { color: red }\n.rest { margin: 0 }\n").expect("write");

        let inlined = vec!["body{color:red}".to_string()];
        let href = extract_stylesheet(&source, "a.css", &inlined, true).expect("extract");

        let written = dir.path().join(&href);
        assert_eq!(fs::read_to_string(&written).expect("read"), ".rest{margin:0}");
        assert!(source.is_file(), "source stylesheet is kept");

        let again = extract_stylesheet(&source, "a.css", &inlined, true).expect("extract");
        assert_eq!(href, again);
    }

    proptest! {
        #[test]
        fn prop_revision_is_content_deterministic(a in ".{0,64}", b in ".{0,64}") {
            let path = Path::new("dir/file.css");
            prop_assert_eq!(revision(path, &a), revision(path, &a));
            if a != b {
                prop_assert_ne!(revision(path, &a), revision(path, &b));
            }
        }
    }
}
