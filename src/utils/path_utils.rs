//! Href and file path helpers.
//!
//! Stylesheet hrefs are treated as plain strings until extraction needs a
//! file on disk, these helpers do the splitting and normalization.

/// Whether an href points outside the local file tree
///
/// Anything carrying `//` (`https://cdn/...`, `//cdn/...`) is external and is
/// never extracted.
#[must_use]
pub fn is_external_href(href: &str) -> bool {
    href.contains("//")
}

/// Split an href into its path and its `?query`/`#fragment` suffix
#[must_use]
pub fn split_href(href: &str) -> (&str, &str) {
    match href.find(['?', '#']) {
        Some(idx) => href.split_at(idx),
        None => (href, ""),
    }
}

/// Normalize path separators to forward slashes for use inside markup
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
