//! Shared constants for critical CSS inlining
//!
//! Selectors, attribute values and markers used by both the DOM adapter and
//! the transformation pipeline live here so the two stay in agreement.

/// Substring identifying an already embedded loadCSS polyfill
///
/// Any `<script>` whose text contains this marker counts as the loader,
/// which keeps repeated runs from inserting it twice.
pub const LOADCSS_SIGNATURE: &str = "loadCSS";

/// Selector for every external stylesheet reference, preloads included
pub const STYLESHEET_SELECTOR: &str = r#"link[rel="stylesheet"], link[rel="preload"][as="style"]"#;

/// Fallback insertion targets for the critical `<style>` block, in priority order
pub const TARGET_FALLBACK_SELECTORS: [&str; 3] = [
    r#":not(noscript) > link[rel="stylesheet"]"#,
    r#":not(noscript) > link[rel="preload"][as="style"]"#,
    "head script",
];

/// Elements after which the loader script may be anchored
pub const LOADCSS_ANCHOR_SELECTOR: &str =
    r#"head link[rel="stylesheet"], head link[rel="preload"], head noscript"#;

/// `onload` handler promoting a preloaded stylesheet to a real one
pub const PRELOAD_ONLOAD: &str = "this.onload=null;this.rel='stylesheet'";

/// Media types that never block rendering, links using them are left alone
pub const NON_BLOCKING_MEDIA: [&str; 2] = ["print", "speech"];

/// Tags whose original markup is restored verbatim after serialization
///
/// The HTML serializer does not round-trip foreign content byte for byte
/// (self-closing children, attribute order), so these subtrees are patched back
/// from the source text.
pub const FOREIGN_CONTENT_TAGS: [&str; 2] = ["svg", "math"];


/// Elements that never have an end tag
pub const VOID_TAGS: [&str; 16] = [
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
];
