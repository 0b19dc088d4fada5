//! CSS deduplication helpers
//!
//! Pure functions answering "which rules of this stylesheet are not already
//! present elsewhere". Parsing and printing are delegated to lightningcss.

pub mod dedup;

pub use dedup::{compute_missing, compute_missing_pretty, looks_like_css, minify};
