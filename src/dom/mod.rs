//! HTML document adapter
//!
//! Wraps a kuchiki tree with the queries and mutations the inlining pipeline
//! needs, and serializes back to text with as little diff noise against the
//! original source as possible.

pub mod document;
pub mod element;
pub mod loadcss;
pub mod serialize;

pub use document::{Document, FallbackSet};
pub use element::Element;
pub use serialize::{
    ClosingTag, detect_indent, inject_before_closing, partials, reindent, replace_partials,
    restore_foreign_content, top_level_elements,
};
