pub mod config;
pub mod css;
pub mod dom;
pub mod inline_css;
pub mod utils;

pub use config::{IgnoreRule, InlineOptions, InlineOptionsBuilder, NoscriptPlacement, Strategy};
pub use css::{compute_missing, minify};
pub use dom::{Document, Element};
pub use inline_css::{InlineError, InlineResult, inline, inline_str, revision};
