//! Configuration module for critical CSS inlining
//!
//! This module provides `InlineOptions`, its fluent builder and JSON loading,
//! plus the strategy, noscript placement and ignore rule value types.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::InlineOptionsBuilder;
pub use types::{IgnoreRule, InlineOptions, NoscriptPlacement, Strategy};
