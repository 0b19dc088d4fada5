//! Embedded loadCSS `rel=preload` polyfill

use once_cell::sync::Lazy;

static LOADCSS_SOURCE: &str = include_str!("../../assets/cssrelpreload.min.js");

static LOADCSS_SCRIPT: Lazy<String> = Lazy::new(|| LOADCSS_SOURCE.trim().to_string());

/// Minified polyfill source, ready to be placed inside a `<script>` element
#[must_use]
pub fn script() -> &'static str {
    LOADCSS_SCRIPT.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::LOADCSS_SIGNATURE;

    #[test]
    fn test_script_carries_signature() {
        assert!(script().contains(LOADCSS_SIGNATURE));
        assert!(!script().ends_with('\n'));
        assert!(!script().contains("</script"));
    }
}
