//! Type-safe config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// A type-safe wrapper for config field paths.
///
/// Each section exposes its paths as a `FIELDS` constant so diagnostics
/// never spell a TOML key by hand.
///
/// # Example
///
/// ```ignore
/// diag.error(AssetsConfig::FIELDS.js_engine, "unknown engine");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_as_str() {
        const JS: FieldPath = FieldPath::new("assets.js_engine");
        assert_eq!(JS.as_str(), "assets.js_engine");
        assert_eq!(JS.as_ref(), "assets.js_engine");
        assert!(JS.to_string().contains("assets.js_engine"));
    }
}
