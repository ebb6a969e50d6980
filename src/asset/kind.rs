//! Asset class definitions.

use crate::utils::mime::types;

/// Class of a produced asset. Each class maps to one fixed public URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    /// Client application script (`/app.js`).
    Script,
    /// Stylesheet (`/style.css`).
    Style,
    /// Template library (`/templates.js`).
    Template,
}

impl AssetClass {
    /// Every class, in bundle order.
    pub const ALL: [Self; 3] = [Self::Script, Self::Style, Self::Template];

    pub const fn url(self) -> &'static str {
        match self {
            Self::Script => "/app.js",
            Self::Style => "/style.css",
            Self::Template => "/templates.js",
        }
    }

    pub const fn mimetype(self) -> &'static str {
        match self {
            Self::Script | Self::Template => types::JAVASCRIPT,
            Self::Style => types::CSS,
        }
    }

    /// Plural noun used in logs and diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Script => "scripts",
            Self::Style => "styles",
            Self::Template => "templates",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_distinct() {
        let urls: Vec<_> = AssetClass::ALL.iter().map(|c| c.url()).collect();
        assert_eq!(urls, ["/app.js", "/style.css", "/templates.js"]);
        assert_eq!(AssetClass::Template.mimetype(), AssetClass::Script.mimetype());
    }
}
