//! Engine identifiers per asset class.
//!
//! Each class has a closed set of engines parsed from configuration strings.
//! An absent (or empty) name selects the class fallback; any other unknown
//! name is a configuration error.

use crate::asset::{AssetClass, AssetError};

/// Shared behavior of the per-class engine enums.
pub trait EngineKind: Copy + Sized + 'static {
    /// Asset class this engine family produces.
    const CLASS: AssetClass;
    /// Every engine of the family, in documentation order.
    const CHOICES: &'static [Self];
    /// Engine used when configuration names none.
    const FALLBACK: Self;

    /// Configuration name of the engine.
    fn name(self) -> &'static str;

    /// Default source relative to the assets directory (file or directory).
    fn default_source(self) -> &'static str;

    /// Names accepted in configuration.
    fn choices() -> Vec<&'static str> {
        Self::CHOICES.iter().map(|e| e.name()).collect()
    }

    /// Parse a configured engine name.
    fn parse(value: Option<&str>) -> Result<Self, AssetError> {
        let Some(name) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Self::FALLBACK);
        };
        Self::CHOICES
            .iter()
            .copied()
            .find(|engine| engine.name() == name)
            .ok_or_else(|| {
                AssetError::Configuration(format!(
                    "unknown {} engine `{}` (expected one of: {})",
                    Self::CLASS.label(),
                    name,
                    Self::choices().join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEngine {
    /// Concatenate every `*.js` in a directory.
    Vanilla,
    /// Bundle a single CommonJS entry file.
    Browserify,
    /// Dependency-ordered concatenation from a `.js` entry.
    Snockets,
    Coffeescript,
    Typescript,
}

impl EngineKind for ScriptEngine {
    const CLASS: AssetClass = AssetClass::Script;
    const CHOICES: &'static [Self] = &[
        Self::Vanilla,
        Self::Browserify,
        Self::Snockets,
        Self::Coffeescript,
        Self::Typescript,
    ];
    const FALLBACK: Self = Self::Vanilla;

    fn name(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Browserify => "browserify",
            Self::Snockets => "snockets",
            Self::Coffeescript => "coffeescript",
            Self::Typescript => "typescript",
        }
    }

    fn default_source(self) -> &'static str {
        match self {
            Self::Vanilla => "js",
            Self::Browserify | Self::Snockets => "js/app.js",
            Self::Coffeescript => "js/app.coffee",
            Self::Typescript => "js/app.ts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleEngine {
    /// Concatenate every `*.css` in a directory.
    Vanilla,
    Less,
    Stylus,
    Sass,
}

impl EngineKind for StyleEngine {
    const CLASS: AssetClass = AssetClass::Style;
    const CHOICES: &'static [Self] = &[Self::Vanilla, Self::Less, Self::Stylus, Self::Sass];
    const FALLBACK: Self = Self::Vanilla;

    fn name(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Less => "less",
            Self::Stylus => "stylus",
            Self::Sass => "sass",
        }
    }

    fn default_source(self) -> &'static str {
        match self {
            Self::Vanilla => "styles",
            Self::Less => "styles/app.less",
            Self::Stylus => "styles/app.styl",
            Self::Sass => "styles/app.sass",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateEngine {
    /// Markup fragments wrapped in one hidden container element.
    Markup,
    /// Client-side compiled jade functions.
    Jade,
}

impl EngineKind for TemplateEngine {
    const CLASS: AssetClass = AssetClass::Template;
    const CHOICES: &'static [Self] = &[Self::Markup, Self::Jade];
    const FALLBACK: Self = Self::Markup;

    fn name(self) -> &'static str {
        match self {
            Self::Markup => "vanilla",
            Self::Jade => "jade",
        }
    }

    fn default_source(self) -> &'static str {
        "templates"
    }
}

/// An engine of any class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Script(ScriptEngine),
    Style(StyleEngine),
    Template(TemplateEngine),
}

impl Engine {
    pub fn class(self) -> AssetClass {
        match self {
            Self::Script(_) => AssetClass::Script,
            Self::Style(_) => AssetClass::Style,
            Self::Template(_) => AssetClass::Template,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Script(e) => e.name(),
            Self::Style(e) => e.name(),
            Self::Template(e) => e.name(),
        }
    }

    /// Registry key of the external compiler, `None` for aggregation.
    pub fn compiler(self) -> Option<&'static str> {
        match self {
            Self::Script(ScriptEngine::Vanilla)
            | Self::Style(StyleEngine::Vanilla)
            | Self::Template(TemplateEngine::Markup) => None,
            other => Some(other.name()),
        }
    }

    /// Whether the source is a directory rather than a single entry file.
    pub fn reads_directory(self) -> bool {
        matches!(
            self,
            Self::Script(ScriptEngine::Vanilla)
                | Self::Style(StyleEngine::Vanilla)
                | Self::Template(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_falls_back() {
        assert_eq!(ScriptEngine::parse(None).unwrap(), ScriptEngine::Vanilla);
        assert_eq!(StyleEngine::parse(Some("")).unwrap(), StyleEngine::Vanilla);
        assert_eq!(TemplateEngine::parse(Some("  ")).unwrap(), TemplateEngine::Markup);
    }

    #[test]
    fn test_parse_every_choice() {
        for engine in ScriptEngine::CHOICES {
            assert_eq!(ScriptEngine::parse(Some(engine.name())).unwrap(), *engine);
        }
        for engine in StyleEngine::CHOICES {
            assert_eq!(StyleEngine::parse(Some(engine.name())).unwrap(), *engine);
        }
        for engine in TemplateEngine::CHOICES {
            assert_eq!(TemplateEngine::parse(Some(engine.name())).unwrap(), *engine);
        }
    }

    #[test]
    fn test_unknown_engine_is_configuration_error() {
        let err = ScriptEngine::parse(Some("not-a-thing")).unwrap_err();
        assert!(matches!(err, AssetError::Configuration(_)));
        let msg = err.to_string();
        assert!(msg.contains("not-a-thing"));
        assert!(msg.contains("browserify"));

        // engines of another class are not accepted
        assert!(StyleEngine::parse(Some("browserify")).is_err());
        assert!(TemplateEngine::parse(Some("less")).is_err());
    }

    #[test]
    fn test_compiler_keys() {
        assert_eq!(Engine::Script(ScriptEngine::Vanilla).compiler(), None);
        assert_eq!(Engine::Template(TemplateEngine::Markup).compiler(), None);
        assert_eq!(
            Engine::Script(ScriptEngine::Typescript).compiler(),
            Some("typescript")
        );
        assert_eq!(Engine::Style(StyleEngine::Sass).compiler(), Some("sass"));
        assert_eq!(Engine::Template(TemplateEngine::Jade).compiler(), Some("jade"));
    }

    #[test]
    fn test_reads_directory() {
        assert!(Engine::Script(ScriptEngine::Vanilla).reads_directory());
        assert!(Engine::Template(TemplateEngine::Jade).reads_directory());
        assert!(!Engine::Style(StyleEngine::Stylus).reads_directory());
    }
}
