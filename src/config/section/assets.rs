//! `[assets]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! dir = "assets"              # Base directory for all asset sources
//! js_engine = "browserify"    # vanilla | browserify | snockets | coffeescript | typescript
//! css_engine = "stylus"       # vanilla | less | stylus | sass
//! tpl_engine = "jade"         # vanilla | jade (unset = raw markup library)
//! compress = true             # Override the environment default
//! timeout = 120               # Seconds per asset build (0 = unbounded)
//! fingerprint = false         # Append ?v=<hash> to tag URLs
//!
//! [assets.sources]
//! scripts = "client/main.js"  # Override the engine's default entry/directory
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::engine::{EngineKind, ScriptEngine, StyleEngine, TemplateEngine};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Field paths of `[assets]` for diagnostics.
pub struct AssetsFields {
    pub js_engine: FieldPath,
    pub css_engine: FieldPath,
    pub tpl_engine: FieldPath,
    pub template_variable: FieldPath,
    pub jade_runtime: FieldPath,
    pub sources: SourcesFields,
}

/// Field paths of `[assets.sources]` for diagnostics.
pub struct SourcesFields {
    pub scripts: FieldPath,
    pub styles: FieldPath,
    pub templates: FieldPath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Base directory of asset sources (relative to the config file).
    pub dir: PathBuf,

    /// Script engine name; unset means vanilla concatenation.
    #[serde(alias = "jsEngine")]
    pub js_engine: Option<String>,

    /// Stylesheet engine name; unset means vanilla concatenation.
    #[serde(alias = "cssEngine")]
    pub css_engine: Option<String>,

    /// Template engine name; unset means the raw markup library.
    #[serde(alias = "tplEngine")]
    pub tpl_engine: Option<String>,

    /// Minify output. Falls back to the environment default when unset.
    pub compress: Option<bool>,

    /// Per-asset build deadline in seconds (0 = unbounded).
    pub timeout: u64,

    /// Append a content version to tag URLs.
    pub fingerprint: bool,

    /// Global object compiled jade templates are attached to.
    pub template_variable: String,

    /// Script prepended to the compiled jade library (the jade runtime).
    pub jade_runtime: Option<PathBuf>,

    /// Per-class source overrides.
    pub sources: SourcesConfig,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: "assets".into(),
            js_engine: None,
            css_engine: None,
            tpl_engine: None,
            compress: None,
            timeout: 120,
            fingerprint: false,
            template_variable: "Templates".into(),
            jade_runtime: None,
            sources: SourcesConfig::default(),
        }
    }
}

/// Source overrides: a file for compiling engines, a directory otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourcesConfig {
    pub scripts: Option<PathBuf>,
    pub styles: Option<PathBuf>,
    pub templates: Option<PathBuf>,
}

impl AssetsConfig {
    pub const FIELDS: AssetsFields = AssetsFields {
        js_engine: FieldPath::new("assets.js_engine"),
        css_engine: FieldPath::new("assets.css_engine"),
        tpl_engine: FieldPath::new("assets.tpl_engine"),
        template_variable: FieldPath::new("assets.template_variable"),
        jade_runtime: FieldPath::new("assets.jade_runtime"),
        sources: SourcesFields {
            scripts: FieldPath::new("assets.sources.scripts"),
            styles: FieldPath::new("assets.sources.styles"),
            templates: FieldPath::new("assets.sources.templates"),
        },
    };

    /// Build deadline per asset, `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    /// Resolve every configured path against `root`.
    pub fn normalize(&mut self, root: &Path) {
        use crate::utils::path::expand_path;

        self.dir = expand_path(&self.dir, root);
        for source in [
            &mut self.sources.scripts,
            &mut self.sources.styles,
            &mut self.sources.templates,
            &mut self.jade_runtime,
        ] {
            if let Some(path) = source.take() {
                *source = Some(expand_path(&path, root));
            }
        }
    }

    /// Validate structure without touching the filesystem.
    ///
    /// # Checks
    /// - engine names are known for their class
    /// - `template_variable` is a plain JavaScript identifier
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        check_engine::<ScriptEngine>(self.js_engine.as_deref(), Self::FIELDS.js_engine, diag);
        check_engine::<StyleEngine>(self.css_engine.as_deref(), Self::FIELDS.css_engine, diag);
        check_engine::<TemplateEngine>(self.tpl_engine.as_deref(), Self::FIELDS.tpl_engine, diag);

        if !is_identifier(&self.template_variable) {
            diag.error_with_hint(
                Self::FIELDS.template_variable,
                format!(
                    "`{}` is not a valid JavaScript identifier",
                    self.template_variable
                ),
                "use letters, digits, `_` or `$`, not starting with a digit",
            );
        }

        if self.jade_runtime.is_some() && self.tpl_engine.as_deref() != Some("jade") {
            diag.warn(
                Self::FIELDS.jade_runtime,
                format!(
                    "ignored unless {} is \"jade\"",
                    Self::FIELDS.tpl_engine.as_str()
                ),
            );
        }
    }
}

/// Report an unknown engine name with the accepted choices as hint.
fn check_engine<E: EngineKind>(value: Option<&str>, field: FieldPath, diag: &mut ConfigDiagnostics) {
    if E::parse(value).is_err() {
        diag.error_with_hint(
            field,
            format!(
                "unknown {} engine `{}`",
                E::CLASS.label(),
                value.unwrap_or_default()
            ),
            format!("use one of: {}", E::choices().join(", ")),
        );
    }
}

fn is_identifier(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());
    re.is_match(name)
}
