//! Engine selection.
//!
//! Maps the three configured engine names to one [`AssetSpec`] per asset
//! class. Selection is pure: it validates names and resolves paths but never
//! touches the filesystem; all I/O happens when the specs are built.

mod kind;

pub use kind::{Engine, EngineKind, ScriptEngine, StyleEngine, TemplateEngine};

use crate::asset::{AssetClass, AssetError};
use crate::config::AssetsConfig;
use std::path::{Path, PathBuf};

/// Everything needed to build one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    pub class: AssetClass,
    /// Entry file for compiling engines, directory for aggregating ones.
    pub source: PathBuf,
    pub engine: Engine,
    pub compress: bool,
}

impl AssetSpec {
    /// Public URL the asset is served at.
    pub fn url(&self) -> &'static str {
        self.class.url()
    }

    pub fn mimetype(&self) -> &'static str {
        self.class.mimetype()
    }
}

/// The three selected specs, one per class.
#[derive(Debug, Clone)]
pub struct Selection {
    pub script: AssetSpec,
    pub style: AssetSpec,
    pub template: AssetSpec,
}

impl Selection {
    /// Specs in bundle order (script, style, template).
    pub fn specs(&self) -> [&AssetSpec; 3] {
        [&self.script, &self.style, &self.template]
    }

    pub fn engines(&self) -> [Engine; 3] {
        [self.script.engine, self.style.engine, self.template.engine]
    }
}

/// Select engines and sources for all three classes.
///
/// Errors on the first unknown engine name, in script, style, template order.
pub fn select(assets: &AssetsConfig, compress: bool) -> Result<Selection, AssetError> {
    let script = ScriptEngine::parse(assets.js_engine.as_deref())?;
    let style = StyleEngine::parse(assets.css_engine.as_deref())?;
    let template = TemplateEngine::parse(assets.tpl_engine.as_deref())?;

    Ok(Selection {
        script: spec(
            Engine::Script(script),
            source(&assets.dir, assets.sources.scripts.as_deref(), script),
            compress,
        ),
        style: spec(
            Engine::Style(style),
            source(&assets.dir, assets.sources.styles.as_deref(), style),
            compress,
        ),
        template: spec(
            Engine::Template(template),
            source(&assets.dir, assets.sources.templates.as_deref(), template),
            // The markup library is HTML; only compiled templates are script.
            compress && template == TemplateEngine::Jade,
        ),
    })
}

fn spec(engine: Engine, source: PathBuf, compress: bool) -> AssetSpec {
    AssetSpec {
        class: engine.class(),
        source,
        engine,
        compress,
    }
}

fn source<E: EngineKind>(dir: &Path, explicit: Option<&Path>, engine: E) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => dir.join(engine.default_source()),
    }
}
