//! Building one asset from its spec.

use std::path::Path;
use std::time::{Duration, Instant};

use super::aggregate::aggregate;
use super::compiled::compile_file;
use super::template::{JadeLibrary, markup_library, remaining};
use super::{Asset, AssetError, minify};
use crate::compiler::CompilerSet;
use crate::debug;
use crate::engine::{AssetSpec, Engine, ScriptEngine, StyleEngine, TemplateEngine};

/// Shared, read-only inputs of a build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub compilers: &'a CompilerSet,
    /// Construction deadline per asset, `None` when unbounded.
    pub timeout: Option<Duration>,
    pub template_variable: &'a str,
    pub jade_runtime: Option<&'a Path>,
}

/// Build the asset described by `spec`.
///
/// Never panics on bad input: every failure is recorded on the returned
/// asset, which is then `Failed` with no contents.
pub fn build_asset(spec: &AssetSpec, ctx: &BuildContext<'_>) -> Asset {
    let mut asset = Asset::pending(spec);
    let started = Instant::now();

    let result = produce(spec, ctx, started)
        .and_then(|contents| minify::apply(contents, spec.url(), spec.mimetype(), spec.compress));

    match result {
        Ok(contents) => {
            debug!("build"; "{} ({} bytes, {:?})", spec.url(), contents.len(), started.elapsed());
            asset.create(contents);
        }
        Err(err) => {
            debug!("build"; "{} failed: {}", spec.url(), err.kind());
            asset.fail(err);
        }
    }
    asset
}

/// Raw (unminified) contents for `spec`.
fn produce(spec: &AssetSpec, ctx: &BuildContext<'_>, started: Instant) -> Result<String, AssetError> {
    let deadline = ctx.timeout.map(|limit| started + limit);
    let source = spec.source.as_path();

    match spec.engine {
        Engine::Script(ScriptEngine::Vanilla) => aggregate(source, &["js"]),
        Engine::Style(StyleEngine::Vanilla) => aggregate(source, &["css"]),
        Engine::Template(TemplateEngine::Markup) => markup_library(source),
        Engine::Template(TemplateEngine::Jade) => JadeLibrary {
            dir: source,
            variable: ctx.template_variable,
            runtime: ctx.jade_runtime,
            deadline,
        }
        .build(ctx.compilers.get(spec.engine.name())?),
        Engine::Script(
            ScriptEngine::Browserify
            | ScriptEngine::Snockets
            | ScriptEngine::Coffeescript
            | ScriptEngine::Typescript,
        )
        | Engine::Style(StyleEngine::Less | StyleEngine::Stylus | StyleEngine::Sass) => {
            let name = spec.engine.name();
            compile_file(source, name, ctx.compilers.get(name)?, remaining(deadline))
        }
    }
}
