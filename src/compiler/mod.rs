//! Compiler registry.
//!
//! A [`Compiler`] turns one source into target text. The registry maps each
//! compiling engine name (`browserify`, `less`, `jade`, ...) to a compiler;
//! by default every entry is an [`ExternalCompiler`] built from `[compilers]`,
//! and individual entries can be replaced in-process.

mod external;

pub use external::ExternalCompiler;

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rustc_hash::FxHashMap;

use crate::asset::AssetError;
use crate::config::RiggingConfig;

/// One compile request.
#[derive(Debug, Clone, Copy)]
pub struct CompileInput<'a> {
    /// Source file path (for jade, the template being compiled).
    pub path: &'a Path,
    /// Source text, already read.
    pub source: &'a str,
    /// Remaining time for this call, `None` when unbounded.
    pub budget: Option<Duration>,
}

/// Turns source text into target text.
pub trait Compiler: Send + Sync {
    fn compile(&self, input: &CompileInput<'_>) -> Result<String>;
}

impl<F> Compiler for F
where
    F: Fn(&CompileInput<'_>) -> Result<String> + Send + Sync,
{
    fn compile(&self, input: &CompileInput<'_>) -> Result<String> {
        self(input)
    }
}

/// Compilers keyed by engine name. Cheap to clone; shared read-only by builds.
#[derive(Clone, Default)]
pub struct CompilerSet {
    compilers: FxHashMap<String, Arc<dyn Compiler>>,
}

impl CompilerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// External compilers for every `[compilers]` entry.
    pub fn from_config(config: &RiggingConfig) -> Self {
        let mut set = Self::new();
        for (name, command) in config.compilers.entries() {
            set.insert(
                name,
                ExternalCompiler::new(name, command.to_vec(), config.get_root())
                    .environment(config.environment.as_str()),
            );
        }
        set
    }

    /// Register (or replace) the compiler for an engine.
    pub fn insert(&mut self, engine: impl Into<String>, compiler: impl Compiler + 'static) {
        self.compilers.insert(engine.into(), Arc::new(compiler));
    }

    /// Register a closure, with the argument type inferred.
    pub fn insert_fn<F>(&mut self, engine: impl Into<String>, compiler: F)
    where
        F: Fn(&CompileInput<'_>) -> Result<String> + Send + Sync + 'static,
    {
        self.insert(engine, compiler);
    }

    /// Compiler registered for `engine`.
    pub fn get(&self, engine: &str) -> Result<&dyn Compiler, AssetError> {
        self.compilers
            .get(engine)
            .map(|c| &**c)
            .ok_or_else(|| AssetError::Configuration(format!("no compiler registered for `{engine}`")))
    }

    pub fn contains(&self, engine: &str) -> bool {
        self.compilers.contains_key(engine)
    }
}

impl fmt::Debug for CompilerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.compilers.keys().collect();
        names.sort();
        f.debug_struct("CompilerSet").field("engines", &names).finish()
    }
}
