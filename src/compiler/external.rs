//! Compilers run as child processes.
//!
//! Command arguments may reference `$INPUT`, `$OUTPUT` and `$ROOT`. Without
//! `$INPUT` the source text is piped to stdin; without `$OUTPUT` stdout is
//! the compiled text.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use super::{CompileInput, Compiler};
use crate::debug;
use crate::utils::exec::{Cmd, FilterRule};

const INPUT: &str = "$INPUT";
const OUTPUT: &str = "$OUTPUT";
const ROOT: &str = "$ROOT";

/// Warnings node-based compilers (and `npx`) print on every run.
static NODE_NOISE: FilterRule = FilterRule::new(&[
    "(node:",
    "(Use `node --trace",
    "npm WARN",
    "npm notice",
]);

#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    name: String,
    command: Vec<String>,
    root: PathBuf,
    environment: String,
}

impl ExternalCompiler {
    pub fn new(name: impl Into<String>, command: Vec<String>, root: &Path) -> Self {
        Self {
            name: name.into(),
            command,
            root: root.to_path_buf(),
            environment: "development".into(),
        }
    }

    /// Value of `RIGGING_ENV` passed to the child.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    fn references(&self, placeholder: &str) -> bool {
        self.command.iter().any(|arg| arg.contains(placeholder))
    }

    /// `RIGGING_*` variables exported to the child process.
    fn env_vars(&self, input: &Path) -> FxHashMap<String, String> {
        let mut vars = FxHashMap::default();
        vars.insert("RIGGING_ROOT".into(), self.root.display().to_string());
        vars.insert("RIGGING_ENV".into(), self.environment.clone());
        vars.insert("RIGGING_INPUT".into(), input.display().to_string());
        vars
    }
}

impl Compiler for ExternalCompiler {
    fn compile(&self, input: &CompileInput<'_>) -> Result<String> {
        let scratch = if self.references(OUTPUT) {
            Some(
                tempfile::Builder::new()
                    .prefix("rigging-")
                    .tempfile()
                    .context("Failed to create compiler output file")?,
            )
        } else {
            None
        };

        let mut placeholders = vec![
            (INPUT, input.path.display().to_string()),
            (ROOT, self.root.display().to_string()),
        ];
        if let Some(file) = &scratch {
            placeholders.push((OUTPUT, file.path().display().to_string()));
        }
        let args = resolve_args(&self.command, &placeholders);

        debug!("compile"; "{}", args.join(" "));

        let mut cmd = Cmd::from_slice(&args)
            .envs(&self.env_vars(input.path))
            .filter(&NODE_NOISE);
        if !self.root.as_os_str().is_empty() {
            cmd = cmd.cwd(&self.root);
        }
        if !self.references(INPUT) {
            cmd = cmd.stdin(input.source);
        }
        if let Some(budget) = input.budget {
            cmd = cmd.timeout(budget);
        }
        let output = cmd.run()?;

        match scratch {
            Some(file) => fs::read_to_string(file.path())
                .with_context(|| format!("Failed to read output of `{}`", self.name)),
            None => String::from_utf8(output.stdout)
                .with_context(|| format!("`{}` wrote non UTF-8 output", self.name)),
        }
    }
}

/// Substitute placeholders in every argument.
fn resolve_args(args: &[String], vars: &[(&str, String)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect()
}
