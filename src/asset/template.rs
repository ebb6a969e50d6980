//! Template library builders.
//!
//! The markup library wraps every template fragment in one hidden container
//! the client looks up by id. The jade library compiles each `.jade` file to
//! a client-side function attached to a global object.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use jwalk::WalkDir;

use super::AssetError;
use super::aggregate::aggregate;
use super::compiled::compile_source;
use crate::compiler::Compiler;

/// Element id of the markup template container.
pub const LIBRARY_ID: &str = "rigging-template-library";

/// Extensions aggregated into the markup library.
pub const MARKUP_EXTENSIONS: [&str; 3] = ["html", "tmpl", "ejs"];

/// Concatenated markup templates wrapped in the hidden container.
pub fn markup_library(dir: &Path) -> Result<String, AssetError> {
    let markup = aggregate(dir, &MARKUP_EXTENSIONS)?;
    Ok(format!(
        "<div style=\"display: none;\" id=\"{LIBRARY_ID}\">\n{markup}\n</div>"
    ))
}

/// Options of the compiled jade library.
#[derive(Debug, Clone)]
pub struct JadeLibrary<'a> {
    pub dir: &'a Path,
    /// Global object the compiled functions are attached to.
    pub variable: &'a str,
    /// Script prepended verbatim (the jade runtime).
    pub runtime: Option<&'a Path>,
    pub deadline: Option<Instant>,
}

impl JadeLibrary<'_> {
    /// Compile every `.jade` file below `dir` into one script.
    pub fn build(&self, compiler: &dyn Compiler) -> Result<String, AssetError> {
        let var = self.variable;
        let mut out = String::new();

        if let Some(runtime) = self.runtime {
            let text = fs::read_to_string(runtime).map_err(|e| AssetError::io(runtime, e))?;
            out.push_str(&text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }

        out.push_str(&format!("window.{var} = window.{var} || {{}};\n"));

        for path in self.templates()? {
            let source = fs::read_to_string(&path).map_err(|e| AssetError::io(&path, e))?;
            let compiled = compile_source(&path, &source, "jade", compiler, remaining(self.deadline))?;
            let name = template_name(self.dir, &path);
            let compiled = compiled.trim_end();
            out.push_str(&format!(
                "window.{var}[\"{name}\"] = {};\n",
                compiled.strip_suffix(';').unwrap_or(compiled)
            ));
        }

        Ok(out)
    }

    /// `.jade` files below `dir`, recursively, in path order.
    fn templates(&self) -> Result<Vec<PathBuf>, AssetError> {
        // read_dir first so a missing directory is an error, not an empty library
        fs::read_dir(self.dir).map_err(|e| AssetError::io(self.dir, e))?;

        let mut files = Vec::new();
        for entry in WalkDir::new(self.dir).sort(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.dir.to_path_buf());
                AssetError::io(path, e.into())
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "jade") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Time left until `deadline`, saturating at zero.
pub(crate) fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

/// Library key of a template: path relative to `dir`, no extension, `/`-separated.
fn template_name(dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(dir).unwrap_or(path).with_extension("");
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
}
