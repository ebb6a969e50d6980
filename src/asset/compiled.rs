//! Single-entry compilation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use super::AssetError;
use crate::compiler::{CompileInput, Compiler};
use crate::utils::exec::TimedOut;

/// Read `path` and run it through `compiler`.
///
/// `name` identifies the compiler in diagnostics. A compiler that outlives
/// `budget` yields [`AssetError::Timeout`].
pub fn compile_file(
    path: &Path,
    name: &str,
    compiler: &dyn Compiler,
    budget: Option<Duration>,
) -> Result<String, AssetError> {
    let source = fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
    compile_source(path, &source, name, compiler, budget)
}

/// Run already-read `source` through `compiler`.
pub fn compile_source(
    path: &Path,
    source: &str,
    name: &str,
    compiler: &dyn Compiler,
    budget: Option<Duration>,
) -> Result<String, AssetError> {
    if let Some(after) = budget
        && after.is_zero()
    {
        return Err(AssetError::Timeout {
            path: path.to_path_buf(),
            after,
        });
    }

    let input = CompileInput {
        path,
        source,
        budget,
    };
    compiler.compile(&input).map_err(|err| match err.downcast_ref::<TimedOut>() {
        Some(timed_out) => AssetError::Timeout {
            path: path.to_path_buf(),
            after: timed_out.after,
        },
        None => AssetError::Compile {
            path: path.to_path_buf(),
            compiler: name.to_string(),
            diagnostic: format!("{err:#}"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn upper(input: &CompileInput<'_>) -> anyhow::Result<String> {
        Ok(input.source.to_uppercase())
    }

    fn broken(_: &CompileInput<'_>) -> anyhow::Result<String> {
        anyhow::bail!("unexpected token at line 1")
    }

    #[test]
    fn test_compiles_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.coffee");
        fs::write(&path, "square = (x) -> x * x").unwrap();

        let out = compile_file(&path, "coffeescript", &upper, None).unwrap();
        assert_eq!(out, "SQUARE = (X) -> X * X");
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ts");
        let err = compile_file(&path, "typescript", &upper, None).unwrap_err();
        assert!(matches!(err, AssetError::Io { path: p, .. } if p == path));
    }

    #[test]
    fn test_compiler_failure_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.less");
        fs::write(&path, "a {").unwrap();

        let err = compile_file(&path, "less", &broken, None).unwrap_err();
        match err {
            AssetError::Compile {
                path: p,
                compiler,
                diagnostic,
            } => {
                assert_eq!(p, path);
                assert_eq!(compiler, "less");
                assert!(diagnostic.contains("unexpected token"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spent_budget_times_out() {
        let err = compile_source(
            Path::new("app.styl"),
            "",
            "stylus",
            &upper,
            Some(Duration::ZERO),
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::Timeout { .. }));
    }

    #[test]
    fn test_timed_out_compiler_maps_to_timeout() {
        let hung = |_: &CompileInput<'_>| -> anyhow::Result<String> {
            Err(TimedOut {
                program: "sass".into(),
                after: Duration::from_millis(50),
            }
            .into())
        };
        let err = compile_source(Path::new("app.sass"), "", "sass", &hung, None).unwrap_err();
        match err {
            AssetError::Timeout { after, .. } => assert_eq!(after, Duration::from_millis(50)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
