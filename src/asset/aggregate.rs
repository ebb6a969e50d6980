//! Source aggregation: concatenate every matching file of one directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::AssetError;

/// Concatenate the files directly inside `dir` whose extension is listed.
///
/// Files are taken in file-name order with no separator, so re-running over
/// an unchanged directory yields identical bytes. Subdirectories are skipped.
/// Any unreadable matching file aborts the whole aggregation.
pub fn aggregate(dir: &Path, extensions: &[&str]) -> Result<String, AssetError> {
    let mut out = String::new();
    for path in matching_files(dir, extensions)? {
        let text = fs::read_to_string(&path).map_err(|e| AssetError::io(&path, e))?;
        out.push_str(&text);
    }
    Ok(out)
}

/// Matching regular files of `dir`, sorted by file name.
pub fn matching_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, AssetError> {
    let entries = fs::read_dir(dir).map_err(|e| AssetError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AssetError::io(dir, e))?;
        let path = entry.path();
        // Follows symlinks, so a linked file counts as a regular file.
        if !path.is_file() {
            continue;
        }
        if has_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_concatenates_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.js"), "var b=2;").unwrap();
        fs::write(dir.path().join("a.js"), "var a=1;").unwrap();

        let out = aggregate(dir.path(), &["js"]).unwrap();
        assert_eq!(out, "var a=1;var b=2;");
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        for (name, body) in [("c.css", "c{}"), ("a.css", "a{}"), ("b.css", "b{}")] {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let first = aggregate(dir.path(), &["css"]).unwrap();
        let second = aggregate(dir.path(), &["css"]).unwrap();
        assert_eq!(first, "a{}b{}c{}");
        assert_eq!(first, second);
    }

    #[test]
    fn test_skips_other_extensions_and_subdirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "x();").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("Makefile"), "ignored").unwrap();
        fs::create_dir(dir.path().join("vendor.js")).unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/deep.js"), "deep();").unwrap();

        assert_eq!(aggregate(dir.path(), &["js"]).unwrap(), "x();");
    }

    #[test]
    fn test_several_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), "<a/>").unwrap();
        fs::write(dir.path().join("b.tmpl"), "<b/>").unwrap();
        fs::write(dir.path().join("c.ejs"), "<c/>").unwrap();

        let out = aggregate(dir.path(), &["html", "tmpl", "ejs"]).unwrap();
        assert_eq!(out, "<a/><b/><c/>");
    }

    #[test]
    fn test_empty_dir_yields_empty_string() {
        let dir = TempDir::new().unwrap();
        assert_eq!(aggregate(dir.path(), &["js"]).unwrap(), "");
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = aggregate(&missing, &["js"]).unwrap_err();
        match err {
            AssetError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreadable_file_names_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "ok").unwrap();
        // invalid UTF-8 cannot be read as text
        fs::write(dir.path().join("b.js"), [0xff, 0xfe, 0x00]).unwrap();

        let err = aggregate(dir.path(), &["js"]).unwrap_err();
        match err {
            AssetError::Io { path, .. } => assert_eq!(path, dir.path().join("b.js")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
