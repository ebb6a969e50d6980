//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `expand_path` - tilde expansion and root-relative resolution
//! - `display_relative` - short paths for log lines and diagnostics

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand `~` and resolve a configured path against `root`.
///
/// Absolute paths (after expansion) are kept; relative ones are joined to root.
pub fn expand_path(path: &Path, root: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// Path relative to `root` for display, or the path itself if outside root.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_expand_path_relative() {
        let resolved = expand_path(Path::new("assets/js"), Path::new("/app"));
        assert_eq!(resolved, PathBuf::from("/app/assets/js"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let resolved = expand_path(Path::new("/srv/assets"), Path::new("/app"));
        assert_eq!(resolved, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let resolved = expand_path(Path::new("~/assets"), Path::new("/app"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("assets"));
    }

    #[test]
    fn test_display_relative() {
        let root = Path::new("/app");
        assert_eq!(
            display_relative(Path::new("/app/assets/js/app.js"), root),
            "assets/js/app.js"
        );
        assert_eq!(display_relative(Path::new("/elsewhere/x.js"), root), "/elsewhere/x.js");
    }
}
