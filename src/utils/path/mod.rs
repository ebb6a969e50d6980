//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `expand_path`, `display_relative`)

pub mod fs;

pub use fs::{display_relative, expand_path, normalize_path};
