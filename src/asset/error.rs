//! Errors raised while building assets.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    /// Invalid engine name or missing compiler.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{compiler} failed to compile {}:\n{diagnostic}", path.display())]
    Compile {
        path: PathBuf,
        compiler: String,
        diagnostic: String,
    },

    #[error("failed to minify {url} ({mimetype}):\n{diagnostic}")]
    Minify {
        url: &'static str,
        mimetype: &'static str,
        diagnostic: String,
    },

    #[error("compiling {} did not finish within {after:?}", path.display())]
    Timeout { path: PathBuf, after: Duration },
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short category name for log prefixes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config",
            Self::Io { .. } => "io",
            Self::Compile { .. } => "compile",
            Self::Minify { .. } => "minify",
            Self::Timeout { .. } => "timeout",
        }
    }
}
