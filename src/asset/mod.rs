//! Asset construction: aggregation, compilation and minification.

pub mod aggregate;
pub mod compiled;
mod error;
mod kind;
pub mod minify;
mod process;
mod state;
pub mod template;

// Types
pub use error::AssetError;
pub use kind::AssetClass;
pub use state::{Asset, AssetState};

// Building (side effects)
pub use process::{BuildContext, build_asset};
