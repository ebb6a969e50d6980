//! Command-line interface module.

mod args;
pub mod build;
pub mod check;
pub mod tags;

pub use args::{Cli, Commands};
