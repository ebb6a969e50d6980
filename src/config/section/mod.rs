//! Configuration section definitions.
//!
//! Each module corresponds to a section in `rigging.toml`:
//!
//! | Module      | TOML Section    | Purpose                                 |
//! |-------------|-----------------|-----------------------------------------|
//! | `assets`    | `[assets]`      | Engines, sources, compression, timeout  |
//! | `compilers` | `[compilers]`   | External compiler commands per engine   |

pub mod assets;
pub mod compilers;

pub use assets::AssetsConfig;
pub use compilers::CompilersConfig;
