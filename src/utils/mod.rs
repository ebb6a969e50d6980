//! Shared utilities.
//!
//! | Module | Purpose                                        |
//! |--------|------------------------------------------------|
//! | `exec` | External command builder (stdin, timeout)      |
//! | `hash` | Content fingerprints for versioned URLs        |
//! | `mime` | Asset MIME types                               |
//! | `path` | Path normalization and display                 |

pub mod exec;
pub mod hash;
pub mod mime;
pub mod path;
