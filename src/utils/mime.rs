//! MIME types of produced assets.
//!
//! Assets carry the bare type (`text/css`); no charset parameter.

/// Common MIME type constants.
pub mod types {
    pub const JAVASCRIPT: &str = "text/javascript";
    pub const CSS: &str = "text/css";
    pub const HTML: &str = "text/html";
}
