//! `rigging tags`: print the HTML tags referencing the bundle.

use crate::bundle::AssetBundle;
use crate::config::RiggingConfig;
use anyhow::Result;

/// Build the bundle and print its three tags, one per line.
pub fn print_tags(config: &RiggingConfig) -> Result<()> {
    let bundle = super::build::build_logged(config)?;
    println!("{}", render(&bundle));
    Ok(())
}

/// Tags in document order: stylesheet, script, template library.
pub fn render(bundle: &AssetBundle) -> String {
    [bundle.css(), bundle.js(), bundle.template_library()].join("\n")
}
