//! `rigging check`: validate configuration and sources without compiling.

use crate::{
    asset::AssetClass,
    config::{AssetsConfig, ConfigDiagnostics, ConfigError, FieldPath, RiggingConfig},
    engine::{self, AssetSpec, Selection},
    log,
};
use anyhow::Result;

/// Run every check, reporting all problems together.
///
/// # Checks
/// - engine names (already validated on load)
/// - commands of the selected compiling engines are installed
/// - selected sources exist with the right kind (file or directory)
pub fn check_config(config: &RiggingConfig) -> Result<()> {
    let selection = engine::select(&config.assets, config.compress())?;

    let mut diag = ConfigDiagnostics::new();
    config
        .compilers
        .validate_installed(&selection.engines(), &mut diag);
    check_sources(&selection, config, &mut diag);

    diag.print_warnings();
    diag.into_result().map_err(ConfigError::Diagnostics)?;

    for spec in selection.specs() {
        log!(
            "check";
            "{} <- {} ({})",
            spec.url(),
            config.root_relative(&spec.source),
            spec.engine.name()
        );
    }
    log!("ok"; "configuration is valid");
    Ok(())
}

fn check_sources(selection: &Selection, config: &RiggingConfig, diag: &mut ConfigDiagnostics) {
    let fields = &AssetsConfig::FIELDS.sources;
    let field_of = |spec: &AssetSpec| -> FieldPath {
        match spec.class {
            AssetClass::Script => fields.scripts,
            AssetClass::Style => fields.styles,
            AssetClass::Template => fields.templates,
        }
    };

    for spec in selection.specs() {
        let display = config.root_relative(&spec.source);
        let wants_dir = spec.engine.reads_directory();
        let found = if wants_dir {
            spec.source.is_dir()
        } else {
            spec.source.is_file()
        };
        if found {
            continue;
        }
        let kind = if wants_dir { "directory" } else { "file" };
        diag.error_with_hint(
            field_of(spec),
            format!("{kind} `{display}` not found for {}", spec.engine.name()),
            format!("create it or set {}", field_of(spec)),
        );
    }

    if let Some(runtime) = &config.assets.jade_runtime
        && !runtime.is_file()
    {
        diag.error(
            AssetsConfig::FIELDS.jade_runtime,
            format!("file `{}` not found", config.root_relative(runtime)),
        );
    }
}
