//! `rigging build`: build the bundle and write it to disk.
//!
//! Each asset lands at its URL path below the output directory
//! (`public/app.js`, `public/style.css`, `public/templates.js`).

use crate::{
    asset::AssetClass,
    bundle::{AssetBundle, AssetEvent, Builder},
    config::RiggingConfig,
    log,
    logger::error_block,
};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

/// File name of the optional build manifest.
pub const MANIFEST_FILE: &str = "rigging-manifest.json";

/// One manifest entry, keyed by URL.
#[derive(Debug, Serialize)]
struct ManifestEntry {
    mimetype: &'static str,
    bytes: usize,
    version: String,
}

/// Build and write all assets.
pub fn build_assets(config: &RiggingConfig, output: &Path, manifest: bool) -> Result<AssetBundle> {
    let started = Instant::now();
    let bundle = build_logged(config)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    for path in write_assets(&bundle, output)? {
        log!("build"; "{}", path.display());
    }

    if manifest {
        let path = write_manifest(&bundle, output)?;
        log!("build"; "{}", path.display());
    }

    log!("ok"; "built 3 assets in {:.2?}", started.elapsed());
    Ok(bundle)
}

/// Build the bundle, reporting each failed asset as it is seen.
pub fn build_logged(config: &RiggingConfig) -> Result<AssetBundle> {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);

    let result = Builder::new(config)
        .on_event(move |event| {
            if let AssetEvent::Failed { url, error } = event {
                sink.lock().push((url, format!("{error}")));
            }
        })
        .build();

    for (url, detail) in failures.lock().iter() {
        error_block(&format!("{url} failed"), detail);
    }

    result.context("Failed to build asset bundle")
}

/// Write every asset below `output`, returning the written paths.
fn write_assets(bundle: &AssetBundle, output: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(3);
    for asset in bundle.assets() {
        let path = output.join(asset.url().trim_start_matches('/'));
        fs::write(&path, asset.contents().unwrap_or_default())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn write_manifest(bundle: &AssetBundle, output: &Path) -> Result<PathBuf> {
    let mut entries = serde_json::Map::new();
    for class in AssetClass::ALL {
        let Some(asset) = bundle.get(class.url()) else {
            continue;
        };
        let entry = ManifestEntry {
            mimetype: asset.mimetype(),
            bytes: asset.contents().map_or(0, str::len),
            version: bundle.version(class),
        };
        entries.insert(class.url().to_string(), serde_json::to_value(entry)?);
    }

    let path = output.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
