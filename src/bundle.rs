//! The asset bundle: script, stylesheet and template library.
//!
//! Built once per invocation from configuration. The three assets are built
//! concurrently and the bundle only exists if all of them were created.
//!
//! ```ignore
//! let bundle = bundle::build_bundle(&config)?;
//! println!("{}", bundle.js());
//! ```

use std::sync::Arc;

use crate::asset::{Asset, AssetClass, AssetError, BuildContext, build_asset};
use crate::compiler::CompilerSet;
use crate::config::RiggingConfig;
use crate::engine::{self, Selection};
use crate::utils::hash;

/// Progress of a bundle build, reported once per asset.
#[derive(Debug)]
pub enum AssetEvent<'a> {
    Created(&'a Asset),
    Failed {
        url: &'static str,
        error: &'a AssetError,
    },
}

type EventHandler = Arc<dyn Fn(AssetEvent<'_>) + Send + Sync>;

/// Configures and runs a bundle build.
pub struct Builder<'a> {
    config: &'a RiggingConfig,
    compilers: Option<CompilerSet>,
    on_event: Option<EventHandler>,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a RiggingConfig) -> Self {
        Self {
            config,
            compilers: None,
            on_event: None,
        }
    }

    /// Replace the compilers derived from `[compilers]`.
    pub fn compilers(mut self, compilers: CompilerSet) -> Self {
        self.compilers = Some(compilers);
        self
    }

    /// Observe every asset as it resolves.
    pub fn on_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(AssetEvent<'_>) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(handler));
        self
    }

    /// Select engines and build all three assets.
    ///
    /// Fails on the first error in script, style, template order; no bundle
    /// is returned when any asset failed.
    pub fn build(self) -> Result<AssetBundle, AssetError> {
        let config = self.config;
        let selection = engine::select(&config.assets, config.compress())?;
        let compilers = self
            .compilers
            .unwrap_or_else(|| CompilerSet::from_config(config));

        let ctx = BuildContext {
            compilers: &compilers,
            timeout: config.assets.timeout(),
            template_variable: &config.assets.template_variable,
            jade_runtime: config.assets.jade_runtime.as_deref(),
        };

        let mut assets = build_all(&selection, &ctx);
        for asset in &assets {
            if let Some(handler) = &self.on_event {
                handler(match asset.failure() {
                    Some(error) => AssetEvent::Failed {
                        url: asset.url(),
                        error,
                    },
                    None => AssetEvent::Created(asset),
                });
            }
        }

        for asset in &mut assets {
            if let Some(error) = asset.take_failure() {
                return Err(error);
            }
        }

        Ok(AssetBundle {
            assets,
            fingerprint: config.assets.fingerprint,
        })
    }
}

/// Build the three assets concurrently.
fn build_all(selection: &Selection, ctx: &BuildContext<'_>) -> [Asset; 3] {
    let (script, (style, template)) = rayon::join(
        || build_asset(&selection.script, ctx),
        || {
            rayon::join(
                || build_asset(&selection.style, ctx),
                || build_asset(&selection.template, ctx),
            )
        },
    );
    [script, style, template]
}

/// Build the bundle with the configured compilers.
pub fn build_bundle(config: &RiggingConfig) -> Result<AssetBundle, AssetError> {
    Builder::new(config).build()
}

/// Three created assets, each reachable by its public URL.
#[derive(Debug)]
pub struct AssetBundle {
    /// Script, style, template order.
    assets: [Asset; 3],
    fingerprint: bool,
}

impl AssetBundle {
    /// `<script>` tag of the application script.
    pub fn js(&self) -> String {
        script_tag(&self.href(AssetClass::Script))
    }

    /// `<link>` tag of the stylesheet.
    pub fn css(&self) -> String {
        format!(
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">",
            self.href(AssetClass::Style)
        )
    }

    /// `<script>` tag of the template library.
    pub fn template_library(&self) -> String {
        script_tag(&self.href(AssetClass::Template))
    }

    /// Asset served at `url`.
    pub fn get(&self, url: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.url() == url)
    }

    pub fn assets(&self) -> &[Asset; 3] {
        &self.assets
    }

    /// Content version of an asset (8 hex chars).
    pub fn version(&self, class: AssetClass) -> String {
        hash::fingerprint(self.contents(class))
    }

    fn contents(&self, class: AssetClass) -> &str {
        self.get(class.url())
            .and_then(Asset::contents)
            .unwrap_or_default()
    }

    /// URL used in tags, versioned when fingerprinting is on.
    pub fn href(&self, class: AssetClass) -> String {
        if self.fingerprint {
            format!("{}?v={}", class.url(), self.version(class))
        } else {
            class.url().to_string()
        }
    }
}

fn script_tag(src: &str) -> String {
    format!("<script type=\"text/javascript\" src=\"{src}\"></script>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetState;
    use crate::compiler::CompileInput;
    use crate::config::test_parse_config;
    use parking_lot::Mutex;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn project(toml: &str) -> (TempDir, RiggingConfig) {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        for sub in ["js", "styles", "templates"] {
            fs::create_dir_all(assets.join(sub)).unwrap();
        }
        fs::write(assets.join("js/a.js"), "var a=1;").unwrap();
        fs::write(assets.join("js/b.js"), "var b=2;").unwrap();
        fs::write(assets.join("styles/site.css"), "body{margin:0}").unwrap();
        fs::write(assets.join("templates/x.html"), "<p>x</p>").unwrap();

        let mut config = test_parse_config(toml);
        config.assets.normalize(dir.path());
        config.set_root(dir.path());
        (dir, config)
    }

    fn write(root: &Path, rel: &str, body: &str) {
        fs::write(root.join("assets").join(rel), body).unwrap();
    }

    #[test]
    fn test_vanilla_bundle() {
        let (_dir, config) = project("");
        let bundle = build_bundle(&config).unwrap();

        assert_eq!(bundle.get("/app.js").unwrap().contents(), Some("var a=1;var b=2;"));
        assert_eq!(bundle.get("/style.css").unwrap().mimetype(), "text/css");
        assert!(bundle.get("/missing.js").is_none());
        assert!(
            bundle
                .assets()
                .iter()
                .all(|asset| asset.state() == AssetState::Created)
        );
    }

    #[test]
    fn test_tags() {
        let (_dir, config) = project("");
        let bundle = build_bundle(&config).unwrap();

        assert_eq!(
            bundle.js(),
            "<script type=\"text/javascript\" src=\"/app.js\"></script>"
        );
        assert_eq!(
            bundle.css(),
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"/style.css\">"
        );
        assert_eq!(
            bundle.template_library(),
            "<script type=\"text/javascript\" src=\"/templates.js\"></script>"
        );
    }

    #[test]
    fn test_fingerprinted_tags() {
        let (_dir, config) = project("[assets]\nfingerprint = true");
        let bundle = build_bundle(&config).unwrap();

        let version = hash::fingerprint("var a=1;var b=2;");
        assert_eq!(
            bundle.js(),
            format!("<script type=\"text/javascript\" src=\"/app.js?v={version}\"></script>")
        );
        assert!(bundle.css().contains("/style.css?v="));
    }

    #[test]
    fn test_compiled_engines_with_fake_compilers() {
        let (dir, config) = project(
            "[assets]\njs_engine = \"browserify\"\ncss_engine = \"stylus\"\ntpl_engine = \"jade\"",
        );
        write(dir.path(), "js/app.js", "require('./a');");
        write(dir.path(), "styles/app.styl", "body\n  margin 0");
        write(dir.path(), "templates/index.jade", "p hello");

        let mut compilers = CompilerSet::new();
        compilers.insert_fn("browserify", |input: &CompileInput<'_>| {
            Ok(format!("(function(){{ {} }})();", input.source))
        });
        compilers.insert_fn("stylus", |_: &CompileInput<'_>| Ok("body{margin:0}".into()));
        compilers.insert_fn("jade", |_: &CompileInput<'_>| {
            Ok("function template(locals) { return \"<p>hello</p>\"; }".into())
        });

        let bundle = Builder::new(&config).compilers(compilers).build().unwrap();
        assert!(
            bundle
                .get("/app.js")
                .and_then(Asset::contents)
                .unwrap()
                .contains("require('./a')")
        );
        assert!(
            bundle
                .get("/templates.js")
                .and_then(Asset::contents)
                .unwrap()
                .contains("window.Templates[\"index\"]")
        );
    }

    #[test]
    fn test_failure_is_atomic() {
        let (dir, config) = project("[assets]\ncss_engine = \"less\"");
        write(dir.path(), "styles/app.less", "a {");

        let mut compilers = CompilerSet::new();
        compilers.insert_fn("less", |_: &CompileInput<'_>| anyhow::bail!("Unrecognised input"));

        let err = Builder::new(&config).compilers(compilers).build().unwrap_err();
        match err {
            AssetError::Compile { path, diagnostic, .. } => {
                assert_eq!(path, config.assets.dir.join("styles/app.less"));
                assert!(diagnostic.contains("Unrecognised input"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_errors_reported_in_class_order() {
        let (_dir, config) = project(
            "[assets]\njs_engine = \"typescript\"\ncss_engine = \"sass\"",
        );
        // both assets fail; the script error wins
        let err = Builder::new(&config)
            .compilers(CompilerSet::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::Configuration(_)));
        assert!(err.to_string().contains("typescript"));
    }

    #[test]
    fn test_unknown_engine_builds_nothing() {
        let (_dir, config) = project("[assets]\njs_engine = \"not-a-thing\"");
        let events = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&events);

        let err = Builder::new(&config)
            .on_event(move |_| *seen.lock() += 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::Configuration(_)));
        assert_eq!(*events.lock(), 0);
    }

    #[test]
    fn test_events_for_every_asset() {
        let (_dir, config) = project("");
        let urls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&urls);

        build_bundle(&config).unwrap();
        Builder::new(&config)
            .on_event(move |event| {
                if let AssetEvent::Created(asset) = event {
                    seen.lock().push(asset.url());
                }
            })
            .build()
            .unwrap();
        assert_eq!(*urls.lock(), ["/app.js", "/style.css", "/templates.js"]);
    }

    #[test]
    fn test_bundle_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssetBundle>();
    }
}
