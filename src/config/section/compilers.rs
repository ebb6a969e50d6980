//! `[compilers]` section configuration.
//!
//! One external command per compiling engine. Arguments may reference:
//! - `$INPUT`  - absolute path of the source file (omit it to receive the
//!   source on stdin)
//! - `$OUTPUT` - scratch file to write to (omit it to capture stdout)
//! - `$ROOT`   - project root
//!
//! # Example
//!
//! ```toml
//! [compilers]
//! browserify = ["npx", "browserify", "$INPUT"]
//! typescript = ["tsc", "--outFile", "$OUTPUT", "$INPUT"]
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::engine::Engine;
use serde::{Deserialize, Serialize};

/// Package runners fetch the real tool on demand, so a missing tool is not an error.
const PACKAGE_RUNNERS: [&str; 5] = ["npx", "bunx", "pnpx", "yarn", "dlx"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilersConfig {
    pub browserify: Vec<String>,
    pub snockets: Vec<String>,
    pub coffeescript: Vec<String>,
    pub typescript: Vec<String>,
    pub less: Vec<String>,
    pub stylus: Vec<String>,
    pub sass: Vec<String>,
    pub jade: Vec<String>,
}

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

impl Default for CompilersConfig {
    fn default() -> Self {
        Self {
            browserify: command(&["browserify", "$INPUT"]),
            snockets: command(&["snockets", "$INPUT"]),
            coffeescript: command(&["coffee", "--print", "--compile", "$INPUT"]),
            typescript: command(&["tsc", "--outFile", "$OUTPUT", "$INPUT"]),
            less: command(&["lessc", "$INPUT"]),
            stylus: command(&["stylus", "--print", "$INPUT"]),
            sass: command(&["sass", "--no-source-map", "$INPUT"]),
            jade: command(&["jade", "--client", "--no-debug"]),
        }
    }
}

impl CompilersConfig {
    /// Every configured command, keyed by engine name.
    pub fn entries(&self) -> [(&'static str, &[String]); 8] {
        [
            ("browserify", self.browserify.as_slice()),
            ("snockets", self.snockets.as_slice()),
            ("coffeescript", self.coffeescript.as_slice()),
            ("typescript", self.typescript.as_slice()),
            ("less", self.less.as_slice()),
            ("stylus", self.stylus.as_slice()),
            ("sass", self.sass.as_slice()),
            ("jade", self.jade.as_slice()),
        ]
    }

    /// Command configured for an engine name.
    pub fn get(&self, engine: &str) -> Option<&[String]> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == engine)
            .map(|(_, cmd)| cmd)
    }

    /// Field path of the command for an engine name.
    pub fn field(engine: &'static str) -> FieldPath {
        match engine {
            "browserify" => FieldPath::new("compilers.browserify"),
            "snockets" => FieldPath::new("compilers.snockets"),
            "coffeescript" => FieldPath::new("compilers.coffeescript"),
            "typescript" => FieldPath::new("compilers.typescript"),
            "less" => FieldPath::new("compilers.less"),
            "stylus" => FieldPath::new("compilers.stylus"),
            "sass" => FieldPath::new("compilers.sass"),
            _ => FieldPath::new("compilers.jade"),
        }
    }

    /// Validate structure: no command may be empty.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, cmd) in self.entries() {
            if cmd.is_empty() {
                diag.error(Self::field(name), "command must not be empty");
            }
        }
    }

    /// Check that the commands of the selected engines are installed.
    ///
    /// Only engines that actually compile are checked; vanilla aggregation
    /// needs no tool.
    pub fn validate_installed(&self, engines: &[Engine], diag: &mut ConfigDiagnostics) {
        for engine in engines {
            let Some(name) = engine.compiler() else {
                continue;
            };
            let Some(cmd) = self.get(name).and_then(|cmd| cmd.first()) else {
                continue;
            };

            if which::which(cmd).is_ok() {
                continue;
            }

            let field = Self::field(name);
            if PACKAGE_RUNNERS.contains(&cmd.as_str()) {
                diag.hint(field, format!("`{cmd}` will fetch the {name} compiler on demand"));
            } else {
                diag.error_with_hint(
                    field,
                    format!("`{cmd}` not found"),
                    format!("install {name} or update {field}"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::engine::{ScriptEngine, StyleEngine};

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.compilers.less, vec!["lessc", "$INPUT"]);
        assert_eq!(config.compilers.get("jade").unwrap()[0], "jade");
        assert!(config.compilers.get("vanilla").is_none());
    }

    #[test]
    fn test_override_command() {
        let config = test_parse_config("[compilers]\nbrowserify = [\"npx\", \"browserify\", \"$INPUT\"]");
        assert_eq!(
            config.compilers.browserify,
            vec!["npx", "browserify", "$INPUT"]
        );
        // untouched entries keep their defaults
        assert_eq!(config.compilers.sass[0], "sass");
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = test_parse_config("[compilers]\nstylus = []");
        let mut diag = ConfigDiagnostics::new();
        config.compilers.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, FieldPath::new("compilers.stylus"));
    }

    #[test]
    fn test_missing_tool_reported() {
        let config = test_parse_config("[compilers]\nless = [\"rigging-missing-lessc\", \"$INPUT\"]");
        let mut diag = ConfigDiagnostics::new();
        config.compilers.validate_installed(
            &[
                Engine::Script(ScriptEngine::Vanilla),
                Engine::Style(StyleEngine::Less),
            ],
            &mut diag,
        );
        assert_eq!(diag.len(), 1);
        assert!(diag.errors()[0].message.contains("rigging-missing-lessc"));
    }

    #[test]
    fn test_vanilla_needs_no_tool() {
        let config = test_parse_config("[compilers]\nless = [\"rigging-missing-lessc\"]");
        let mut diag = ConfigDiagnostics::new();
        config
            .compilers
            .validate_installed(&[Engine::Style(StyleEngine::Vanilla)], &mut diag);
        assert!(diag.is_empty());
    }
}
