//! Optional minification of built assets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Scripts are parsed as
//! classic (non-module) sources so top-level declarations stay global.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::AssetError;
use crate::utils::mime::types;

/// Minify `contents` when `compress` is set; other mimetypes pass through.
pub fn apply(
    contents: String,
    url: &'static str,
    mimetype: &'static str,
    compress: bool,
) -> Result<String, AssetError> {
    if !compress {
        return Ok(contents);
    }

    let minified = match mimetype {
        types::JAVASCRIPT => minify_js(&contents),
        types::CSS => minify_css(&contents),
        _ => return Ok(contents),
    };

    minified.map_err(|diagnostic| AssetError::Minify {
        url,
        mimetype,
        diagnostic,
    })
}

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<_> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(messages.join("\n"));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, String> {
    let stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}
