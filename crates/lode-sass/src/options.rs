//! Render request options and the pipeline context.
//!
//! Copyright (c) 2025 Posit, PBC

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use lode_pipeline::ModuleResolver;

use crate::compiler::OutputStyle;

/// How the host asked for a source map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceMapRequest {
    /// No map.
    #[default]
    Off,
    /// A map whose target path is derived from the resource path.
    Auto,
    /// A map written toward an explicit target path.
    Target(PathBuf),
}

/// Options recognized by the transform.
///
/// Anything the transform itself does not understand lands in
/// `passthrough` and is forwarded to the compiler untouched.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Treat the source as whitespace-significant indented syntax.
    pub indented_syntax: Option<bool>,
    /// Explicit output style; overrides the minimize-flag default.
    pub output_style: Option<OutputStyle>,
    pub source_map: SourceMapRequest,
    /// Base directory for `/`-rooted import URLs.
    pub root: Option<PathBuf>,
    /// Extra directories the compiler searches for imports.
    pub include_paths: Vec<PathBuf>,
    /// Engine-specific options, forwarded as-is.
    pub passthrough: Map<String, Value>,
}

impl TransformOptions {
    /// Parse a query-string-style options blob.
    ///
    /// Values are JSON when they parse as JSON and plain strings otherwise;
    /// a key without a value means `true`. Unrecognized keys pass through.
    ///
    /// ```
    /// use lode_sass::TransformOptions;
    ///
    /// let options = TransformOptions::from_query("?indentedSyntax=true&outputStyle=compressed");
    /// assert_eq!(options.indented_syntax, Some(true));
    /// ```
    pub fn from_query(query: &str) -> Self {
        let mut options = Self::default();

        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty());
        for pair in pairs {
            let (key, value) = match pair.split_once('=') {
                Some((key, raw)) => (key, decode_value(raw)),
                None => (pair, Value::Bool(true)),
            };
            match key {
                "indentedSyntax" => options.indented_syntax = Some(truthy(&value)),
                "outputStyle" => {
                    options.output_style = value.as_str().and_then(OutputStyle::parse);
                }
                "sourceMap" => {
                    options.source_map = match &value {
                        Value::Bool(true) => SourceMapRequest::Auto,
                        Value::String(path) => SourceMapRequest::Target(PathBuf::from(path)),
                        _ => SourceMapRequest::Off,
                    };
                }
                "root" => {
                    options.root = value.as_str().map(PathBuf::from);
                }
                "includePaths" => {
                    if let Some(paths) = value.as_str() {
                        options.include_paths = paths
                            .split(',')
                            .filter(|path| !path.is_empty())
                            .map(PathBuf::from)
                            .collect();
                    }
                }
                _ => {
                    options.passthrough.insert(key.to_string(), value);
                }
            }
        }

        options
    }
}

/// Values are JSON when they parse as JSON, plain strings otherwise.
fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text == "true",
        _ => false,
    }
}

/// One transform invocation's input.
#[derive(Debug)]
pub struct RenderRequest<'a> {
    /// Source text of the entry document.
    pub source: &'a str,
    /// Where the entry document lives on disk.
    pub resource_path: &'a Path,
    pub options: TransformOptions,
}

/// The host pipeline's side of a transform invocation.
///
/// Bundles the module resolver with the pipeline facts the driver needs:
/// whether a minification pass is active and where output is emitted
/// (source-map paths are expressed relative to it).
pub struct PipelineContext<'a> {
    resolver: &'a dyn ModuleResolver,
    output_dir: PathBuf,
    minimize: bool,
}

impl<'a> PipelineContext<'a> {
    pub fn new(resolver: &'a dyn ModuleResolver, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            output_dir: output_dir.into(),
            minimize: false,
        }
    }

    /// Mark this invocation as part of a minification pass.
    pub fn minimized(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn resolver(&self) -> &'a dyn ModuleResolver {
        self.resolver
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn minimize(&self) -> bool {
        self.minimize
    }
}
