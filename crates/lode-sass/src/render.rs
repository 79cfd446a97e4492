//! High-level render driver for the build pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This module is the entry point the host pipeline calls. It assembles the
//! compile request from the transform options and the pipeline context,
//! attaches the import hook matching the invocation mode, invokes the
//! compiler, and reshapes what comes back:
//!
//! - on success, CSS text plus a source map whose `file` and first source
//!   entry are rewritten for the pipeline's output layout
//! - on failure, a [`CompileError`] formatted for a terminal
//!
//! The two invocation modes are separate, explicitly-typed entry points
//! ([`render_sync`] and [`render`]); callers pick one per invocation and the
//! modes are never mixed within it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

use crate::compiler::{
    CompileOutput, CompileRequest, Compiler, ImporterRef, OutputStyle, Syntax,
};
use crate::error::CompileError;
use crate::importer::PipelineImporter;
use crate::options::{PipelineContext, RenderRequest, SourceMapRequest};
use crate::report::format_compile_error;

/// A structured source map, as reshaped for the host pipeline.
///
/// Only the fields the pipeline rewrites are modelled; everything else the
/// engine emitted rides along in `rest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// What the transform hands back to the pipeline.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub css: String,
    /// Present only when the engine produced a non-trivial map.
    pub map: Option<SourceMap>,
}

/// Per-invocation facts derived from options and pipeline context.
struct RenderPlan {
    syntax: Syntax,
    style: OutputStyle,
    default_extension: &'static str,
    include_paths: Vec<PathBuf>,
    source_map: Option<PathBuf>,
}

impl RenderPlan {
    fn assemble(request: &RenderRequest<'_>, pipeline: &PipelineContext<'_>) -> Self {
        let indented = request.options.indented_syntax.unwrap_or(false);
        let style = request.options.output_style.unwrap_or(if pipeline.minimize() {
            OutputStyle::Compressed
        } else {
            OutputStyle::default()
        });

        // The entry document's own directory always participates in import
        // lookup, ahead of any configured include paths.
        let mut include_paths = Vec::new();
        if let Some(parent) = request.resource_path.parent() {
            include_paths.push(parent.to_path_buf());
        }
        include_paths.extend(request.options.include_paths.iter().cloned());

        let source_map = match &request.options.source_map {
            SourceMapRequest::Off => None,
            SourceMapRequest::Auto => Some(PathBuf::from(format!(
                "{}.map",
                request.resource_path.display()
            ))),
            SourceMapRequest::Target(path) => Some(path.clone()),
        };

        Self {
            syntax: if indented { Syntax::Indented } else { Syntax::Scss },
            style,
            default_extension: if indented { ".sass" } else { ".scss" },
            include_paths,
            source_map,
        }
    }
}

/// Compile one stylesheet, blocking.
pub fn render_sync(
    compiler: &dyn Compiler,
    request: &RenderRequest<'_>,
    pipeline: &PipelineContext<'_>,
) -> Result<RenderOutput, CompileError> {
    if request.source.trim().is_empty() {
        // An empty document would abort the engine; pass it through instead.
        tracing::debug!(resource = %request.resource_path.display(), "Skipping empty stylesheet");
        return Ok(RenderOutput {
            css: request.source.to_string(),
            map: None,
        });
    }

    let plan = RenderPlan::assemble(request, pipeline);
    let importer = PipelineImporter::new(
        pipeline.resolver(),
        request.resource_path,
        plan.default_extension,
        request.options.root.as_deref(),
    );

    tracing::debug!(resource = %request.resource_path.display(), "Rendering stylesheet");
    let result = compiler.render_sync(CompileRequest {
        source: request.source,
        syntax: plan.syntax,
        style: plan.style,
        source_map: plan.source_map.as_deref(),
        include_paths: &plan.include_paths,
        importer: ImporterRef::Blocking(&importer),
        passthrough: &request.options.passthrough,
    });

    match result {
        Ok(output) => Ok(reshape_output(output, request, pipeline)),
        Err(mut error) => {
            format_compile_error(&mut error, request.resource_path);
            Err(error)
        }
    }
}

/// Compile one stylesheet without blocking.
///
/// Same semantics as [`render_sync`] with the non-blocking import hook
/// attached.
pub async fn render(
    compiler: &dyn Compiler,
    request: &RenderRequest<'_>,
    pipeline: &PipelineContext<'_>,
) -> Result<RenderOutput, CompileError> {
    if request.source.trim().is_empty() {
        tracing::debug!(resource = %request.resource_path.display(), "Skipping empty stylesheet");
        return Ok(RenderOutput {
            css: request.source.to_string(),
            map: None,
        });
    }

    let plan = RenderPlan::assemble(request, pipeline);
    let importer = PipelineImporter::new(
        pipeline.resolver(),
        request.resource_path,
        plan.default_extension,
        request.options.root.as_deref(),
    );

    tracing::debug!(resource = %request.resource_path.display(), "Rendering stylesheet");
    let result = compiler
        .render(CompileRequest {
            source: request.source,
            syntax: plan.syntax,
            style: plan.style,
            source_map: plan.source_map.as_deref(),
            include_paths: &plan.include_paths,
            importer: ImporterRef::NonBlocking(&importer),
            passthrough: &request.options.passthrough,
        })
        .await;

    match result {
        Ok(output) => Ok(reshape_output(output, request, pipeline)),
        Err(mut error) => {
            format_compile_error(&mut error, request.resource_path);
            Err(error)
        }
    }
}

fn reshape_output(
    output: CompileOutput,
    request: &RenderRequest<'_>,
    pipeline: &PipelineContext<'_>,
) -> RenderOutput {
    let map = output
        .map
        .as_deref()
        .and_then(|raw| reshape_source_map(raw, request.resource_path, pipeline.output_dir()));
    RenderOutput {
        css: output.css,
        map,
    }
}

/// Point the engine's map at the real resource instead of the root-document
/// sentinel. Trivial maps (empty, `{}`, unparseable) are dropped.
fn reshape_source_map(raw: &str, resource_path: &Path, output_dir: &Path) -> Option<SourceMap> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return None;
    }
    let mut map: SourceMap = serde_json::from_str(trimmed).ok()?;

    map.file = Some(resource_path.display().to_string());
    if let Some(first) = map.sources.first_mut() {
        *first = relative_to(output_dir, resource_path);
    }
    Some(map)
}

/// Express `target` relative to `base`, with `/` separators as source maps
/// expect.
fn relative_to(base: &Path, target: &Path) -> String {
    let base_components: Vec<Component<'_>> = base.components().collect();
    let target_components: Vec<Component<'_>> = target.components().collect();

    let shared = base_components
        .iter()
        .zip(&target_components)
        .take_while(|(a, b)| a == b)
        .count();
    if shared == 0 && (base.is_absolute() || target.is_absolute()) {
        // Different roots; nothing relative to express.
        return target.display().to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in &base_components[shared..] {
        parts.push("..".to_string());
    }
    for component in &target_components[shared..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
