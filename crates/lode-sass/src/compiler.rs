//! The compiler contract the transform drives.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The stylesheet compiler is a black box to this crate: it takes source
//! text plus options, calls back into an importer for every `@import`/`@use`
//! reference it encounters, and produces CSS (optionally with a source map)
//! or a structured error.
//!
//! Two details of the contract deserve attention:
//!
//! - **Import hooks are typed, not introspected.** A compiler host must not
//!   inspect a callback's parameter count to decide between synchronous and
//!   asynchronous import handling. Instead there are two distinct traits —
//!   [`Importer`] (blocking, returns a value) and [`AsyncImporter`]
//!   (non-blocking) — and the caller registers the one matching its own
//!   invocation mode via [`ImporterRef`].
//! - **Importers cannot fail.** The import protocol has no error channel:
//!   every call produces exactly one [`ImportOutcome`]. When resolution
//!   misses entirely, the importer hands back its best-guess path and the
//!   compiler's own read attempt surfaces the problem as a regular
//!   [`CompileError`](crate::CompileError).

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::CompileError;

/// Identifies a document during compilation.
///
/// Compilers label the entry document — the source handed over as text
/// rather than read from a file — with a magic string. That sentinel is an
/// explicit variant here and is translated back at the compiler boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// The top-level source passed directly as text.
    RootDocument,
    /// A document read from a file.
    File(PathBuf),
}

impl SourceRef {
    /// The file path, when this refers to one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            SourceRef::RootDocument => None,
            SourceRef::File(path) => Some(path),
        }
    }
}

/// What an importer produced for one import reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Stylesheet text to embed directly in place of the reference.
    Inline(String),
    /// A file path the compiler should read and parse itself.
    File(PathBuf),
}

/// Input syntax of the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Syntax {
    /// Brace-and-semicolon SCSS.
    #[default]
    Scss,
    /// Whitespace-significant indented syntax.
    Indented,
}

/// CSS output style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl OutputStyle {
    /// Parse a style name from an options blob.
    ///
    /// Engines disagree on style vocabulary; the historical `nested` and
    /// `compact` names map onto the two styles every engine supports.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "expanded" | "nested" => Some(OutputStyle::Expanded),
            "compressed" | "compact" => Some(OutputStyle::Compressed),
            _ => None,
        }
    }
}

/// Blocking import hook.
pub trait Importer: Send + Sync {
    /// Resolve one import reference. `context` is the document containing
    /// the reference. Infallible by contract.
    fn import(&self, url: &str, context: &SourceRef) -> ImportOutcome;
}

/// Non-blocking import hook. Same contract as [`Importer`].
#[async_trait]
pub trait AsyncImporter: Send + Sync {
    async fn import(&self, url: &str, context: &SourceRef) -> ImportOutcome;
}

/// The import hook registered for one compilation, matching its mode.
#[derive(Clone, Copy)]
pub enum ImporterRef<'a> {
    Blocking(&'a dyn Importer),
    NonBlocking(&'a dyn AsyncImporter),
}

/// One compilation's worth of input.
#[derive(Clone, Copy)]
pub struct CompileRequest<'a> {
    /// The source text of the entry document.
    pub source: &'a str,
    pub syntax: Syntax,
    pub style: OutputStyle,
    /// Target path for the source map, when one was requested.
    pub source_map: Option<&'a Path>,
    /// Directories searched for imports the importer does not settle.
    pub include_paths: &'a [PathBuf],
    pub importer: ImporterRef<'a>,
    /// Engine-specific options forwarded untouched.
    pub passthrough: &'a Map<String, Value>,
}

/// Raw compiler output, before the driver reshapes it for the pipeline.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub css: String,
    /// Serialized source map, if the engine produced one. May be empty or
    /// `{}` for engines that emit trivial maps.
    pub map: Option<String>,
}

/// A stylesheet compiler.
///
/// Both entry points compile one request to completion; a failure is
/// terminal for that invocation. The two modes are never mixed within one
/// invocation.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile, blocking the calling thread.
    fn render_sync(&self, request: CompileRequest<'_>) -> Result<CompileOutput, CompileError>;

    /// Compile without blocking.
    async fn render(&self, request: CompileRequest<'_>) -> Result<CompileOutput, CompileError>;
}
