//! SASS transform for the lode build pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate adapts a stylesheet compiler into a build-pipeline transform.
//! The pipeline hands over source text and a resource path; the transform
//! resolves `@import`-style references through the pipeline's own module
//! resolution (see [`lode_pipeline::ModuleResolver`]), invokes the compiler
//! in blocking or non-blocking mode, and reshapes the result:
//!
//! - compiled CSS plus a source map pointed at the real resource
//! - or a [`CompileError`] formatted for a terminal, with a source excerpt
//!   and no internal call-stack noise
//!
//! The compiler itself is a black box behind the [`Compiler`] trait. A
//! grass-backed implementation ships for native targets
//! ([`GrassCompiler`]); hosts wrapping other engines implement the trait
//! and the [`Importer`]/[`AsyncImporter`] hooks it drives.

mod compiler;
mod error;
mod importer;
mod options;
mod render;
mod report;
mod resolve;

// Native compiler backend is only built where grass is available.
#[cfg(not(target_arch = "wasm32"))]
mod native;

// Re-export core types (API surface)
pub use compiler::{
    AsyncImporter, CompileOutput, CompileRequest, Compiler, ImportOutcome, Importer, ImporterRef,
    OutputStyle, SourceRef, Syntax,
};
pub use error::CompileError;
pub use importer::PipelineImporter;
pub use options::{PipelineContext, RenderRequest, SourceMapRequest, TransformOptions};
pub use render::{RenderOutput, SourceMap, render, render_sync};
pub use report::format_compile_error;

#[cfg(not(target_arch = "wasm32"))]
pub use native::GrassCompiler;
