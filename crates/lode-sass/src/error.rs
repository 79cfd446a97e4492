//! Error type surfaced by the transform.
//!
//! Copyright (c) 2025 Posit, PBC

use thiserror::Error;

use crate::compiler::SourceRef;

/// A failed compilation.
///
/// This is the only error that crosses the transform boundary: import
/// resolution misses, unreadable excerpt files, and degenerate empty inputs
/// are all absorbed internally. The raw compiler error is reshaped by
/// [`format_compile_error`](crate::format_compile_error) before the host
/// sees it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    /// Human-readable description. After formatting this is the full
    /// multi-line message including the source excerpt and location trailer.
    pub message: String,

    /// Where the error occurred. Compilers report the entry document with a
    /// sentinel; formatting rewrites it to the real resource path.
    pub file: SourceRef,

    /// 1-indexed line, when the compiler reports one.
    pub line: Option<u32>,

    /// 1-indexed column, when the compiler reports one.
    pub column: Option<u32>,

    /// Compiler exit status.
    pub status: i32,

    /// Tells the host's top-level reporter to suppress the internal call
    /// stack; only the composed message is meaningful to the user.
    pub hide_stack: bool,
}

impl CompileError {
    /// An error attributed to the entry document.
    pub fn in_root_document(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: SourceRef::RootDocument,
            line: None,
            column: None,
            status: 1,
            hide_stack: false,
        }
    }
}
