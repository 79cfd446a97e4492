//! Terminal-facing reshaping of compiler errors.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A raw compiler error points at the root-document sentinel and carries a
//! one-line message. For a human reading build output that is not enough:
//! the message gains a source excerpt with a caret under the offending
//! column, the sentinel is replaced with the real resource path, and the
//! host reporter is told to drop the internal call stack.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::compiler::SourceRef;
use crate::error::CompileError;

/// Compilers embed a working-directory hint in some messages. It is
/// misleading once the file path has been corrected.
static CURRENT_DIR_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*Current dir:\s*[^\r\n]*").unwrap());

const LINE_BREAK: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Reshape a compiler error in place for the host's error channel.
pub fn format_compile_error(error: &mut CompileError, resource_path: &Path) {
    if error.file == SourceRef::RootDocument {
        error.file = SourceRef::File(resource_path.to_path_buf());
    }

    let message = CURRENT_DIR_HINT.replace_all(&error.message, "");
    let excerpt = file_excerpt(error);

    let file = match error.file.as_path() {
        Some(path) => path.display().to_string(),
        None => String::new(),
    };
    let location = match (error.line, error.column) {
        (Some(line), Some(column)) => format!(" (line {line}, column {column})"),
        (Some(line), None) => format!(" (line {line})"),
        _ => String::new(),
    };

    error.message = format!(
        "{excerpt}{message}{LINE_BREAK}      in {file}{location}",
        message = capitalize_first(&message),
    );
    error.hide_stack = true;
}

/// The offending source line with a caret under the reported column.
///
/// Any failure to read or index the file yields an empty excerpt; excerpt
/// construction never introduces a new error.
fn file_excerpt(error: &CompileError) -> String {
    let Some(path) = error.file.as_path() else {
        return String::new();
    };
    let (Some(line), Some(column)) = (error.line, error.column) else {
        return String::new();
    };
    let Ok(contents) = std::fs::read_to_string(path) else {
        return String::new();
    };
    let Some(text) = contents.lines().nth(line.saturating_sub(1) as usize) else {
        return String::new();
    };

    let caret_indent = " ".repeat(column.saturating_sub(1) as usize);
    format!("{text}{LINE_BREAK}{caret_indent}^{LINE_BREAK}      ")
}

fn capitalize_first(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
