/*
 * lode-pipeline
 * Copyright (c) 2025 Posit, PBC
 *
 * Build-pipeline abstraction layer for lode transforms.
 *
 * This crate defines the seam between a source transform and the host build
 * system it runs inside:
 *
 * - ModuleResolver: how a transform turns an import request into a file,
 *   in both blocking and non-blocking flavors, and how resolved files are
 *   registered for incremental-rebuild tracking
 * - NativeResolver: a filesystem-backed implementation for hosts without
 *   their own resolution machinery (and for tests)
 */

mod native;
mod traits;

// Re-export core types (API surface)
pub use traits::{ModuleResolver, ResolveError, ResolveResult};

pub use native::NativeResolver;
