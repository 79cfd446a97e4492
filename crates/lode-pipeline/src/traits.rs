/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the ModuleResolver trait and supporting types for the pipeline
 * abstraction layer.
 *
 * A build pipeline resolves module requests through its own machinery
 * (alias maps, search paths, caches) rather than plain filesystem lookup.
 * Transforms consume that machinery through this trait so the same code
 * runs under any host.
 */

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can occur during module resolution
#[derive(Debug)]
pub enum ResolveError {
    /// The request did not resolve to any file
    NotFound {
        /// The request as handed to the resolver
        request: String,
        /// Directory the request was resolved against
        context: PathBuf,
    },

    /// The request was malformed (empty, or not expressible on this host)
    InvalidRequest(String),

    /// Standard I/O error while probing the filesystem
    Io(io::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::NotFound { request, context } => {
                write!(
                    f,
                    "Cannot resolve '{}' in '{}'",
                    request,
                    context.display()
                )
            }
            ResolveError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ResolveError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ResolveError {
    fn from(e: io::Error) -> Self {
        ResolveError::Io(e)
    }
}

/// Trait defining the module-resolution surface a transform consumes.
///
/// Implementations wrap whatever the host build system uses to locate
/// modules. Both a blocking and a non-blocking entry point are required
/// with identical semantics; a transform picks the one matching its own
/// invocation mode and never mixes them within one invocation.
///
/// Dependency registration is additive and idempotent: registering the
/// same path twice is harmless, and the host uses the registered set to
/// decide what triggers an incremental rebuild.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Resolve a request against a context directory, blocking.
    ///
    /// `request` follows the host's request grammar: `./a` and `../a` are
    /// relative to `context`, absolute paths stand alone, and bare names
    /// are module requests looked up in host-configured locations.
    fn resolve_sync(&self, context: &Path, request: &str) -> ResolveResult<PathBuf>;

    /// Resolve a request against a context directory, non-blocking.
    ///
    /// Same semantics as [`resolve_sync`](Self::resolve_sync).
    async fn resolve(&self, context: &Path, request: &str) -> ResolveResult<PathBuf>;

    /// Register a file as a build dependency of the current compilation.
    ///
    /// Only files the resolver actually located should be registered.
    fn add_dependency(&self, path: &Path);
}
