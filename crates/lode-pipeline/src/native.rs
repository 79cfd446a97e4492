/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * NativeResolver implementation backed by the local filesystem.
 *
 * This resolver:
 * - Resolves `./` and `../` requests against the context directory
 * - Takes absolute requests as-is
 * - Looks bare module requests up in configured module directories
 * - Retains registered dependencies in a drainable set
 */

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::traits::{ModuleResolver, ResolveError, ResolveResult};

/// Filesystem-backed [`ModuleResolver`].
///
/// Hosts with their own resolution machinery implement the trait directly;
/// this implementation covers standalone use and tests. Registered
/// dependencies accumulate in an internal set the host drains after each
/// compilation to wire up its file watcher.
pub struct NativeResolver {
    /// Directories searched for bare module requests, in order.
    module_dirs: Vec<PathBuf>,
    /// Registered build dependencies. BTreeSet keeps drains deterministic.
    dependencies: Mutex<BTreeSet<PathBuf>>,
}

impl NativeResolver {
    /// Create a resolver with no module directories.
    pub fn new() -> Self {
        Self {
            module_dirs: Vec::new(),
            dependencies: Mutex::new(BTreeSet::new()),
        }
    }

    /// Create a resolver that searches the given directories for bare
    /// module requests.
    pub fn with_module_dirs(module_dirs: Vec<PathBuf>) -> Self {
        Self {
            module_dirs,
            dependencies: Mutex::new(BTreeSet::new()),
        }
    }

    /// Take the dependencies registered so far, leaving the set empty.
    pub fn drain_dependencies(&self) -> Vec<PathBuf> {
        let mut set = self.dependencies.lock().expect("dependency set poisoned");
        std::mem::take(&mut *set).into_iter().collect()
    }

    fn lookup(&self, context: &Path, request: &str) -> ResolveResult<PathBuf> {
        if request.is_empty() {
            return Err(ResolveError::InvalidRequest(
                "empty module request".to_string(),
            ));
        }

        let candidate = if Path::new(request).is_absolute() {
            PathBuf::from(request)
        } else if request.starts_with("./") || request.starts_with("../") {
            context.join(request)
        } else {
            // Bare module request: first hit in the configured search path wins.
            let found = self
                .module_dirs
                .iter()
                .map(|dir| dir.join(request))
                .find(|path| path.is_file());
            match found {
                Some(path) => path,
                None => {
                    return Err(ResolveError::NotFound {
                        request: request.to_string(),
                        context: context.to_path_buf(),
                    });
                }
            }
        };

        if candidate.is_file() {
            tracing::debug!(request, resolved = %candidate.display(), "Resolved module request");
            // Canonicalization keeps the dependency set free of `..` aliases.
            Ok(candidate.canonicalize()?)
        } else {
            Err(ResolveError::NotFound {
                request: request.to_string(),
                context: context.to_path_buf(),
            })
        }
    }
}

impl Default for NativeResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleResolver for NativeResolver {
    fn resolve_sync(&self, context: &Path, request: &str) -> ResolveResult<PathBuf> {
        self.lookup(context, request)
    }

    async fn resolve(&self, context: &Path, request: &str) -> ResolveResult<PathBuf> {
        // Filesystem probing is cheap enough to stay on the calling task.
        self.lookup(context, request)
    }

    fn add_dependency(&self, path: &Path) {
        let mut set = self.dependencies.lock().expect("dependency set poisoned");
        set.insert(path.to_path_buf());
    }
}
