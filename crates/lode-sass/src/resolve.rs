//! Candidate guessing and the bridge onto the host resolver.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! An import reference rarely names its target file exactly: `@import "foo"`
//! may mean `foo.scss`, the plain-CSS `foo.css`, or the partial `_foo.scss`.
//! Each reference expands into an ordered candidate list, and the host
//! resolver is driven over that list — first success wins, and a successful
//! resolution is registered as a build dependency.
//!
//! When every candidate misses, the bridge still produces a result: the last
//! candidate's unresolved request, as a file reference. The compiler's own
//! read attempt then reports the failure through its normal error path,
//! which is the only error channel the import protocol has.

use std::path::{Path, PathBuf};

use lode_pipeline::ModuleResolver;

use crate::compiler::ImportOutcome;

/// Naming convention behind one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateKind {
    /// The request exactly as written.
    AsIs,
    /// Same basename with a `.css` extension.
    CssCoerced,
    /// Partial convention: basename prefixed with `_`.
    UnderscorePrefixed,
}

/// One derived resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub request: String,
    pub kind: CandidateKind,
}

/// Expand a request into its three candidates, in resolution order.
///
/// The directory prefix of the request is preserved for all three.
pub(crate) fn import_candidates(request: &str) -> [Candidate; 3] {
    let (prefix, name) = match request.rsplit_once('/') {
        Some((dir, name)) => (format!("{dir}/"), name),
        None => (String::new(), request),
    };
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => name,
    };

    [
        Candidate {
            request: request.to_string(),
            kind: CandidateKind::AsIs,
        },
        Candidate {
            request: format!("{prefix}{stem}.css"),
            kind: CandidateKind::CssCoerced,
        },
        Candidate {
            request: format!("{prefix}_{name}"),
            kind: CandidateKind::UnderscorePrefixed,
        },
    ]
}

fn is_css_reference(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "css")
}

/// Drive the host resolver over the candidate list, blocking.
///
/// Never fails: every call terminates in exactly one [`ImportOutcome`].
pub(crate) fn resolve_blocking(
    resolver: &dyn ModuleResolver,
    context: &Path,
    request: &str,
) -> ImportOutcome {
    let [first, second, third] = import_candidates(request);

    for candidate in [&first, &second, &third] {
        match resolver.resolve_sync(context, &candidate.request) {
            Ok(resolved) => {
                resolver.add_dependency(&resolved);
                tracing::debug!(
                    request = %candidate.request,
                    kind = ?candidate.kind,
                    resolved = %resolved.display(),
                    "Import candidate resolved"
                );
                if is_css_reference(&resolved) {
                    // Plain CSS is embedded as-is so the compiler does not
                    // re-parse it through its own import machinery.
                    return match std::fs::read_to_string(&resolved) {
                        Ok(text) => ImportOutcome::Inline(text),
                        Err(_) => ImportOutcome::File(resolved),
                    };
                }
                return ImportOutcome::File(resolved);
            }
            Err(error) => {
                tracing::debug!(request = %candidate.request, %error, "Import candidate missed");
            }
        }
    }

    ImportOutcome::File(PathBuf::from(third.request))
}

/// Drive the host resolver over the candidate list, non-blocking.
///
/// Identical semantics to [`resolve_blocking`]; candidates are awaited
/// strictly in order, each only after the previous one's result is known.
pub(crate) async fn resolve_nonblocking(
    resolver: &dyn ModuleResolver,
    context: &Path,
    request: &str,
) -> ImportOutcome {
    let [first, second, third] = import_candidates(request);

    for candidate in [&first, &second, &third] {
        match resolver.resolve(context, &candidate.request).await {
            Ok(resolved) => {
                resolver.add_dependency(&resolved);
                tracing::debug!(
                    request = %candidate.request,
                    kind = ?candidate.kind,
                    resolved = %resolved.display(),
                    "Import candidate resolved"
                );
                if is_css_reference(&resolved) {
                    return match tokio::fs::read_to_string(&resolved).await {
                        Ok(text) => ImportOutcome::Inline(text),
                        Err(_) => ImportOutcome::File(resolved),
                    };
                }
                return ImportOutcome::File(resolved);
            }
            Err(error) => {
                tracing::debug!(request = %candidate.request, %error, "Import candidate missed");
            }
        }
    }

    ImportOutcome::File(PathBuf::from(third.request))
}
