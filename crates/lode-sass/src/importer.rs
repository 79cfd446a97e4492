//! Adapter implementing the compiler's import hooks over the pipeline
//! resolver.
//!
//! Copyright (c) 2025 Posit, PBC

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use lode_pipeline::ModuleResolver;

use crate::compiler::{AsyncImporter, ImportOutcome, Importer, SourceRef};
use crate::resolve::{resolve_blocking, resolve_nonblocking};

/// Extensions the compiler understands without help.
const STYLE_EXTENSIONS: [&str; 3] = [".scss", ".sass", ".css"];

/// Import hook routing the compiler's references through the host resolver.
///
/// Implements both [`Importer`] and [`AsyncImporter`]; the render driver
/// registers the variant matching its own invocation mode.
pub struct PipelineImporter<'a> {
    resolver: &'a dyn ModuleResolver,
    /// Path of the entry document, substituted for the root-document
    /// sentinel before resolution.
    resource_path: &'a Path,
    /// Extension appended to bare references when the context offers none.
    default_extension: &'static str,
    /// Base directory for `/`-rooted references.
    root: Option<&'a Path>,
}

impl<'a> PipelineImporter<'a> {
    pub fn new(
        resolver: &'a dyn ModuleResolver,
        resource_path: &'a Path,
        default_extension: &'static str,
        root: Option<&'a Path>,
    ) -> Self {
        Self {
            resolver,
            resource_path,
            default_extension,
            root,
        }
    }

    /// Normalize one reference into a context directory and a resolver
    /// request.
    fn plan(&self, url: &str, context: &SourceRef) -> (PathBuf, String) {
        let context_path = match context {
            SourceRef::RootDocument => self.resource_path,
            SourceRef::File(path) => path.as_path(),
        };
        let context_dir = context_path.parent().unwrap_or_else(|| Path::new("."));
        let url = self.ensure_extension(url, context_path);
        (context_dir.to_path_buf(), self.to_request(&url))
    }

    /// Bare references inherit the context document's extension; failing
    /// that, the syntax-derived default applies.
    fn ensure_extension(&self, url: &str, context_path: &Path) -> String {
        if STYLE_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
            return url.to_string();
        }
        match context_path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{url}.{ext}"),
            None => format!("{url}{}", self.default_extension),
        }
    }

    /// Translate a stylesheet URL into the host resolver's request grammar.
    fn to_request(&self, url: &str) -> String {
        if let Some(bare) = url.strip_prefix('~') {
            // `~name` addresses a module through the host's search paths.
            return bare.to_string();
        }
        if let Some(rooted) = url.strip_prefix('/') {
            if let Some(root) = self.root {
                return root.join(rooted).to_string_lossy().into_owned();
            }
            return url.to_string();
        }
        if url.starts_with("./") || url.starts_with("../") {
            return url.to_string();
        }
        format!("./{url}")
    }
}

impl Importer for PipelineImporter<'_> {
    fn import(&self, url: &str, context: &SourceRef) -> ImportOutcome {
        let (context_dir, request) = self.plan(url, context);
        resolve_blocking(self.resolver, &context_dir, &request)
    }
}

#[async_trait]
impl AsyncImporter for PipelineImporter<'_> {
    async fn import(&self, url: &str, context: &SourceRef) -> ImportOutcome {
        let (context_dir, request) = self.plan(url, context);
        resolve_nonblocking(self.resolver, &context_dir, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lode_pipeline::{ResolveError, ResolveResult};
    use std::sync::Mutex;

    /// Resolver that fails every request but records what was asked of it.
    struct RecordingResolver {
        calls: Mutex<Vec<(PathBuf, String)>>,
    }

    impl RecordingResolver {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn first_call(&self) -> (PathBuf, String) {
            self.calls.lock().unwrap().first().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ModuleResolver for RecordingResolver {
        fn resolve_sync(&self, context: &Path, request: &str) -> ResolveResult<PathBuf> {
            self.calls
                .lock()
                .unwrap()
                .push((context.to_path_buf(), request.to_string()));
            Err(ResolveError::NotFound {
                request: request.to_string(),
                context: context.to_path_buf(),
            })
        }

        async fn resolve(&self, context: &Path, request: &str) -> ResolveResult<PathBuf> {
            self.resolve_sync(context, request)
        }

        fn add_dependency(&self, _path: &Path) {}
    }

    fn importer<'a>(resolver: &'a RecordingResolver, resource: &'a Path) -> PipelineImporter<'a> {
        PipelineImporter::new(resolver, resource, ".scss", None)
    }

    #[test]
    fn test_root_document_context_uses_resource_dir() {
        let resolver = RecordingResolver::new();
        let adapter = importer(&resolver, Path::new("/proj/src/entry.scss"));

        Importer::import(&adapter, "foo", &SourceRef::RootDocument);

        let (context, request) = resolver.first_call();
        assert_eq!(context, PathBuf::from("/proj/src"));
        assert_eq!(request, "./foo.scss");
    }

    #[test]
    fn test_file_context_uses_its_own_dir() {
        let resolver = RecordingResolver::new();
        let adapter = importer(&resolver, Path::new("/proj/src/entry.scss"));

        Importer::import(
            &adapter,
            "base",
            &SourceRef::File(PathBuf::from("/proj/vendor/lib.scss")),
        );

        let (context, request) = resolver.first_call();
        assert_eq!(context, PathBuf::from("/proj/vendor"));
        assert_eq!(request, "./base.scss");
    }

    #[test]
    fn test_extension_inherited_from_context() {
        let resolver = RecordingResolver::new();
        let adapter = importer(&resolver, Path::new("/proj/entry.sass"));

        Importer::import(&adapter, "grid", &SourceRef::RootDocument);

        let (_, request) = resolver.first_call();
        assert_eq!(request, "./grid.sass");
    }

    #[test]
    fn test_default_extension_when_context_has_none() {
        let resolver = RecordingResolver::new();
        let adapter = PipelineImporter::new(&resolver, Path::new("/proj/entry"), ".sass", None);

        Importer::import(&adapter, "grid", &SourceRef::RootDocument);

        let (_, request) = resolver.first_call();
        assert_eq!(request, "./grid.sass");
    }

    #[test]
    fn test_recognized_extension_left_alone() {
        let resolver = RecordingResolver::new();
        let adapter = importer(&resolver, Path::new("/proj/entry.scss"));

        Importer::import(&adapter, "reset.css", &SourceRef::RootDocument);

        let (_, request) = resolver.first_call();
        assert_eq!(request, "./reset.css");
    }

    #[test]
    fn test_tilde_is_module_request() {
        let resolver = RecordingResolver::new();
        let adapter = importer(&resolver, Path::new("/proj/entry.scss"));

        Importer::import(&adapter, "~bulma/sass/base", &SourceRef::RootDocument);

        let (_, request) = resolver.first_call();
        assert_eq!(request, "bulma/sass/base.scss");
    }

    #[test]
    fn test_rooted_url_honors_configured_root() {
        let resolver = RecordingResolver::new();
        let adapter = PipelineImporter::new(
            &resolver,
            Path::new("/proj/entry.scss"),
            ".scss",
            Some(Path::new("/srv/assets")),
        );

        Importer::import(&adapter, "/theme/dark", &SourceRef::RootDocument);

        let (_, request) = resolver.first_call();
        assert_eq!(request, "/srv/assets/theme/dark.scss");
    }

    #[tokio::test]
    async fn test_async_import_same_plan() {
        let resolver = RecordingResolver::new();
        let adapter = importer(&resolver, Path::new("/proj/src/entry.scss"));

        AsyncImporter::import(&adapter, "foo", &SourceRef::RootDocument).await;

        let (context, request) = resolver.first_call();
        assert_eq!(context, PathBuf::from("/proj/src"));
        assert_eq!(request, "./foo.scss");
    }
}
