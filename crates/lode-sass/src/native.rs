//! SASS compilation using the grass crate (native only).
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! grass is a pure Rust engine targeting dart-sass. It exposes a filesystem
//! hook (`grass::Fs`) rather than a URL-level import hook, so this backend
//! does not drive the [`Importer`](crate::Importer) contract per reference;
//! imports resolve through the engine's own lookup against the request's
//! include paths, with every file it reads registered as a build dependency
//! on the host resolver.

use std::fmt::Debug;
use std::io;
use std::path::Path;

use async_trait::async_trait;

use lode_pipeline::ModuleResolver;

use crate::compiler::{CompileOutput, CompileRequest, Compiler, OutputStyle, Syntax};
use crate::error::CompileError;

/// Adapter implementing `grass::Fs` with dependency tracking.
///
/// File access stays on the local filesystem; the resolver only hears about
/// files the engine actually read, which is exactly the set a rebuild
/// depends on.
struct TrackingFs<'a> {
    resolver: &'a dyn ModuleResolver,
}

impl Debug for TrackingFs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingFs")
            .field("resolver", &"<ModuleResolver>")
            .finish()
    }
}

impl grass::Fs for TrackingFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let contents = std::fs::read(path)?;
        self.resolver.add_dependency(path);
        Ok(contents)
    }
}

/// [`Compiler`] backed by grass.
pub struct GrassCompiler<'a> {
    resolver: &'a dyn ModuleResolver,
}

impl<'a> GrassCompiler<'a> {
    pub fn new(resolver: &'a dyn ModuleResolver) -> Self {
        Self { resolver }
    }

    fn compile(&self, request: CompileRequest<'_>) -> Result<CompileOutput, CompileError> {
        let fs = TrackingFs {
            resolver: self.resolver,
        };
        let style = match request.style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        };
        let syntax = match request.syntax {
            Syntax::Scss => grass::InputSyntax::Scss,
            Syntax::Indented => grass::InputSyntax::Sass,
        };

        let options = grass::Options::default()
            .fs(&fs)
            .load_paths(request.include_paths)
            .style(style)
            .input_syntax(syntax);

        match grass::from_string(request.source, &options) {
            Ok(css) => Ok(CompileOutput {
                css,
                // grass does not emit source maps.
                map: None,
            }),
            Err(error) => Err(CompileError::in_root_document(error.to_string())),
        }
    }
}

#[async_trait]
impl Compiler for GrassCompiler<'_> {
    fn render_sync(&self, request: CompileRequest<'_>) -> Result<CompileOutput, CompileError> {
        self.compile(request)
    }

    async fn render(&self, request: CompileRequest<'_>) -> Result<CompileOutput, CompileError> {
        // The engine itself is synchronous; the non-blocking entry exists
        // for pipeline symmetry.
        self.compile(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ImporterRef;
    use crate::compiler::{ImportOutcome, Importer, SourceRef};
    use lode_pipeline::NativeResolver;
    use serde_json::Map;
    use std::path::PathBuf;

    /// Importer stand-in for requests that never import anything.
    struct NoImports;

    impl Importer for NoImports {
        fn import(&self, _url: &str, _context: &SourceRef) -> ImportOutcome {
            ImportOutcome::File(PathBuf::new())
        }
    }

    fn compile(resolver: &NativeResolver, source: &str, include: &[PathBuf]) -> String {
        let compiler = GrassCompiler::new(resolver);
        let passthrough = Map::new();
        let importer = NoImports;
        let output = compiler
            .render_sync(CompileRequest {
                source,
                syntax: Syntax::Scss,
                style: OutputStyle::Expanded,
                source_map: None,
                include_paths: include,
                importer: ImporterRef::Blocking(&importer),
                passthrough: &passthrough,
            })
            .unwrap();
        output.css
    }

    #[test]
    fn test_compile_simple_scss() {
        let resolver = NativeResolver::new();
        let css = compile(&resolver, "$primary: #007bff; .btn { color: $primary; }", &[]);

        assert!(css.contains(".btn"));
        assert!(css.contains("#007bff"));
    }

    #[test]
    fn test_compile_compressed() {
        let resolver = NativeResolver::new();
        let compiler = GrassCompiler::new(&resolver);
        let passthrough = Map::new();
        let importer = NoImports;

        let output = compiler
            .render_sync(CompileRequest {
                source: ".a {\n  color: red;\n}\n",
                syntax: Syntax::Scss,
                style: OutputStyle::Compressed,
                source_map: None,
                include_paths: &[],
                importer: ImporterRef::Blocking(&importer),
                passthrough: &passthrough,
            })
            .unwrap();

        assert!(output.css.contains(".a{color:red}"));
    }

    #[test]
    fn test_compile_indented_syntax() {
        let resolver = NativeResolver::new();
        let compiler = GrassCompiler::new(&resolver);
        let passthrough = Map::new();
        let importer = NoImports;

        let output = compiler
            .render_sync(CompileRequest {
                source: ".a\n  color: red\n",
                syntax: Syntax::Indented,
                style: OutputStyle::Expanded,
                source_map: None,
                include_paths: &[],
                importer: ImporterRef::Blocking(&importer),
                passthrough: &passthrough,
            })
            .unwrap();

        assert!(output.css.contains(".a"));
        assert!(output.css.contains("color: red"));
    }

    #[test]
    fn test_partial_import_registers_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("_base.scss");
        std::fs::write(&partial, "$size: 2rem;\n.base { margin: $size; }\n").unwrap();

        let resolver = NativeResolver::new();
        let css = compile(
            &resolver,
            "@import \"base\";\n.extra { padding: $size; }\n",
            &[dir.path().to_path_buf()],
        );

        assert!(css.contains(".base"));
        assert!(css.contains(".extra"));
        assert!(css.contains("2rem"));

        let deps = resolver.drain_dependencies();
        assert_eq!(deps, vec![partial]);
    }

    #[test]
    fn test_compile_error_attributed_to_root_document() {
        let resolver = NativeResolver::new();
        let compiler = GrassCompiler::new(&resolver);
        let passthrough = Map::new();
        let importer = NoImports;

        let error = compiler
            .render_sync(CompileRequest {
                source: ".btn { color: $undefined-variable; }",
                syntax: Syntax::Scss,
                style: OutputStyle::Expanded,
                source_map: None,
                include_paths: &[],
                importer: ImporterRef::Blocking(&importer),
                passthrough: &passthrough,
            })
            .unwrap_err();

        assert_eq!(error.file, SourceRef::RootDocument);
        assert!(!error.message.is_empty());
        assert!(!error.hide_stack);
    }
}
