//! End-to-end transform tests against the grass backend.

#![cfg(not(target_arch = "wasm32"))]

use std::path::PathBuf;

use lode_pipeline::NativeResolver;
use lode_sass::{
    GrassCompiler, PipelineContext, RenderRequest, SourceRef, TransformOptions, render_sync,
};

fn fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("partials")).unwrap();
    std::fs::write(
        dir.path().join("partials/_base.scss"),
        "$brand: #336699;\n.base { color: $brand; }\n",
    )
    .unwrap();
    let resource = dir.path().join("entry.scss");
    (dir, resource)
}

#[test]
fn test_compile_with_partial_import() {
    let (dir, resource) = fixture();

    let resolver = NativeResolver::new();
    let pipeline = PipelineContext::new(&resolver, dir.path().join("build"));
    let compiler = GrassCompiler::new(&resolver);
    let request = RenderRequest {
        source: "@import \"partials/base\";\n.app { border-color: $brand; }\n",
        resource_path: &resource,
        options: TransformOptions::default(),
    };

    let output = render_sync(&compiler, &request, &pipeline).unwrap();

    assert!(output.css.contains(".base"));
    assert!(output.css.contains(".app"));
    assert!(output.css.contains("#336699"));
    // grass emits no map; the driver must not fabricate one.
    assert!(output.map.is_none());

    let deps = resolver.drain_dependencies();
    assert_eq!(deps, vec![dir.path().join("partials/_base.scss")]);
}

#[test]
fn test_minimize_flag_compresses_output() {
    let (dir, resource) = fixture();

    let resolver = NativeResolver::new();
    let pipeline = PipelineContext::new(&resolver, dir.path().join("build")).minimized(true);
    let compiler = GrassCompiler::new(&resolver);
    let request = RenderRequest {
        source: "@import \"partials/base\";\n",
        resource_path: &resource,
        options: TransformOptions::default(),
    };

    let output = render_sync(&compiler, &request, &pipeline).unwrap();

    assert!(output.css.contains(".base{color:#336699}"));
}

#[test]
fn test_compile_failure_formats_for_terminal() {
    let (dir, resource) = fixture();
    // The resource exists on disk here, so the excerpt path is exercised.
    std::fs::write(&resource, ".app { color: $undefined; }\n").unwrap();

    let resolver = NativeResolver::new();
    let pipeline = PipelineContext::new(&resolver, dir.path().join("build"));
    let compiler = GrassCompiler::new(&resolver);
    let request = RenderRequest {
        source: ".app { color: $undefined; }\n",
        resource_path: &resource,
        options: TransformOptions::default(),
    };

    let error = render_sync(&compiler, &request, &pipeline).unwrap_err();

    assert!(error.hide_stack);
    assert_eq!(error.file, SourceRef::File(resource.clone()));
    assert!(
        error
            .message
            .contains(&format!("in {}", resource.display()))
    );
}

#[test]
fn test_empty_source_passes_through() {
    let (dir, resource) = fixture();

    let resolver = NativeResolver::new();
    let pipeline = PipelineContext::new(&resolver, dir.path().join("build"));
    let compiler = GrassCompiler::new(&resolver);
    let request = RenderRequest {
        source: "",
        resource_path: &resource,
        options: TransformOptions::default(),
    };

    let output = render_sync(&compiler, &request, &pipeline).unwrap();

    assert_eq!(output.css, "");
    assert!(resolver.drain_dependencies().is_empty());
}
