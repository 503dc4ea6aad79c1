//! Runner behavior: error policies, pipelines, and logging.

use codegraft::edit::{
    AddCodeBlock, AddImport, AddRegistrationCall, DuplicatePolicy, Placement, SearchAnchor,
    SpecifierRequest,
};
use codegraft::errors::ErrorCategory;
use codegraft::logger::{Level, Logger};
use codegraft::runner::{
    run_transformation, ErrorPolicy, FileInfo, Pipeline, RunOptions, Transform,
};

fn file<'a>(source: &'a str) -> FileInfo<'a> {
    FileInfo {
        path: "main.js",
        source,
    }
}

fn options(policy: ErrorPolicy) -> RunOptions {
    RunOptions {
        error_policy: policy,
        ..RunOptions::default()
    }
}

fn add_import(source: &str, local: &str) -> AddImport {
    AddImport {
        source: source.into(),
        specifiers: vec![SpecifierRequest::default(local)],
        comment: None,
    }
}

#[test]
fn malformed_source_returns_original_text_under_continue() {
    let src = "import { unclosed from 'mod';";
    let out = run_transformation(
        &file(src),
        &add_import("vue", "Vue"),
        &options(ErrorPolicy::Continue),
    )
    .unwrap();
    assert_eq!(out, src);
}

#[test]
fn malformed_source_surfaces_under_propagate() {
    let err = run_transformation(
        &file("import { unclosed from 'mod';"),
        &add_import("vue", "Vue"),
        &options(ErrorPolicy::Propagate),
    )
    .unwrap_err();
    assert_eq!(err.kind.category(), ErrorCategory::Parse);
}

#[test]
fn recoverable_failure_keeps_source_unchanged_under_continue() {
    let edit = AddCodeBlock {
        title: "Setup".into(),
        code: "x();".into(),
        search: Some(SearchAnchor::Code("nowhere();".into())),
        location: Placement::After,
        ignore: DuplicatePolicy::Strict,
        newline: None,
    };
    let out = run_transformation(&file("a();\n"), &edit, &options(ErrorPolicy::Continue)).unwrap();
    assert_eq!(out, "a();\n");
}

#[test]
fn recoverable_failure_surfaces_under_propagate() {
    let edit = AddCodeBlock {
        title: "Setup".into(),
        code: "x();".into(),
        search: Some(SearchAnchor::Code("nowhere();".into())),
        location: Placement::After,
        ignore: DuplicatePolicy::Strict,
        newline: None,
    };
    let err = run_transformation(&file("a();\n"), &edit, &options(ErrorPolicy::Propagate))
        .unwrap_err();
    assert_eq!(err.kind.category(), ErrorCategory::Anchor);
    assert!(err
        .to_string()
        .contains("Search pattern not found"));
}

#[test]
fn pipeline_applies_transforms_in_sequence() {
    let import_vue = add_import("vue", "Vue");
    let import_router = add_import("vue-router", "Router");
    let register = AddRegistrationCall {
        receiver: "Vue".into(),
        method: "use".into(),
        argument: "Router".into(),
        extra_args: Vec::new(),
        comment: None,
    };
    let pipeline = Pipeline {
        transforms: vec![&import_vue, &import_router, &register],
    };

    let out = run_transformation(&file(""), &pipeline, &options(ErrorPolicy::Propagate)).unwrap();
    assert_eq!(
        out,
        "import Vue from 'vue';\nimport Router from 'vue-router';\n\nVue.use(Router);\n"
    );
}

#[test]
fn pipeline_transforms_log_their_titles_as_siblings() {
    let (logger, sink) = Logger::buffered(true);
    let options = RunOptions {
        error_policy: ErrorPolicy::Continue,
        logger,
        ..RunOptions::default()
    };

    let import_vue = add_import("vue", "Vue");
    let import_router = add_import("vue-router", "Router");
    let pipeline = Pipeline {
        transforms: vec![&import_vue, &import_router],
    };
    run_transformation(&file(""), &pipeline, &options).unwrap();

    let lines = sink.lock().unwrap().lines.clone();
    let titles: Vec<&String> = lines
        .iter()
        .filter(|(_, text)| text.contains("Add import from"))
        .map(|(_, text)| text)
        .collect();
    assert_eq!(titles.len(), 2);
    // Both one level under the run header, neither nested under the other.
    assert!(titles[0].starts_with("  Add"));
    assert!(titles[1].starts_with("  Add"));
}

#[test]
fn idempotence_warnings_do_not_propagate() {
    let edit = add_import("vue", "Vue");
    let first = run_transformation(&file(""), &edit, &options(ErrorPolicy::Propagate)).unwrap();
    // Rerunning hits the duplicate warning path; strict policy must not fail.
    let second =
        run_transformation(&file(&first), &edit, &options(ErrorPolicy::Propagate)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn operations_log_nested_under_their_title() {
    let (logger, sink) = Logger::buffered(true);
    let options = RunOptions {
        error_policy: ErrorPolicy::Continue,
        logger,
        ..RunOptions::default()
    };

    let edit = add_import("vue", "Vue");
    let src = "import Vue from 'vue';";
    run_transformation(&file(src), &edit, &options).unwrap();

    let lines = sink.lock().unwrap().lines.clone();
    let title = lines
        .iter()
        .find(|(_, text)| text.contains("Add import from 'vue'."))
        .expect("title logged");
    assert_eq!(title.0, Level::Info);

    let warning = lines
        .iter()
        .find(|(level, _)| *level == Level::Warning)
        .expect("duplicate warning logged");
    assert!(warning.1.contains("[default as Vue] already exists"));
    // Nested one level under the run, one under the title.
    assert!(warning.1.starts_with("    "));
}
