//! End-to-end code block insertion: anchors, policies, convergence.

use codegraft::edit::{
    AddCodeBlock, DuplicatePolicy, NewlinePolicy, Placement, SearchAnchor,
};
use codegraft::runner::{run_transformation, FileInfo, RunOptions, Transform};

fn run(source: &str, transform: &dyn Transform) -> String {
    let file = FileInfo {
        path: "main.js",
        source,
    };
    run_transformation(&file, transform, &RunOptions::default()).unwrap()
}

fn block(title: &str, code: &str) -> AddCodeBlock {
    AddCodeBlock {
        title: title.into(),
        code: code.into(),
        search: None,
        location: Placement::After,
        ignore: DuplicatePolicy::Strict,
        newline: None,
    }
}

#[test]
fn block_is_titled_and_appended() {
    let out = run("setup();", &block("Router wiring", "installRouter();"));
    assert_eq!(out, "setup();\n// Router wiring\ninstallRouter();\n");
}

#[test]
fn insertion_converges_under_reruns() {
    let edit = block("Setup", "const store = createStore();\ninstall(store);");
    let first = run("boot();", &edit);
    let second = run(&first, &edit);
    let third = run(&second, &edit);
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn anchor_places_block_before_the_match() {
    let mut edit = block("Init", "init();");
    edit.search = Some(SearchAnchor::Code("render();".into()));
    edit.location = Placement::Before;
    let out = run("setup();\nrender();", &edit);
    assert_eq!(out, "setup();\n// Init\ninit();\nrender();\n");
}

#[test]
fn anchor_places_block_after_the_whole_match() {
    let mut edit = block("Init", "init();");
    edit.search = Some(SearchAnchor::Code("a();\nb();".into()));
    let out = run("a();\nb();\nlast();", &edit);
    assert_eq!(out, "a();\nb();\n// Init\ninit();\nlast();\n");
}

#[test]
fn comment_differences_do_not_defeat_duplicate_detection() {
    let edit = block("Setup", "install();");
    let src = "// some other heading\ninstall();\n";
    assert_eq!(run(src, &edit), src);
}

#[test]
fn type_annotations_are_ignored_for_anchors_but_not_membership() {
    let mut edit = block("Init", "init();");
    edit.search = Some(SearchAnchor::Code("const a = 1;".into()));
    let out = run("const a: number = 1;\ndone();", &edit);
    assert_eq!(out, "const a: number = 1;\n// Init\ninit();\ndone();\n");

    // The same annotated statement is not "already present" without it.
    let edit = block("Decl", "const a = 1;");
    let out = run("const a: number = 1;", &edit);
    assert!(out.contains("// Decl\nconst a = 1;"));
}

#[test]
fn selective_policy_completes_a_partial_block() {
    let mut edit = block("Setup", "a();\nb();");
    edit.ignore = DuplicatePolicy::Selective;
    let out = run("a();", &edit);
    assert_eq!(out, "a();\n// Setup\nb();\n");
}

#[test]
fn never_policy_inserts_even_when_present() {
    let mut edit = block("Setup", "a();");
    edit.ignore = DuplicatePolicy::Never;
    let out = run("a();", &edit);
    assert_eq!(out, "a();\n// Setup\na();\n");
}

#[test]
fn newline_sentinels_surround_the_block() {
    let mut edit = block("Setup", "b();");
    edit.newline = Some(NewlinePolicy::Both);
    let out = run("a();", &edit);
    assert_eq!(out, "a();\n\n// Setup\nb();\n\n");
}

#[test]
fn sentinel_output_is_stable_on_rerun() {
    let mut edit = block("Setup", "b();");
    edit.newline = Some(NewlinePolicy::Both);
    let first = run("a();", &edit);
    let second = run(&first, &edit);
    assert_eq!(first, second);
}

#[test]
fn unmatched_anchor_returns_source_unchanged() {
    let mut edit = block("Setup", "b();");
    edit.search = Some(SearchAnchor::Code("nowhere();".into()));
    let src = "a();\n";
    assert_eq!(run(src, &edit), src);
}

#[test]
fn node_anchor_matches_like_code_anchor() {
    use codegraft::errors::SourceContext;
    use codegraft::syntax::parser::parse;

    let pattern = parse("b();", &SourceContext::from_file("pattern", "b();"))
        .unwrap()
        .body;
    let mut edit = block("Init", "init();");
    edit.search = Some(SearchAnchor::Nodes(pattern));
    let out = run("a();\nb();\nc();", &edit);
    assert_eq!(out, "a();\nb();\n// Init\ninit();\nc();\n");
}
