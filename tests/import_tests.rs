//! End-to-end import management: parse, edit, print.

use codegraft::edit::{AddImport, RemoveImport, SpecifierRequest};
use codegraft::logger::{Level, Logger};
use codegraft::runner::{run_transformation, FileInfo, RunOptions, Transform};

fn run(source: &str, transform: &dyn Transform) -> String {
    let file = FileInfo {
        path: "main.js",
        source,
    };
    run_transformation(&file, transform, &RunOptions::default()).unwrap()
}

fn add(source: &str, specifiers: Vec<SpecifierRequest>) -> AddImport {
    AddImport {
        source: source.into(),
        specifiers,
        comment: None,
    }
}

#[test]
fn creates_declaration_in_empty_module() {
    let out = run("", &add("vue", vec![SpecifierRequest::default("Vue")]));
    assert_eq!(out, "import Vue from 'vue';\n\n");
}

#[test]
fn merges_named_specifier_into_existing_declaration() {
    let out = run(
        "import { a } from 'mod';\nb();",
        &add("mod", vec![SpecifierRequest::named("c", "c")]),
    );
    assert_eq!(out, "import { a, c } from 'mod';\n\nb();\n");
}

#[test]
fn default_merges_alongside_named_specifiers() {
    let out = run(
        "import { a } from 'mod';",
        &add("mod", vec![SpecifierRequest::default("M")]),
    );
    assert_eq!(out, "import M, { a } from 'mod';\n\n");
}

#[test]
fn namespace_gets_its_own_declaration_next_to_named() {
    let out = run(
        "import { a } from 'mod';",
        &add("mod", vec![SpecifierRequest::namespace("ns")]),
    );
    assert_eq!(
        out,
        "import { a } from 'mod';\nimport * as ns from 'mod';\n\n"
    );
}

#[test]
fn namespace_may_join_a_lone_default() {
    let out = run(
        "import M from 'mod';",
        &add("mod", vec![SpecifierRequest::namespace("ns")]),
    );
    assert_eq!(out, "import M, * as ns from 'mod';\n\n");
}

#[test]
fn duplicate_pair_makes_rerun_a_no_op() {
    let edit = add("vue", vec![SpecifierRequest::default("Vue")]);
    let first = run("", &edit);
    let second = run(&first, &edit);
    assert_eq!(first, second);
}

#[test]
fn colliding_local_name_is_skipped_with_a_warning() {
    let (logger, sink) = Logger::buffered(true);
    let options = RunOptions {
        logger,
        ..RunOptions::default()
    };
    let file = FileInfo {
        path: "main.js",
        source: "import Router from 'vue-router';",
    };
    let edit = add("other-router", vec![SpecifierRequest::default("Router")]);

    let out = run_transformation(&file, &edit, &options).unwrap();
    assert_eq!(out, "import Router from 'vue-router';\n\n");

    let lines = sink.lock().unwrap().lines.clone();
    let warning = lines
        .iter()
        .find(|(level, _)| *level == Level::Warning)
        .expect("collision warning logged");
    assert!(warning.1.contains("Import local 'Router' is not unique"));
}

#[test]
fn package_import_lands_before_relative_imports() {
    let out = run(
        "import App from './App';",
        &add("vue", vec![SpecifierRequest::default("Vue")]),
    );
    assert_eq!(out, "import Vue from 'vue';\nimport App from './App';\n\n");
}

#[test]
fn relative_import_lands_after_all_imports() {
    let out = run(
        "import Vue from 'vue';\nx();",
        &add("./App", vec![SpecifierRequest::default("App")]),
    );
    assert_eq!(out, "import Vue from 'vue';\nimport App from './App';\n\nx();\n");
}

#[test]
fn side_effect_import_is_added_once() {
    let edit = add("./polyfill", Vec::new());
    let first = run("import Vue from 'vue';", &edit);
    assert_eq!(first, "import Vue from 'vue';\nimport './polyfill';\n\n");
    assert_eq!(run(&first, &edit), first);
}

#[test]
fn blank_line_after_imports_is_not_duplicated() {
    let src = "import Vue from 'vue';\n\nx();\n";
    let out = run(src, &add("vuex", vec![SpecifierRequest::default("Vuex")]));
    assert_eq!(out, "import Vue from 'vue';\nimport Vuex from 'vuex';\n\nx();\n");
}

#[test]
fn comment_is_attached_to_new_declaration() {
    let edit = AddImport {
        source: "vue".into(),
        specifiers: vec![SpecifierRequest::default("Vue")],
        comment: Some("Framework import.".into()),
    };
    assert_eq!(run("", &edit), "// Framework import.\nimport Vue from 'vue';\n\n");
}

#[test]
fn removing_last_specifier_prunes_the_declaration() {
    let edit = RemoveImport {
        source: "mod".into(),
        specifiers: vec![
            SpecifierRequest::named("a", "a"),
            SpecifierRequest::named("b", "b"),
        ],
        keep_source_for_side_effects: false,
    };
    assert_eq!(run("import { a, b } from 'mod';\nx();", &edit), "x();\n");
}

#[test]
fn removal_can_keep_the_source_for_side_effects() {
    let edit = RemoveImport {
        source: "mod".into(),
        specifiers: vec![SpecifierRequest::named("a", "a")],
        keep_source_for_side_effects: true,
    };
    assert_eq!(run("import { a } from 'mod';", &edit), "import 'mod';\n");
}

#[test]
fn removal_without_specifiers_drops_every_declaration() {
    let edit = RemoveImport {
        source: "mod".into(),
        specifiers: Vec::new(),
        keep_source_for_side_effects: false,
    };
    assert_eq!(
        run("import { a } from 'mod';\nimport 'mod';\nx();", &edit),
        "x();\n"
    );
}

#[test]
fn removal_of_a_missing_specifier_changes_nothing() {
    let edit = RemoveImport {
        source: "mod".into(),
        specifiers: vec![SpecifierRequest::named("zzz", "zzz")],
        keep_source_for_side_effects: false,
    };
    assert_eq!(run("import { a } from 'mod';", &edit), "import { a } from 'mod';\n");
}
