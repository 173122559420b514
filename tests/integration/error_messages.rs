mod common;

use common::*;
use insta::assert_snapshot;
use tern::config::Config;
use tern::document::{Document, MemorySource};
use tern::syntax::ast::Expr;

/// `Main.main` returning Int whose body is the name `nope` at bytes 21..25.
fn unresolved_program() -> MemorySource {
    let text = "static main(): Int = nope";
    let module = ClassBuilder::static_class()
        .static_method("main", vec![], "Int", at(Expr::Name("nope".into()), 21, 25))
        .build();
    let mut source = MemorySource::new();
    source.insert("Main.tern", Document::parsed(text, module));
    source
}

#[test]
fn display_names_module_and_offset() {
    let compilation = tern::compile(&lp("Main"), &unresolved_program(), &Config::default());
    assert_snapshot!(compilation.diagnostics()[0].to_string(), @"Main:21: unresolved name 'nope'");
}

#[test]
fn render_uses_module_text() {
    let compilation = tern::compile(&lp("Main"), &unresolved_program(), &Config::default());
    let rendered = compilation.render_all();
    assert!(rendered.contains("type error"), "{rendered}");
    assert!(rendered.contains("unresolved name 'nope'"), "{rendered}");
    assert!(rendered.contains("static main(): Int = nope"), "{rendered}");
}

#[test]
fn render_missing_root() {
    let compilation = Program::new().compile("app.Entry");
    let rendered = compilation.render_all();
    assert!(rendered.contains("resolution error"), "{rendered}");
    assert!(
        rendered.contains("cannot find module 'app.Entry' (tried 'app/Entry.tern', 'app/Entry/main.tern')"),
        "{rendered}"
    );
}

#[test]
fn render_span_beyond_text_keeps_message() {
    let compilation = check_main("Int", at(Expr::Name("nope".into()), 30, 34));
    let rendered = compilation.render_all();
    assert!(rendered.contains("type error"), "{rendered}");
    assert!(rendered.contains("unresolved name 'nope'"), "{rendered}");
}

#[test]
fn render_is_empty_without_diagnostics() {
    let compilation = check_main("Int", int(1));
    assert_eq!(compilation.render_all(), "");
}

#[test]
fn combine_types_message() {
    let compilation = check_main("Int", when(vec![(boolean(true), int(1))], string("s")));
    assert_snapshot!(
        compilation.diagnostics()[0].kind.to_string(),
        @"cannot combine types 'Int' and 'Str'"
    );
}

#[test]
fn shadowing_message() {
    let compilation = check_main("Int", let_in("x", int(1), let_in("x", int(2), name("x"))));
    assert_snapshot!(compilation.diagnostics()[0].kind.to_string(), @"'x' shadows an existing local");
}

#[test]
fn arity_message() {
    let compilation = check_main("Int", invoke(name("Int"), "parse", vec![]));
    assert_snapshot!(
        compilation.diagnostics()[0].kind.to_string(),
        @"'parse' expects 1 argument(s), found 0"
    );
}

#[test]
fn json_export() {
    let compilation = tern::compile(&lp("Main"), &unresolved_program(), &Config::default());
    let json = compilation.diagnostics_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "UnresolvedName");
    assert_eq!(items[0]["name"], "nope");
    assert_eq!(items[0]["location"]["module"], serde_json::json!(["Main"]));
    assert_eq!(items[0]["location"]["span"], serde_json::json!({"start": 21, "end": 25}));
}

#[test]
fn json_export_of_cycle() {
    let compilation = Program::new()
        .module("A", ClassBuilder::static_class().import("B"))
        .module("B", ClassBuilder::static_class().import("A"))
        .compile("A");
    let value: serde_json::Value = serde_json::from_str(&compilation.diagnostics_json().unwrap()).unwrap();

    assert_eq!(value[0]["kind"], "CircularDependency");
    assert_eq!(value[0]["chain"], serde_json::json!([["A"], ["B"], ["A"]]));
}
