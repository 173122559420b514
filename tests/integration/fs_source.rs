mod common;

use std::path::Path;

use common::*;
use tern::config::Config;
use tern::document::{FsSource, ParseError};
use tern::modules::FailReason;
use tern::span::Span;
use tern::syntax::ast::SyntaxModule;

/// Stand-in parser: documents on disk hold the syntax tree as JSON.
fn json_source(root: &Path) -> FsSource {
    FsSource::new(root, |text| {
        serde_json::from_str::<SyntaxModule>(text)
            .map_err(|e| ParseError::new(e.to_string(), Span::new(0, text.len())))
    })
}

fn write_module(root: &Path, relative: &str, module: ClassBuilder) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, serde_json::to_string_pretty(&module.build()).unwrap()).unwrap();
}

#[test]
fn compiles_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_module(
        dir.path(),
        "App.tern",
        ClassBuilder::static_class()
            .import("lib.Numbers")
            .static_method("main", vec![], "Int", invoke(name("Numbers"), "two", vec![])),
    );
    write_module(
        dir.path(),
        "lib/Numbers/main.tern",
        ClassBuilder::static_class().static_method("two", vec![], "Int", int(2)),
    );

    let source = json_source(dir.path());
    let compilation = tern::compile(&lp("App"), &source, &Config::default());

    assert!(!compilation.has_diagnostics(), "{}", compilation.render_all());
    let numbers = compilation.get(&lp("lib.Numbers")).unwrap().as_module().unwrap();
    assert_eq!(numbers.document_path, Path::new("lib/Numbers/main.tern"));
}

#[test]
fn unreadable_syntax_is_a_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Broken.tern"), "{ not a syntax tree").unwrap();

    let compilation = tern::compile(&lp("Broken"), &json_source(dir.path()), &Config::default());

    let fail = compilation.root().as_fail().unwrap();
    assert_eq!(fail.reason, FailReason::ParseFailed);
    assert_eq!(codes(&compilation), vec!["Parse"]);
    assert!(compilation.render_all().contains("syntax error"));
}

#[test]
fn missing_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "App.tern", ClassBuilder::static_class().import("Gone"));

    let compilation = tern::compile(&lp("App"), &json_source(dir.path()), &Config::default());
    assert_eq!(codes(&compilation), vec!["CantFindLocalModule"]);
}

#[test]
fn configured_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("tern.toml");
    std::fs::write(&config_path, "[resolver]\nextension = \"tn\"\nmain_file = \"index\"\n").unwrap();
    let config = Config::load(&config_path).unwrap();

    write_module(dir.path(), "App.tn", ClassBuilder::static_class().import("pkg.Util"));
    write_module(dir.path(), "pkg/Util/index.tn", ClassBuilder::static_class());

    let compilation = tern::compile(&lp("App"), &json_source(dir.path()), &config);
    assert!(!compilation.has_diagnostics(), "{}", compilation.render_all());
}
