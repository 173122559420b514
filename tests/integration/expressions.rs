mod common;

use common::*;
use tern::config::{Config, VoidPolicy};
use tern::diagnostics::DiagnosticKind;
use tern::modules::Compilation;
use tern::typeck::builtins::BuiltinId;
use tern::typeck::expr::{ExprKind, Literal};
use tern::typeck::{ClassRef, Ty};

/// `Main` with `add(a: Int, b: Int) -> Int` next to `main`.
fn with_add(ret: &str, main_body: E) -> Compilation {
    Program::new()
        .module(
            "Main",
            ClassBuilder::static_class()
                .static_method("main", vec![], ret, main_body)
                .static_method(
                    "add",
                    vec![param("a", "Int"), param("b", "Int")],
                    "Int",
                    binop(name("a"), "+", name("b")),
                ),
        )
        .compile("Main")
}

fn no_widening() -> Config {
    let mut config = Config::default();
    config.checker.builtin_widening = false;
    config
}

fn require_void() -> Config {
    let mut config = Config::default();
    config.checker.void_policy = VoidPolicy::RequireVoid;
    config
}

// Literals

#[test]
fn literal_types() {
    let compilation = check_main("Real", real(1.5));
    assert!(!compilation.has_diagnostics());
    assert_eq!(body(&compilation, "Main", "main").kind, ExprKind::Literal(Literal::Float(1.5)));

    let compilation = check_main("Str", string("hi"));
    assert_eq!(body(&compilation, "Main", "main").ty, Ty::builtin(BuiltinId::Str));
}

#[test]
fn return_type_mismatch() {
    let compilation = check_main("Bool", int(1));
    assert_eq!(codes(&compilation), vec!["TypeMismatch"]);
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::TypeMismatch { expected: "Bool".into(), found: "Int".into() }
    );
    assert_eq!(body(&compilation, "Main", "main").ty, Ty::Bogus);
}

// When

#[test]
fn when_arms_agree() {
    let compilation = check_main(
        "Int",
        when(vec![(boolean(true), int(1)), (boolean(false), int(2))], int(3)),
    );
    assert!(!compilation.has_diagnostics());
    let body = body(&compilation, "Main", "main");
    assert_eq!(body.ty, Ty::builtin(BuiltinId::Int));
    match &body.kind {
        ExprKind::When { cases, .. } => assert_eq!(cases.len(), 2),
        other => panic!("expected when, got {other:?}"),
    }
}

#[test]
fn when_arms_disagree_once() {
    for ret in ["Int", "Str", "Bool"] {
        let compilation = check_main(
            ret,
            when(vec![(boolean(true), int(1)), (boolean(false), string("two"))], int(3)),
        );
        assert_eq!(codes(&compilation), vec!["CombineTypes"], "returning {ret}");
        assert_eq!(
            compilation.diagnostics()[0].kind,
            DiagnosticKind::CombineTypes { first: "Int".into(), second: "Str".into() }
        );
    }
}

#[test]
fn when_otherwise_must_agree() {
    let compilation = check_main("Int", when(vec![(boolean(true), int(1))], string("other")));
    assert_eq!(codes(&compilation), vec!["CombineTypes"]);
}

#[test]
fn when_test_must_be_bool() {
    let compilation = check_main("Int", when(vec![(int(0), int(1))], int(2)));
    assert_eq!(codes(&compilation), vec!["TypeMismatch"]);
}

#[test]
fn when_arm_error_does_not_cascade() {
    let compilation = check_main("Int", when(vec![(boolean(true), name("missing"))], string("s")));
    assert_eq!(codes(&compilation), vec!["UnresolvedName"]);

    let checked = body(&compilation, "Main", "main");
    assert!(checked.ty.is_bogus());
    assert_eq!(checked.invalid_count(), 1);
}

// Calls

#[test]
fn static_call_checks_arguments() {
    let compilation = with_add("Int", invoke(name("Main"), "add", vec![int(1), int(2)]));
    assert!(!compilation.has_diagnostics(), "{:?}", codes(&compilation));
    match &body(&compilation, "Main", "main").kind {
        ExprKind::StaticCall { method, args } => {
            assert_eq!(method.name, "add");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected static call, got {other:?}"),
    }
}

#[test]
fn too_few_arguments() {
    let compilation = with_add("Int", invoke(name("Main"), "add", vec![int(1)]));
    assert_eq!(codes(&compilation), vec!["Arity"]);
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::Arity { method: "add".into(), expected: 2, found: 1 }
    );
}

#[test]
fn too_many_arguments() {
    let compilation = with_add("Int", invoke(name("Main"), "add", vec![int(1), int(2), string("x")]));
    assert_eq!(codes(&compilation), vec!["Arity"]);
}

#[test]
fn argument_type_mismatch() {
    let compilation = with_add("Int", invoke(name("Main"), "add", vec![int(1), string("x")]));
    assert_eq!(codes(&compilation), vec!["TypeMismatch"]);
}

#[test]
fn argument_error_does_not_cascade() {
    let compilation = with_add("Int", invoke(name("Main"), "add", vec![name("nope"), int(1)]));
    assert_eq!(codes(&compilation), vec!["UnresolvedName"]);
}

#[test]
fn builtin_static_method() {
    let compilation = check_main("Int", invoke(name("Int"), "parse", vec![string("42")]));
    assert!(!compilation.has_diagnostics());
    match &body(&compilation, "Main", "main").kind {
        ExprKind::StaticCall { method, .. } => assert_eq!(method.owner, ClassRef::Builtin(BuiltinId::Int)),
        other => panic!("expected static call, got {other:?}"),
    }
}

#[test]
fn instance_method_called_statically() {
    let compilation = check_main("Int", invoke(name("Int"), "negate", vec![]));
    assert_eq!(codes(&compilation), vec!["WrongMethodKind"]);
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::WrongMethodKind { name: "negate".into(), is_static: false }
    );
}

#[test]
fn static_method_called_on_instance() {
    let compilation = check_main("Int", invoke(int(1), "parse", vec![string("3")]));
    assert_eq!(codes(&compilation), vec!["WrongMethodKind"]);
    assert_eq!(compilation.diagnostics()[0].kind.to_string(), "'parse' is a static method");
}

#[test]
fn unknown_method() {
    let compilation = check_main("Int", invoke(string("s"), "frobnicate", vec![]));
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::UnresolvedMember { class: "Str".into(), name: "frobnicate".into() }
    );
}

#[test]
fn void_has_no_members() {
    let compilation = check_main("Str", invoke(void(), "show", vec![]));
    assert_eq!(codes(&compilation), vec!["NotClassLike"]);
}

#[test]
fn calling_a_literal() {
    let compilation = check_main("Int", call(int(1), vec![]));
    assert_eq!(codes(&compilation), vec!["NotCallable"]);
}

#[test]
fn calling_a_parameter() {
    let compilation = Program::new()
        .module(
            "Main",
            ClassBuilder::static_class().static_method(
                "f",
                vec![param("g", "Int")],
                "Int",
                call(name("g"), vec![name("unknown")]),
            ),
        )
        .compile("Main");
    assert_eq!(codes(&compilation), vec!["UnresolvedName", "NotCallable"]);
}

#[test]
fn calling_a_slot() {
    let compilation = Program::new()
        .module(
            "Box",
            ClassBuilder::slots(&[("value", "Int")]).method(
                "f",
                vec![],
                "Int",
                invoke(self_ref(), "value", vec![]),
            ),
        )
        .compile("Box");
    assert_eq!(codes(&compilation), vec!["NotCallable"]);
}

#[test]
fn bare_method_call_is_unsupported() {
    let compilation = with_add("Int", call(name("add"), vec![int(1), name("nope")]));
    assert_eq!(codes(&compilation), vec!["UnresolvedName", "Unsupported"]);
    assert_eq!(
        compilation.diagnostics()[1].kind,
        DiagnosticKind::Unsupported { construct: "self call".into() }
    );
}

#[test]
fn calling_an_unknown_name() {
    let compilation = check_main("Int", call(name("ghost"), vec![]));
    assert_eq!(codes(&compilation), vec!["UnresolvedName"]);
}

// Operators

#[test]
fn operators_are_method_calls() {
    let compilation = check_main("Bool", binop(binop(int(1), "+", int(2)), "==", int(3)));
    assert!(!compilation.has_diagnostics());
    let body = body(&compilation, "Main", "main");
    assert_eq!(body.ty, Ty::builtin(BuiltinId::Bool));
    match &body.kind {
        ExprKind::InstanceCall { target, method, args } => {
            assert_eq!(method.name, "==");
            assert_eq!(method.owner, ClassRef::Builtin(BuiltinId::Int));
            assert_eq!(target.ty, Ty::builtin(BuiltinId::Int));
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected instance call, got {other:?}"),
    }
}

#[test]
fn unknown_operator() {
    let compilation = check_main("Str", binop(string("a"), "-", string("b")));
    assert_eq!(codes(&compilation), vec!["UnresolvedMember"]);
}

#[test]
fn operator_argument_mismatch() {
    let compilation = check_main("Int", binop(int(1), "+", boolean(true)));
    assert_eq!(codes(&compilation), vec!["TypeMismatch"]);
}

// Widening

#[test]
fn int_widens_to_real() {
    assert!(!check_main("Real", int(1)).has_diagnostics());
    assert_eq!(codes(&check_main_with(no_widening(), "Real", int(1))), vec!["TypeMismatch"]);
}

#[test]
fn nat_widens_to_int() {
    let length = invoke(string("abc"), "length", vec![]);
    assert!(!check_main("Int", length.clone()).has_diagnostics());
    assert_eq!(codes(&check_main("Bool", length)), vec!["TypeMismatch"]);
}

#[test]
fn real_does_not_narrow() {
    assert_eq!(codes(&check_main("Int", real(2.0))), vec!["TypeMismatch"]);
}

// Sequences and the void policy

#[test]
fn sequence_takes_second_type() {
    let compilation = check_main("Int", seq(string("ignored"), int(2)));
    assert!(!compilation.has_diagnostics());
    let body = body(&compilation, "Main", "main");
    assert_eq!(body.ty, Ty::builtin(BuiltinId::Int));
    assert!(matches!(body.kind, ExprKind::Sequence(..)));
}

#[test]
fn require_void_rejects_values_in_statement_position() {
    let statement = invoke(int(1), "show", vec![]);
    let compilation = check_main_with(require_void(), "Int", seq(statement, int(2)));
    assert_eq!(codes(&compilation), vec!["VoidExpected"]);
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::VoidExpected { found: "Str".into() }
    );
}

#[test]
fn require_void_accepts_void() {
    let compilation = check_main_with(require_void(), "Int", seq(void(), int(2)));
    assert!(!compilation.has_diagnostics());
}

#[test]
fn require_void_ignores_bogus() {
    let compilation = check_main_with(require_void(), "Int", seq(name("nope"), int(2)));
    assert_eq!(codes(&compilation), vec!["UnresolvedName"]);
}

// Names

#[test]
fn type_name_as_value() {
    let compilation = check_main("Int", name("Int"));
    assert_eq!(codes(&compilation), vec!["TypeUsedAsValue"]);
}

#[test]
fn method_reference_is_unsupported() {
    let compilation = check_main("Int", name("main"));
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::Unsupported { construct: "method reference".into() }
    );
}

#[test]
fn self_in_static_method() {
    let compilation = check_main("Int", self_ref());
    assert_eq!(codes(&compilation), vec!["StaticContext"]);
}

#[test]
fn slot_in_static_method() {
    let compilation = Program::new()
        .module(
            "Box",
            ClassBuilder::slots(&[("value", "Int")]).static_method("peek", vec![], "Int", name("value")),
        )
        .compile("Box");
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::StaticContext { name: "value".into() }
    );
}

#[test]
fn slot_through_target() {
    let compilation = Program::new()
        .module(
            "Pair",
            ClassBuilder::slots(&[("left", "Int"), ("right", "Str")])
                .method("other", vec![param("p", "Pair")], "Str", prop(name("p"), "right")),
        )
        .compile("Pair");
    assert!(!compilation.has_diagnostics());
    let body = body(&compilation, "Pair", "other");
    assert!(matches!(&body.kind, ExprKind::Slot { target: Some(_), slot } if slot.name == "right"));
    assert_eq!(body.ty, Ty::builtin(BuiltinId::Str));
}

#[test]
fn unknown_slot() {
    let compilation = Program::new()
        .module(
            "Pair",
            ClassBuilder::slots(&[("left", "Int")])
                .method("f", vec![], "Int", prop(self_ref(), "middle")),
        )
        .compile("Pair");
    assert_eq!(
        compilation.diagnostics()[0].kind,
        DiagnosticKind::UnresolvedMember { class: "Pair".into(), name: "middle".into() }
    );
}
