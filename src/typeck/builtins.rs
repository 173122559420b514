//! Compiler-provided classes. The catalog is a fixed table; the name index is
//! built on first use and shared for the life of the process.

use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum BuiltinId {
    Void,
    Bool,
    Nat,
    Int,
    Real,
    Str,
    Show,
    Hashable,
    Countable,
}

#[derive(Debug)]
pub struct BuiltinMethod {
    pub name: &'static str,
    pub is_static: bool,
    pub params: &'static [BuiltinId],
    pub ret: BuiltinId,
}

#[derive(Debug)]
pub struct BuiltinClass {
    pub id: BuiltinId,
    pub name: &'static str,
    /// Capability interfaces have only abstract methods.
    pub is_abstract: bool,
    pub methods: &'static [BuiltinMethod],
}

impl BuiltinClass {
    pub fn method(&self, name: &str) -> Option<&'static BuiltinMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

use BuiltinId::*;

const fn inst(name: &'static str, params: &'static [BuiltinId], ret: BuiltinId) -> BuiltinMethod {
    BuiltinMethod { name, is_static: false, params, ret }
}

const fn stat(name: &'static str, params: &'static [BuiltinId], ret: BuiltinId) -> BuiltinMethod {
    BuiltinMethod { name, is_static: true, params, ret }
}

static BOOL_METHODS: [BuiltinMethod; 6] = [
    inst("&&", &[Bool], Bool),
    inst("||", &[Bool], Bool),
    inst("==", &[Bool], Bool),
    inst("!=", &[Bool], Bool),
    inst("not", &[], Bool),
    inst("show", &[], Str),
];

static NAT_METHODS: [BuiltinMethod; 12] = [
    inst("+", &[Nat], Nat),
    inst("*", &[Nat], Nat),
    inst("-", &[Nat], Int),
    inst("==", &[Nat], Bool),
    inst("!=", &[Nat], Bool),
    inst("<", &[Nat], Bool),
    inst("<=", &[Nat], Bool),
    inst(">", &[Nat], Bool),
    inst(">=", &[Nat], Bool),
    inst("toInt", &[], Int),
    inst("show", &[], Str),
    inst("hash", &[], Int),
];

static INT_METHODS: [BuiltinMethod; 16] = [
    inst("+", &[Int], Int),
    inst("-", &[Int], Int),
    inst("*", &[Int], Int),
    inst("/", &[Int], Int),
    inst("%", &[Int], Int),
    inst("==", &[Int], Bool),
    inst("!=", &[Int], Bool),
    inst("<", &[Int], Bool),
    inst("<=", &[Int], Bool),
    inst(">", &[Int], Bool),
    inst(">=", &[Int], Bool),
    inst("negate", &[], Int),
    inst("toReal", &[], Real),
    inst("show", &[], Str),
    inst("hash", &[], Int),
    stat("parse", &[Str], Int),
];

static REAL_METHODS: [BuiltinMethod; 10] = [
    inst("+", &[Real], Real),
    inst("-", &[Real], Real),
    inst("*", &[Real], Real),
    inst("/", &[Real], Real),
    inst("==", &[Real], Bool),
    inst("<", &[Real], Bool),
    inst(">", &[Real], Bool),
    inst("floor", &[], Int),
    inst("show", &[], Str),
    stat("parse", &[Str], Real),
];

static STR_METHODS: [BuiltinMethod; 6] = [
    inst("+", &[Str], Str),
    inst("==", &[Str], Bool),
    inst("!=", &[Str], Bool),
    inst("length", &[], Nat),
    inst("show", &[], Str),
    inst("hash", &[], Int),
];

static SHOW_METHODS: [BuiltinMethod; 1] = [inst("show", &[], Str)];
static HASHABLE_METHODS: [BuiltinMethod; 1] = [inst("hash", &[], Int)];
static COUNTABLE_METHODS: [BuiltinMethod; 1] = [inst("length", &[], Nat)];

static CATALOG: [BuiltinClass; 9] = [
    BuiltinClass { id: Void, name: "Void", is_abstract: false, methods: &[] },
    BuiltinClass { id: Bool, name: "Bool", is_abstract: false, methods: &BOOL_METHODS },
    BuiltinClass { id: Nat, name: "Nat", is_abstract: false, methods: &NAT_METHODS },
    BuiltinClass { id: Int, name: "Int", is_abstract: false, methods: &INT_METHODS },
    BuiltinClass { id: Real, name: "Real", is_abstract: false, methods: &REAL_METHODS },
    BuiltinClass { id: Str, name: "Str", is_abstract: false, methods: &STR_METHODS },
    BuiltinClass { id: Show, name: "Show", is_abstract: true, methods: &SHOW_METHODS },
    BuiltinClass { id: Hashable, name: "Hashable", is_abstract: true, methods: &HASHABLE_METHODS },
    BuiltinClass { id: Countable, name: "Countable", is_abstract: true, methods: &COUNTABLE_METHODS },
];

static BY_NAME: OnceLock<HashMap<&'static str, &'static BuiltinClass>> = OnceLock::new();

fn by_name() -> &'static HashMap<&'static str, &'static BuiltinClass> {
    BY_NAME.get_or_init(|| CATALOG.iter().map(|c| (c.name, c)).collect())
}

/// Look a builtin up by its source name.
pub fn lookup(name: &str) -> Option<&'static BuiltinClass> {
    by_name().get(name).copied()
}

pub fn get(id: BuiltinId) -> &'static BuiltinClass {
    // CATALOG is declared in BuiltinId order.
    &CATALOG[id as usize]
}

pub fn all() -> &'static [BuiltinClass] {
    &CATALOG
}

/// Numeric widening between builtins (`from` usable where `to` is expected).
pub fn widens(from: BuiltinId, to: BuiltinId) -> bool {
    matches!((from, to), (Nat, Int) | (Nat, Real) | (Int, Real))
}
