use std::fmt;

use crate::path::LogicalPath;
use super::builtins::{self, BuiltinId};

/// Nominal reference to a class-like entity. User classes are identified by
/// the logical path of the module that declares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ClassRef {
    User(LogicalPath),
    Builtin(BuiltinId),
}

impl ClassRef {
    pub fn name(&self) -> &str {
        match self {
            ClassRef::User(path) => path.last(),
            ClassRef::Builtin(id) => builtins::get(*id).name,
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::User(path) => write!(f, "{path}"),
            ClassRef::Builtin(id) => write!(f, "{}", builtins::get(*id).name),
        }
    }
}

/// A resolved type. `Bogus` stands in after an error has been reported and is
/// compatible with everything, so one mistake produces one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Ty {
    Class(ClassRef),
    Bogus,
}

impl Ty {
    pub fn builtin(id: BuiltinId) -> Ty {
        Ty::Class(ClassRef::Builtin(id))
    }

    pub fn user(path: LogicalPath) -> Ty {
        Ty::Class(ClassRef::User(path))
    }

    pub fn is_bogus(&self) -> bool {
        matches!(self, Ty::Bogus)
    }

    pub fn is_builtin(&self, id: BuiltinId) -> bool {
        matches!(self, Ty::Class(ClassRef::Builtin(b)) if *b == id)
    }

    pub fn class(&self) -> Option<&ClassRef> {
        match self {
            Ty::Class(c) => Some(c),
            Ty::Bogus => None,
        }
    }

    /// Inference equality: identical classes, or either side bogus.
    pub fn same(&self, other: &Ty) -> bool {
        match (self, other) {
            (Ty::Bogus, _) | (_, Ty::Bogus) => true,
            (Ty::Class(a), Ty::Class(b)) => a == b,
        }
    }

    /// Whether a value of type `actual` may flow where `self` is expected.
    /// Beyond `same`, only the numeric builtins widen: `Nat` into `Int` and
    /// `Real`, `Int` into `Real`.
    pub fn accepts(&self, actual: &Ty, widening: bool) -> bool {
        if self.same(actual) {
            return true;
        }
        if !widening {
            return false;
        }
        match (self, actual) {
            (Ty::Class(ClassRef::Builtin(to)), Ty::Class(ClassRef::Builtin(from))) => {
                builtins::widens(*from, *to)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Class(c) => write!(f, "{c}"),
            Ty::Bogus => write!(f, "<error>"),
        }
    }
}
