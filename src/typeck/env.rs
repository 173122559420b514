use indexmap::IndexMap;

use crate::path::LogicalPath;
use crate::span::Span;
use super::expr::Expr;
use super::types::{ClassRef, Ty};

/// Non-owning address of a member: the class that declares it plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct MemberRef {
    pub owner: ClassRef,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub ty: Ty,
    pub mutable: bool,
    pub owner: ClassRef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub is_static: bool,
    pub is_abstract: bool,
    pub params: Vec<Param>,
    pub return_type: Ty,
    /// Filled in once, after every member signature of the class exists.
    /// Abstract methods never get one.
    pub body: Option<Expr>,
    pub owner: ClassRef,
    pub span: Span,
}

impl Method {
    pub fn param_types(&self) -> Vec<Ty> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Slot(Slot),
    Method(Method),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Slot(s) => &s.name,
            Member::Method(m) => &m.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Member::Slot(s) => s.span,
            Member::Method(m) => m.span,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(m) => Some(m),
            Member::Slot(_) => None,
        }
    }

    pub fn as_slot(&self) -> Option<&Slot> {
        match self {
            Member::Slot(s) => Some(s),
            Member::Method(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KlassHead {
    /// No instance state.
    Static,
    /// Names of the unimplemented method signatures.
    Abstract(Vec<String>),
    /// Slot names in declaration order.
    Slots(Vec<String>),
}

/// A checked class: its head plus a member table keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Klass {
    pub name: String,
    pub path: LogicalPath,
    pub head: KlassHead,
    pub members: IndexMap<String, Member>,
}

impl Klass {
    /// The identity-only class a module starts from; its own type can be named
    /// before any member exists.
    pub fn empty(path: LogicalPath) -> Self {
        Self {
            name: path.last().to_string(),
            path,
            head: KlassHead::Static,
            members: IndexMap::new(),
        }
    }

    pub fn class_ref(&self) -> ClassRef {
        ClassRef::User(self.path.clone())
    }

    pub fn self_ty(&self) -> Ty {
        Ty::Class(self.class_ref())
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.members.get(name).and_then(Member::as_method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.values().filter_map(Member::as_method)
    }

    /// Slots in declaration order; empty unless the head is `Slots`.
    pub fn slots(&self) -> Vec<&Slot> {
        match &self.head {
            KlassHead::Slots(names) => names
                .iter()
                .filter_map(|n| self.members.get(n).and_then(Member::as_slot))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn member_ref(&self, name: &str) -> MemberRef {
        MemberRef { owner: self.class_ref(), name: name.to_string() }
    }
}
