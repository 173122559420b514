//! Checked expressions. Every node carries its resolved type; nodes refer to
//! members through [`MemberRef`] and never own the things they call.

use crate::span::Span;
use super::env::MemberRef;
use super::types::Ty;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Ty,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Parameter { index: usize, name: String },
    Local { name: String },
    SelfRef,
    /// Slot read; `target` is `None` for an implicit `self`.
    Slot { target: Option<Box<Expr>>, slot: MemberRef },
    StaticCall { method: MemberRef, args: Vec<Expr> },
    InstanceCall { target: Box<Expr>, method: MemberRef, args: Vec<Expr> },
    Let { pattern: Pattern, value: Box<Expr>, body: Box<Expr> },
    Sequence(Box<Expr>, Box<Expr>),
    When { cases: Vec<(Expr, Expr)>, otherwise: Box<Expr> },
    /// Placeholder left where a diagnostic was reported.
    Invalid,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Ty, span: Span) -> Self {
        Self { kind, ty, span }
    }

    pub fn invalid(span: Span) -> Self {
        Self { kind: ExprKind::Invalid, ty: Ty::Bogus, span }
    }

    /// Number of `Invalid` placeholders in the tree.
    pub fn invalid_count(&self) -> usize {
        let own = usize::from(matches!(self.kind, ExprKind::Invalid));
        own + self.children().iter().map(|c| c.invalid_count()).sum::<usize>()
    }

    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_)
            | ExprKind::Parameter { .. }
            | ExprKind::Local { .. }
            | ExprKind::SelfRef
            | ExprKind::Invalid => Vec::new(),
            ExprKind::Slot { target, .. } => target.iter().map(|t| t.as_ref()).collect(),
            ExprKind::StaticCall { args, .. } => args.iter().collect(),
            ExprKind::InstanceCall { target, args, .. } => {
                std::iter::once(target.as_ref()).chain(args.iter()).collect()
            }
            ExprKind::Let { value, body, .. } => vec![value, body],
            ExprKind::Sequence(first, second) => vec![first, second],
            ExprKind::When { cases, otherwise } => cases
                .iter()
                .flat_map(|(test, result)| [test, result])
                .chain(std::iter::once(otherwise.as_ref()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ignore,
    Single { name: String, ty: Ty },
    /// Positional bind against the slots of `ty`.
    Destruct { ty: Ty, fields: Vec<Pattern> },
}

impl Pattern {
    /// Names this pattern brings into scope, left to right.
    pub fn bound_names(&self) -> Vec<&str> {
        match self {
            Pattern::Ignore => Vec::new(),
            Pattern::Single { name, .. } => vec![name.as_str()],
            Pattern::Destruct { fields, .. } => fields.iter().flat_map(Pattern::bound_names).collect(),
        }
    }
}
