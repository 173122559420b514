use serde::{Deserialize, Serialize};

use crate::path::{LogicalPath, RelativePath};
use crate::span::Spanned;

/// One parsed source document: its imports and the single class it declares.
/// The class takes its name from the last segment of the module's logical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxModule {
    pub imports: Vec<Spanned<ImportDecl>>,
    pub class: Spanned<ClassDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportDecl {
    /// `import a.b.C`
    Global(LogicalPath),
    /// `import ^.sibling.D`
    Relative(RelativePath),
    /// `import builtin Show`
    Builtin(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub head: Spanned<HeadDecl>,
    pub methods: Vec<Spanned<MethodDecl>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeadDecl {
    Static,
    Abstract(Vec<Spanned<MethodSig>>),
    Slots(Vec<Spanned<SlotDecl>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDecl {
    pub name: Spanned<String>,
    pub mutable: bool,
    pub ty: Spanned<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: Spanned<String>,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub return_type: Spanned<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub sig: MethodSig,
    pub body: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeRef>,
}

/// A type written in source. Type arguments parse but are not supported by the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Spanned<TypeRef>>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Lit {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Lit(Lit),
    Name(String),
    SelfRef,
    Property {
        target: Box<Spanned<Expr>>,
        name: Spanned<String>,
    },
    Call {
        target: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    /// `lhs op rhs`, sugar for `lhs.op(rhs)`.
    BinOp {
        op: Spanned<String>,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Let {
        pattern: Spanned<Pattern>,
        value: Box<Spanned<Expr>>,
        body: Box<Spanned<Expr>>,
    },
    /// `first; second`
    Seq(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    When {
        cases: Vec<WhenCase>,
        otherwise: Box<Spanned<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenCase {
    pub test: Spanned<Expr>,
    pub result: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Ignore,
    Single(String),
    /// Positional decomposition of a slotted class, in slot declaration order.
    Destruct(Vec<Spanned<Pattern>>),
}
