use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::path::LogicalPath;
use crate::span::Span;

/// Where a diagnostic was discovered: a module and a byte span in its
/// document. Both are absent only when the root module could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub module: Option<LogicalPath>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ShadowKind {
    Parameter,
    Member,
    Local,
}

impl fmt::Display for ShadowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowKind::Parameter => write!(f, "parameter"),
            ShadowKind::Member => write!(f, "member"),
            ShadowKind::Local => write!(f, "local"),
        }
    }
}

fn display_tried(tried: &[PathBuf]) -> String {
    tried.iter().map(|p| format!("'{}'", p.display())).collect::<Vec<_>>().join(", ")
}

fn method_kind(is_static: bool) -> &'static str {
    if is_static { "a static" } else { "an instance" }
}

fn display_chain(chain: &[LogicalPath]) -> String {
    chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum DiagnosticKind {
    #[error("syntax error: {message}")]
    Parse { message: String },

    // Resolution
    #[error("cannot find module '{path}' (tried {})", display_tried(.tried))]
    CantFindLocalModule { path: LogicalPath, tried: Vec<PathBuf> },

    #[error("circular dependency: {}", display_chain(.chain))]
    CircularDependency { path: LogicalPath, chain: Vec<LogicalPath> },

    #[error("relative import '{import}' climbs above the root of '{base}'")]
    BadRelativeImport { import: String, base: LogicalPath },

    #[error("unknown builtin class '{name}'")]
    UnknownBuiltin { name: String },

    // Scope construction
    #[error("import '{name}' has the same name as the class being defined")]
    ImportShadowsClass { name: String },

    #[error("'{name}' is imported more than once")]
    DuplicateImport { name: String },

    // Member table
    #[error("duplicate member '{name}'")]
    DuplicateMember { name: String },

    #[error("instance method '{name}' declared in a static class")]
    InstanceMethodInStaticClass { name: String },

    #[error("'{method}' expects {expected} argument(s), found {found}")]
    Arity { method: String, expected: usize, found: usize },

    // Lookup
    #[error("unresolved name '{name}'")]
    UnresolvedName { name: String },

    #[error("unknown type '{name}'")]
    UnresolvedType { name: String },

    #[error("type '{class}' has no member '{name}'")]
    UnresolvedMember { class: String, name: String },

    // Types
    #[error("cannot combine types '{first}' and '{second}'")]
    CombineTypes { first: String, second: String },

    #[error("type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    #[error("expected a void expression, found '{found}'")]
    VoidExpected { found: String },

    // Structure
    #[error("'{name}' shadows an existing {shadowed}")]
    IllegalShadowing { name: String, shadowed: ShadowKind },

    #[error("expression is not callable")]
    NotCallable,

    #[error("type '{ty}' has no members")]
    NotClassLike { ty: String },

    #[error("'{name}' needs an instance but the method is static")]
    StaticContext { name: String },

    #[error("'{name}' is {} method", method_kind(*.is_static))]
    WrongMethodKind { name: String, is_static: bool },

    #[error("type '{name}' used as a value")]
    TypeUsedAsValue { name: String },

    #[error("cannot destructure '{ty}': {reason}")]
    DestructureMismatch { ty: String, reason: String },

    #[error("unsupported: {construct}")]
    Unsupported { construct: String },
}

impl DiagnosticKind {
    /// Stable name of the variant, for tooling and tests.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::Parse { .. } => "Parse",
            DiagnosticKind::CantFindLocalModule { .. } => "CantFindLocalModule",
            DiagnosticKind::CircularDependency { .. } => "CircularDependency",
            DiagnosticKind::BadRelativeImport { .. } => "BadRelativeImport",
            DiagnosticKind::UnknownBuiltin { .. } => "UnknownBuiltin",
            DiagnosticKind::ImportShadowsClass { .. } => "ImportShadowsClass",
            DiagnosticKind::DuplicateImport { .. } => "DuplicateImport",
            DiagnosticKind::DuplicateMember { .. } => "DuplicateMember",
            DiagnosticKind::InstanceMethodInStaticClass { .. } => "InstanceMethodInStaticClass",
            DiagnosticKind::Arity { .. } => "Arity",
            DiagnosticKind::UnresolvedName { .. } => "UnresolvedName",
            DiagnosticKind::UnresolvedType { .. } => "UnresolvedType",
            DiagnosticKind::UnresolvedMember { .. } => "UnresolvedMember",
            DiagnosticKind::CombineTypes { .. } => "CombineTypes",
            DiagnosticKind::TypeMismatch { .. } => "TypeMismatch",
            DiagnosticKind::VoidExpected { .. } => "VoidExpected",
            DiagnosticKind::IllegalShadowing { .. } => "IllegalShadowing",
            DiagnosticKind::NotCallable => "NotCallable",
            DiagnosticKind::NotClassLike { .. } => "NotClassLike",
            DiagnosticKind::StaticContext { .. } => "StaticContext",
            DiagnosticKind::WrongMethodKind { .. } => "WrongMethodKind",
            DiagnosticKind::TypeUsedAsValue { .. } => "TypeUsedAsValue",
            DiagnosticKind::DestructureMismatch { .. } => "DestructureMismatch",
            DiagnosticKind::Unsupported { .. } => "Unsupported",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            DiagnosticKind::Parse { .. } => "syntax",
            DiagnosticKind::CantFindLocalModule { .. }
            | DiagnosticKind::CircularDependency { .. }
            | DiagnosticKind::BadRelativeImport { .. }
            | DiagnosticKind::UnknownBuiltin { .. } => "resolution",
            _ => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub location: Location,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(module: Option<LogicalPath>, span: Span, kind: DiagnosticKind) -> Self {
        Self { location: Location { module, span: Some(span) }, kind }
    }

    /// A diagnostic with no module or span to point at.
    pub fn unlocated(kind: DiagnosticKind) -> Self {
        Self { location: Location { module: None, span: None }, kind }
    }

    pub fn module(&self) -> Option<&LogicalPath> {
        self.location.module.as_ref()
    }

    pub fn span(&self) -> Option<Span> {
        self.location.span
    }

    /// Render with ariadne against the text of the module's document.
    pub fn render(&self, source: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        // ariadne drops labels that fall outside the text, message included.
        let span = self.location.span.filter(|s| s.start <= s.end && s.end <= source.len());
        let mut builder = Report::<Range<usize>>::build(ReportKind::Error, (), span.map_or(0, |s| s.start))
            .with_config(Config::default().with_color(false))
            .with_message(format!("{} error", self.kind.category()));
        builder = match span {
            Some(span) => builder.with_label(Label::new(span.start..span.end).with_message(self.kind.to_string())),
            None => builder.with_note(self.kind.to_string()),
        };

        let mut out = Vec::new();
        match builder.finish().write(Source::from(source), &mut out) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.location.module, self.location.span) {
            (Some(module), Some(span)) => write!(f, "{module}:{}: {}", span.start, self.kind),
            (Some(module), None) => write!(f, "{module}: {}", self.kind),
            (None, _) => write!(f, "{}", self.kind),
        }
    }
}

/// Collects diagnostics for one module in discovery order.
#[derive(Debug)]
pub struct DiagnosticSink {
    module: Option<LogicalPath>,
    items: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(module: Option<LogicalPath>) -> Self {
        Self { module, items: Vec::new() }
    }

    pub fn report(&mut self, span: Span, kind: DiagnosticKind) {
        log::trace!("diagnostic {} at {}..{}", kind.code(), span.start, span.end);
        self.items.push(Diagnostic::new(self.module.clone(), span, kind));
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
