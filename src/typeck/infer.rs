use crate::config::{CheckerConfig, VoidPolicy};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, ShadowKind};
use crate::span::{Span, Spanned};
use crate::syntax::ast;
use super::builtins::BuiltinId;
use super::env::{Member, Method};
use super::expr::{Expr, ExprKind, Literal, Pattern};
use super::scope::{BaseScope, ClassView, MemberInfo};
use super::types::{ClassRef, Ty};

/// What the surrounding construct wants from an expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expected {
    /// Statement position; the value is dropped.
    Void,
    /// A declared type exists and the expression must fit it.
    SubtypeOf(Ty),
    /// No declared type. The first non-bogus sibling fixes it and every later
    /// sibling checked against the same context must agree.
    Infer(Option<Ty>),
}

impl Expected {
    pub(crate) fn infer() -> Self {
        Expected::Infer(None)
    }
}

/// Checks the body of one method. Parameters are fixed; locals form a stack
/// that `let` pushes onto and truncates back when its body is done.
pub(crate) struct MethodChecker<'c, 'a> {
    scope: &'c BaseScope<'a>,
    method: &'a Method,
    config: &'c CheckerConfig,
    sink: &'c mut DiagnosticSink,
    locals: Vec<(String, Ty)>,
}

impl<'c, 'a> MethodChecker<'c, 'a> {
    pub(crate) fn new(
        scope: &'c BaseScope<'a>,
        method: &'a Method,
        config: &'c CheckerConfig,
        sink: &'c mut DiagnosticSink,
    ) -> Self {
        Self { scope, method, config, sink, locals: Vec::new() }
    }

    pub(crate) fn check_body(&mut self, body: &Spanned<ast::Expr>) -> Expr {
        let mut expected = Expected::SubtypeOf(self.method.return_type.clone());
        let checked = self.check(body, &mut expected);
        debug_assert!(self.locals.is_empty());
        checked
    }

    /// Apply `expected` to a freshly built node.
    fn handle(&mut self, expected: &mut Expected, mut node: Expr) -> Expr {
        match expected {
            Expected::Void => {
                if self.config.void_policy == VoidPolicy::RequireVoid
                    && !node.ty.is_bogus()
                    && !node.ty.is_builtin(BuiltinId::Void)
                {
                    self.sink.report(node.span, DiagnosticKind::VoidExpected { found: node.ty.to_string() });
                }
            }
            Expected::SubtypeOf(want) => {
                if !want.accepts(&node.ty, self.config.builtin_widening) {
                    self.sink.report(
                        node.span,
                        DiagnosticKind::TypeMismatch { expected: want.to_string(), found: node.ty.to_string() },
                    );
                    node.ty = Ty::Bogus;
                }
            }
            Expected::Infer(inferred) => match inferred {
                None => {
                    if !node.ty.is_bogus() {
                        *inferred = Some(node.ty.clone());
                    }
                }
                Some(first) => {
                    if !first.same(&node.ty) {
                        self.sink.report(
                            node.span,
                            DiagnosticKind::CombineTypes { first: first.to_string(), second: node.ty.to_string() },
                        );
                        node.ty = Ty::Bogus;
                    }
                }
            },
        }
        node
    }

    pub(crate) fn check(&mut self, expr: &Spanned<ast::Expr>, expected: &mut Expected) -> Expr {
        let span = expr.span;
        let node = match &expr.node {
            ast::Expr::Lit(lit) => check_literal(lit, span),
            ast::Expr::Name(name) => self.check_name(name, span),
            ast::Expr::SelfRef => self.check_self(span),
            ast::Expr::Property { target, name } => self.check_property(target, name, span),
            ast::Expr::Call { target, args } => self.check_call(target, args, span),
            ast::Expr::BinOp { op, lhs, rhs } => {
                self.check_instance_call(lhs, op, std::slice::from_ref(&**rhs), span)
            }
            // These two hand `expected` to their tail and are not handled again.
            ast::Expr::Let { pattern, value, body } => return self.check_let(pattern, value, body, span, expected),
            ast::Expr::Seq(first, second) => {
                let first = self.check(first, &mut Expected::Void);
                let second = self.check(second, expected);
                let ty = second.ty.clone();
                return Expr::new(ExprKind::Sequence(Box::new(first), Box::new(second)), ty, span);
            }
            ast::Expr::When { cases, otherwise } => self.check_when(cases, otherwise, span),
        };
        self.handle(expected, node)
    }

    fn report(&mut self, span: Span, kind: DiagnosticKind) -> Expr {
        self.sink.report(span, kind);
        Expr::invalid(span)
    }

    fn is_local(&self, name: &str) -> bool {
        self.locals.iter().any(|(local, _)| local == name)
    }

    /// Whether `name` would be read as a value rather than a type.
    fn is_value_name(&self, name: &str) -> bool {
        self.method.param_index(name).is_some() || self.is_local(name) || self.scope.has_member(name)
    }

    fn check_name(&mut self, name: &str, span: Span) -> Expr {
        if let Some(index) = self.method.param_index(name) {
            let ty = self.method.params[index].ty.clone();
            return Expr::new(ExprKind::Parameter { index, name: name.to_string() }, ty, span);
        }
        if let Some((_, ty)) = self.locals.iter().rev().find(|(local, _)| local == name) {
            let ty = ty.clone();
            return Expr::new(ExprKind::Local { name: name.to_string() }, ty, span);
        }
        match self.scope.try_get_member(name) {
            Some(Member::Slot(slot)) => {
                if self.method.is_static {
                    return self.report(span, DiagnosticKind::StaticContext { name: name.to_string() });
                }
                let member = self.scope.klass().member_ref(name);
                Expr::new(ExprKind::Slot { target: None, slot: member }, slot.ty.clone(), span)
            }
            Some(Member::Method(_)) => {
                self.report(span, DiagnosticKind::Unsupported { construct: "method reference".into() })
            }
            None if self.scope.resolve_type_name(name).is_some() => {
                self.report(span, DiagnosticKind::TypeUsedAsValue { name: name.to_string() })
            }
            None => self.report(span, DiagnosticKind::UnresolvedName { name: name.to_string() }),
        }
    }

    fn check_self(&mut self, span: Span) -> Expr {
        if self.method.is_static {
            return self.report(span, DiagnosticKind::StaticContext { name: "self".into() });
        }
        Expr::new(ExprKind::SelfRef, self.scope.klass().self_ty(), span)
    }

    /// The class behind a receiver type. Bogus receivers yield `None` without
    /// a report; `Void` is reported as having no members.
    fn receiver_view(&mut self, ty: &Ty, span: Span) -> Option<ClassView<'a>> {
        let class = ty.class()?;
        if *class == ClassRef::Builtin(BuiltinId::Void) {
            self.sink.report(span, DiagnosticKind::NotClassLike { ty: ty.to_string() });
            return None;
        }
        self.scope.class_view(class)
    }

    fn check_property(&mut self, target: &Spanned<ast::Expr>, name: &Spanned<String>, span: Span) -> Expr {
        let target = self.check(target, &mut Expected::infer());
        let Some(view) = self.receiver_view(&target.ty, target.span) else {
            return Expr::invalid(span);
        };
        match view.member(&name.node) {
            Some(MemberInfo::Slot { member, ty }) => {
                Expr::new(ExprKind::Slot { target: Some(Box::new(target)), slot: member }, ty, span)
            }
            Some(MemberInfo::Method { .. }) => {
                self.report(name.span, DiagnosticKind::Unsupported { construct: "method reference".into() })
            }
            None => self.report(
                name.span,
                DiagnosticKind::UnresolvedMember { class: view.name().to_string(), name: name.node.clone() },
            ),
        }
    }

    fn check_call(&mut self, target: &Spanned<ast::Expr>, args: &[Spanned<ast::Expr>], span: Span) -> Expr {
        match &target.node {
            ast::Expr::Property { target: receiver, name } => {
                if let ast::Expr::Name(type_name) = &receiver.node {
                    if !self.is_value_name(type_name) {
                        if let Some(class) = self.scope.resolve_type_name(type_name) {
                            return self.check_static_call(class, name, args, span);
                        }
                    }
                }
                self.check_instance_call(receiver, name, args, span)
            }
            ast::Expr::Name(name) => self.check_bare_call(name, target.span, args, span),
            _ => {
                let callee = self.check(target, &mut Expected::infer());
                self.discard_args(args);
                if callee.ty.is_bogus() {
                    return Expr::invalid(span);
                }
                self.report(target.span, DiagnosticKind::NotCallable)
            }
        }
    }

    /// Check arguments of a call that could not be resolved, for their own diagnostics.
    fn discard_args(&mut self, args: &[Spanned<ast::Expr>]) {
        for arg in args {
            self.check(arg, &mut Expected::infer());
        }
    }

    fn check_args(&mut self, method: &str, params: &[Ty], args: &[Spanned<ast::Expr>], span: Span) -> Vec<Expr> {
        if params.len() != args.len() {
            self.sink.report(
                span,
                DiagnosticKind::Arity { method: method.to_string(), expected: params.len(), found: args.len() },
            );
        }
        args.iter()
            .enumerate()
            .map(|(i, arg)| match params.get(i) {
                Some(param) => self.check(arg, &mut Expected::SubtypeOf(param.clone())),
                None => self.check(arg, &mut Expected::infer()),
            })
            .collect()
    }

    fn check_static_call(
        &mut self,
        class: ClassRef,
        name: &Spanned<String>,
        args: &[Spanned<ast::Expr>],
        span: Span,
    ) -> Expr {
        let Some(view) = self.scope.class_view(&class) else {
            self.discard_args(args);
            return Expr::invalid(span);
        };
        match view.member(&name.node) {
            Some(MemberInfo::Method { member, is_static: true, params, ret }) => {
                let args = self.check_args(&name.node, &params, args, span);
                Expr::new(ExprKind::StaticCall { method: member, args }, ret, span)
            }
            Some(MemberInfo::Method { .. }) => {
                self.discard_args(args);
                self.report(name.span, DiagnosticKind::WrongMethodKind { name: name.node.clone(), is_static: false })
            }
            Some(MemberInfo::Slot { .. }) => {
                self.discard_args(args);
                self.report(name.span, DiagnosticKind::NotCallable)
            }
            None => {
                self.discard_args(args);
                self.report(
                    name.span,
                    DiagnosticKind::UnresolvedMember { class: view.name().to_string(), name: name.node.clone() },
                )
            }
        }
    }

    fn check_instance_call(
        &mut self,
        receiver: &Spanned<ast::Expr>,
        name: &Spanned<String>,
        args: &[Spanned<ast::Expr>],
        span: Span,
    ) -> Expr {
        let target = self.check(receiver, &mut Expected::infer());
        let Some(view) = self.receiver_view(&target.ty, target.span) else {
            self.discard_args(args);
            return Expr::invalid(span);
        };
        match view.member(&name.node) {
            Some(MemberInfo::Method { member, is_static: false, params, ret }) => {
                let args = self.check_args(&name.node, &params, args, span);
                Expr::new(ExprKind::InstanceCall { target: Box::new(target), method: member, args }, ret, span)
            }
            Some(MemberInfo::Method { .. }) => {
                self.discard_args(args);
                self.report(name.span, DiagnosticKind::WrongMethodKind { name: name.node.clone(), is_static: true })
            }
            Some(MemberInfo::Slot { .. }) => {
                self.discard_args(args);
                self.report(name.span, DiagnosticKind::NotCallable)
            }
            None => {
                self.discard_args(args);
                self.report(
                    name.span,
                    DiagnosticKind::UnresolvedMember { class: view.name().to_string(), name: name.node.clone() },
                )
            }
        }
    }

    fn check_bare_call(&mut self, name: &str, name_span: Span, args: &[Spanned<ast::Expr>], span: Span) -> Expr {
        self.discard_args(args);
        let kind = if self.method.param_index(name).is_some() || self.is_local(name) {
            DiagnosticKind::NotCallable
        } else {
            match self.scope.try_get_member(name) {
                Some(Member::Method(_)) => DiagnosticKind::Unsupported { construct: "self call".into() },
                Some(Member::Slot(_)) => DiagnosticKind::NotCallable,
                None if self.scope.resolve_type_name(name).is_some() => {
                    DiagnosticKind::TypeUsedAsValue { name: name.to_string() }
                }
                None => DiagnosticKind::UnresolvedName { name: name.to_string() },
            }
        };
        let at = if matches!(kind, DiagnosticKind::Unsupported { .. }) { span } else { name_span };
        self.report(at, kind)
    }

    fn check_let(
        &mut self,
        pattern: &Spanned<ast::Pattern>,
        value: &Spanned<ast::Expr>,
        body: &Spanned<ast::Expr>,
        span: Span,
        expected: &mut Expected,
    ) -> Expr {
        let value = self.check(value, &mut Expected::infer());
        let mark = self.locals.len();
        let pattern = self.bind_pattern(pattern, value.ty.clone());
        let body = self.check(body, expected);
        self.locals.truncate(mark);

        let ty = body.ty.clone();
        Expr::new(
            ExprKind::Let { pattern, value: Box::new(value), body: Box::new(body) },
            ty,
            span,
        )
    }

    fn bind_pattern(&mut self, pattern: &Spanned<ast::Pattern>, ty: Ty) -> Pattern {
        match &pattern.node {
            ast::Pattern::Ignore => Pattern::Ignore,
            ast::Pattern::Single(name) => {
                self.check_shadowing(name, pattern.span);
                self.locals.push((name.clone(), ty.clone()));
                Pattern::Single { name: name.clone(), ty }
            }
            ast::Pattern::Destruct(parts) => {
                let field_tys = self.destructure(&ty, parts.len(), pattern.span);
                let fields = parts
                    .iter()
                    .enumerate()
                    .map(|(i, part)| {
                        let field_ty = field_tys.as_ref().and_then(|f| f.get(i).cloned()).unwrap_or(Ty::Bogus);
                        self.bind_pattern(part, field_ty)
                    })
                    .collect();
                Pattern::Destruct { ty, fields }
            }
        }
    }

    /// Field types to bind a `count`-part destructuring against, or `None`
    /// after reporting why `ty` cannot be taken apart that way.
    fn destructure(&mut self, ty: &Ty, count: usize, span: Span) -> Option<Vec<Ty>> {
        let class = ty.class()?;
        let fields = self.scope.class_view(class).and_then(|view| view.product_fields());
        match fields {
            Some(fields) if fields.len() == count => Some(fields),
            Some(fields) => {
                self.sink.report(
                    span,
                    DiagnosticKind::DestructureMismatch {
                        ty: ty.to_string(),
                        reason: format!("it has {} slot(s), the pattern has {count}", fields.len()),
                    },
                );
                None
            }
            None => {
                self.sink.report(
                    span,
                    DiagnosticKind::DestructureMismatch { ty: ty.to_string(), reason: "it has no slots".into() },
                );
                None
            }
        }
    }

    fn check_shadowing(&mut self, name: &str, span: Span) {
        let shadowed = if self.method.param_index(name).is_some() {
            ShadowKind::Parameter
        } else if self.is_local(name) {
            ShadowKind::Local
        } else if self.scope.has_member(name) {
            ShadowKind::Member
        } else {
            return;
        };
        self.sink.report(span, DiagnosticKind::IllegalShadowing { name: name.to_string(), shadowed });
    }

    fn check_when(&mut self, cases: &[ast::WhenCase], otherwise: &Spanned<ast::Expr>, span: Span) -> Expr {
        let mut arms = Expected::infer();
        let mut checked = Vec::with_capacity(cases.len());
        for case in cases {
            let test = self.check(&case.test, &mut Expected::SubtypeOf(Ty::builtin(BuiltinId::Bool)));
            let result = self.check(&case.result, &mut arms);
            checked.push((test, result));
        }
        let otherwise = self.check(otherwise, &mut arms);

        let poisoned = otherwise.ty.is_bogus() || checked.iter().any(|(_, result)| result.ty.is_bogus());
        let ty = match arms {
            Expected::Infer(Some(ty)) if !poisoned => ty,
            _ => Ty::Bogus,
        };
        Expr::new(ExprKind::When { cases: checked, otherwise: Box::new(otherwise) }, ty, span)
    }
}

fn check_literal(lit: &ast::Lit, span: Span) -> Expr {
    let (literal, id) = match lit {
        ast::Lit::Void => (Literal::Void, BuiltinId::Void),
        ast::Lit::Bool(b) => (Literal::Bool(*b), BuiltinId::Bool),
        ast::Lit::Int(n) => (Literal::Int(*n), BuiltinId::Int),
        ast::Lit::Float(x) => (Literal::Float(*x), BuiltinId::Real),
        ast::Lit::Str(s) => (Literal::Str(s.clone()), BuiltinId::Str),
    };
    Expr::new(ExprKind::Literal(literal), Ty::builtin(id), span)
}
