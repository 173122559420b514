use crate::config::CheckerConfig;
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, ShadowKind};
use crate::path::LogicalPath;
use crate::span::{Span, Spanned};
use crate::syntax::ast::{self, ClassDecl, HeadDecl, MethodSig, TypeRef};
use super::env::{Klass, KlassHead, Member, Method, Param, Slot};
use super::expr::Expr;
use super::infer::MethodChecker;
use super::scope::{BaseScope, ClassTable, ImportBindings};
use super::types::{ClassRef, Ty};

/// Build the class a module declares.
///
/// Signatures come first: the head and every member signature are in the
/// member table before any body is checked, so bodies may refer to members
/// declared after them. Errors are reported into `sink`; the returned class is
/// always complete, with `Bogus` standing in for types that failed to resolve.
pub fn check_class(
    path: &LogicalPath,
    decl: &Spanned<ClassDecl>,
    imports: &ImportBindings,
    table: &dyn ClassTable,
    config: &CheckerConfig,
    sink: &mut DiagnosticSink,
) -> Klass {
    let mut klass = Klass::empty(path.clone());
    let owner = klass.class_ref();

    // Pass 1: head and signatures
    klass.head = match &decl.node.head.node {
        HeadDecl::Static => KlassHead::Static,
        HeadDecl::Slots(slots) => {
            let mut names = Vec::new();
            for slot in slots {
                let name = &slot.node.name;
                if klass.members.contains_key(&name.node) {
                    sink.report(name.span, DiagnosticKind::DuplicateMember { name: name.node.clone() });
                    continue;
                }
                let ty = resolve_type(&slot.node.ty, imports, sink);
                names.push(name.node.clone());
                klass.members.insert(
                    name.node.clone(),
                    Member::Slot(Slot {
                        name: name.node.clone(),
                        ty,
                        mutable: slot.node.mutable,
                        owner: owner.clone(),
                        span: slot.span,
                    }),
                );
            }
            KlassHead::Slots(names)
        }
        HeadDecl::Abstract(sigs) => {
            let mut names = Vec::new();
            for sig in sigs {
                let name = &sig.node.name;
                if klass.members.contains_key(&name.node) {
                    sink.report(name.span, DiagnosticKind::DuplicateMember { name: name.node.clone() });
                    continue;
                }
                let method = build_signature(&sig.node, sig.span, true, &owner, imports, sink);
                names.push(name.node.clone());
                klass.members.insert(name.node.clone(), Member::Method(method));
            }
            KlassHead::Abstract(names)
        }
    };

    let mut pending: Vec<(String, &Spanned<ast::Expr>)> = Vec::new();
    for method_decl in &decl.node.methods {
        let sig = &method_decl.node.sig;
        if klass.members.contains_key(&sig.name.node) {
            sink.report(sig.name.span, DiagnosticKind::DuplicateMember { name: sig.name.node.clone() });
            continue;
        }
        if klass.head == KlassHead::Static && !sig.is_static {
            sink.report(
                sig.name.span,
                DiagnosticKind::InstanceMethodInStaticClass { name: sig.name.node.clone() },
            );
        }
        let method = build_signature(sig, method_decl.span, false, &owner, imports, sink);
        klass.members.insert(sig.name.node.clone(), Member::Method(method));
        pending.push((sig.name.node.clone(), &method_decl.node.body));
    }
    log::debug!("{path}: {} member(s), checking {} body(ies)", klass.members.len(), pending.len());

    // Pass 2: bodies
    let bodies: Vec<(String, Expr)> = {
        let scope = BaseScope::new(&klass, imports, table);
        pending
            .into_iter()
            .filter_map(|(name, body)| {
                let method = klass.method(&name)?;
                let checked = MethodChecker::new(&scope, method, config, sink).check_body(body);
                Some((name, checked))
            })
            .collect()
    };
    for (name, body) in bodies {
        if let Some(Member::Method(method)) = klass.members.get_mut(&name) {
            method.body = Some(body);
        }
    }
    klass
}

fn build_signature(
    sig: &MethodSig,
    span: Span,
    is_abstract: bool,
    owner: &ClassRef,
    imports: &ImportBindings,
    sink: &mut DiagnosticSink,
) -> Method {
    let mut params: Vec<Param> = Vec::with_capacity(sig.params.len());
    for p in &sig.params {
        if params.iter().any(|earlier| earlier.name == p.name.node) {
            sink.report(
                p.name.span,
                DiagnosticKind::IllegalShadowing { name: p.name.node.clone(), shadowed: ShadowKind::Parameter },
            );
        }
        params.push(Param {
            name: p.name.node.clone(),
            ty: resolve_type(&p.ty, imports, sink),
            span: p.name.span,
        });
    }
    Method {
        name: sig.name.node.clone(),
        is_static: sig.is_static,
        is_abstract,
        params,
        return_type: resolve_type(&sig.return_type, imports, sink),
        body: None,
        owner: owner.clone(),
        span,
    }
}

/// Resolve a written type. Unknown names and type arguments are reported and
/// become `Bogus`.
pub(crate) fn resolve_type(ty: &Spanned<TypeRef>, imports: &ImportBindings, sink: &mut DiagnosticSink) -> Ty {
    let Some(class) = imports.resolve_type_name(&ty.node.name) else {
        sink.report(ty.span, DiagnosticKind::UnresolvedType { name: ty.node.name.clone() });
        return Ty::Bogus;
    };
    if !ty.node.args.is_empty() {
        sink.report(ty.span, DiagnosticKind::Unsupported { construct: "generic type arguments".into() });
        return Ty::Bogus;
    }
    Ty::Class(class)
}
