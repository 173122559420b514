//! Name resolution for one class: its own members, its imports, the builtins.

use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::path::LogicalPath;
use crate::span::Span;
use super::builtins::{self, BuiltinClass, BuiltinId};
use super::env::{Klass, KlassHead, Member, MemberRef};
use super::types::{ClassRef, Ty};

/// Finished classes of other modules, looked up by module path.
pub trait ClassTable {
    fn klass(&self, path: &LogicalPath) -> Option<&Klass>;
}

/// What an import makes visible under its exposed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    Module(LogicalPath),
    Builtin(BuiltinId),
}

impl ImportBinding {
    /// The name the import exposes: the module's class name or the builtin's name.
    pub fn name(&self) -> &str {
        match self {
            ImportBinding::Module(path) => path.last(),
            ImportBinding::Builtin(id) => builtins::get(*id).name,
        }
    }

    pub fn class_ref(&self) -> ClassRef {
        match self {
            ImportBinding::Module(path) => ClassRef::User(path.clone()),
            ImportBinding::Builtin(id) => ClassRef::Builtin(*id),
        }
    }
}

/// The validated import list of a class. Imports that collide with the class
/// name or with an earlier import are reported and left out.
#[derive(Debug, Clone)]
pub struct ImportBindings {
    class_path: LogicalPath,
    bindings: Vec<ImportBinding>,
}

impl ImportBindings {
    pub fn new(
        class_path: LogicalPath,
        imports: impl IntoIterator<Item = (Span, ImportBinding)>,
        sink: &mut DiagnosticSink,
    ) -> Self {
        let mut bindings: Vec<ImportBinding> = Vec::new();
        for (span, binding) in imports {
            let name = binding.name();
            if name == class_path.last() {
                sink.report(span, DiagnosticKind::ImportShadowsClass { name: name.to_string() });
                continue;
            }
            if bindings.iter().any(|earlier| earlier.name() == name) {
                sink.report(span, DiagnosticKind::DuplicateImport { name: name.to_string() });
                continue;
            }
            bindings.push(binding);
        }
        Self { class_path, bindings }
    }

    pub fn bindings(&self) -> &[ImportBinding] {
        &self.bindings
    }

    /// Own name, then imports, then builtins.
    pub fn resolve_type_name(&self, name: &str) -> Option<ClassRef> {
        if name == self.class_path.last() {
            return Some(ClassRef::User(self.class_path.clone()));
        }
        if let Some(binding) = self.bindings.iter().find(|b| b.name() == name) {
            return Some(binding.class_ref());
        }
        builtins::lookup(name).map(|class| ClassRef::Builtin(class.id))
    }
}

/// A member as the checker sees it, regardless of who declared it.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberInfo {
    Slot {
        member: MemberRef,
        ty: Ty,
    },
    Method {
        member: MemberRef,
        is_static: bool,
        params: Vec<Ty>,
        ret: Ty,
    },
}

/// Read access to a class-like entity: a user class or a builtin.
#[derive(Debug, Clone, Copy)]
pub enum ClassView<'a> {
    User(&'a Klass),
    Builtin(&'static BuiltinClass),
}

impl<'a> ClassView<'a> {
    pub fn name(&self) -> &str {
        match self {
            ClassView::User(klass) => &klass.name,
            ClassView::Builtin(class) => class.name,
        }
    }

    pub fn class_ref(&self) -> ClassRef {
        match self {
            ClassView::User(klass) => klass.class_ref(),
            ClassView::Builtin(class) => ClassRef::Builtin(class.id),
        }
    }

    pub fn member(&self, name: &str) -> Option<MemberInfo> {
        match self {
            ClassView::User(klass) => {
                let member = MemberRef { owner: klass.class_ref(), name: name.to_string() };
                match klass.member(name)? {
                    Member::Slot(slot) => Some(MemberInfo::Slot { member, ty: slot.ty.clone() }),
                    Member::Method(method) => Some(MemberInfo::Method {
                        member,
                        is_static: method.is_static,
                        params: method.param_types(),
                        ret: method.return_type.clone(),
                    }),
                }
            }
            ClassView::Builtin(class) => {
                let method = class.method(name)?;
                Some(MemberInfo::Method {
                    member: MemberRef { owner: ClassRef::Builtin(class.id), name: name.to_string() },
                    is_static: method.is_static,
                    params: method.params.iter().map(|p| Ty::builtin(*p)).collect(),
                    ret: Ty::builtin(method.ret),
                })
            }
        }
    }

    /// Slot types in declaration order, if this is a slotted user class.
    pub fn product_fields(&self) -> Option<Vec<Ty>> {
        match self {
            ClassView::User(klass) if matches!(klass.head, KlassHead::Slots(_)) => {
                Some(klass.slots().into_iter().map(|s| s.ty.clone()).collect())
            }
            _ => None,
        }
    }
}

/// Scope of one class while its method bodies are checked. Built after the
/// member table is complete and never mutated.
pub struct BaseScope<'a> {
    klass: &'a Klass,
    imports: &'a ImportBindings,
    table: &'a dyn ClassTable,
}

impl<'a> BaseScope<'a> {
    pub fn new(klass: &'a Klass, imports: &'a ImportBindings, table: &'a dyn ClassTable) -> Self {
        Self { klass, imports, table }
    }

    pub fn klass(&self) -> &'a Klass {
        self.klass
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.klass.members.contains_key(name)
    }

    pub fn try_get_member(&self, name: &str) -> Option<&'a Member> {
        self.klass.members.get(name)
    }

    pub fn resolve_type_name(&self, name: &str) -> Option<ClassRef> {
        self.imports.resolve_type_name(name)
    }

    /// The class behind `class`. The class under construction is served from
    /// this scope since it is not in the table yet.
    pub fn class_view(&self, class: &ClassRef) -> Option<ClassView<'a>> {
        match class {
            ClassRef::Builtin(id) => Some(ClassView::Builtin(builtins::get(*id))),
            ClassRef::User(path) if *path == self.klass.path => Some(ClassView::User(self.klass)),
            ClassRef::User(path) => self.table.klass(path).map(ClassView::User),
        }
    }
}
