//! Resolution of a root module and its transitive imports into a graph of
//! checked modules.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::Config;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::document::{Document, DocumentSource};
use crate::path::{resolve_document, LogicalPath};
use crate::span::Span;
use crate::syntax::ast::{ImportDecl, SyntaxModule};
use crate::typeck::builtins::{self, BuiltinId};
use crate::typeck::{self, ClassTable, ImportBinding, ImportBindings, Klass};

/// Shared handle to a resolved module. Resolving the same path twice in one
/// compilation yields the same allocation.
pub type ModuleRef = Arc<ModuleOrFail>;

#[derive(Debug, Clone)]
pub enum ImportTarget {
    Module(ModuleRef),
    Builtin(BuiltinId),
}

#[derive(Debug, Clone)]
pub struct Import {
    pub span: Span,
    pub target: ImportTarget,
}

impl Import {
    pub fn module(&self) -> Option<&ModuleRef> {
        match &self.target {
            ImportTarget::Module(m) => Some(m),
            ImportTarget::Builtin(_) => None,
        }
    }
}

/// A fully checked module.
#[derive(Debug)]
pub struct Module {
    pub path: LogicalPath,
    pub document_path: PathBuf,
    pub document: Arc<Document>,
    pub imports: Vec<Import>,
    pub klass: Klass,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// Neither candidate document exists.
    NotFound { tried: Vec<PathBuf> },
    ParseFailed,
    /// Placeholder for an ancestor met again on the resolution stack.
    Circular,
    /// At least one import could not be resolved.
    ImportsFailed,
}

/// A module that never reached the checked state. Keeps whatever imports did
/// resolve so their diagnostics stay reachable.
#[derive(Debug)]
pub struct FailModule {
    pub path: LogicalPath,
    pub reason: FailReason,
    pub imports: Vec<Import>,
    pub diagnostics: Vec<Diagnostic>,
    pub document: Option<Arc<Document>>,
}

#[derive(Debug)]
pub enum ModuleOrFail {
    Module(Module),
    Fail(FailModule),
}

impl ModuleOrFail {
    pub fn path(&self) -> &LogicalPath {
        match self {
            ModuleOrFail::Module(m) => &m.path,
            ModuleOrFail::Fail(f) => &f.path,
        }
    }

    pub fn imports(&self) -> &[Import] {
        match self {
            ModuleOrFail::Module(m) => &m.imports,
            ModuleOrFail::Fail(f) => &f.imports,
        }
    }

    /// Diagnostics discovered while building this module only.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ModuleOrFail::Module(m) => &m.diagnostics,
            ModuleOrFail::Fail(f) => &f.diagnostics,
        }
    }

    pub fn document(&self) -> Option<&Arc<Document>> {
        match self {
            ModuleOrFail::Module(m) => Some(&m.document),
            ModuleOrFail::Fail(f) => f.document.as_ref(),
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, ModuleOrFail::Fail(_))
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            ModuleOrFail::Module(m) => Some(m),
            ModuleOrFail::Fail(_) => None,
        }
    }

    pub fn as_fail(&self) -> Option<&FailModule> {
        match self {
            ModuleOrFail::Fail(f) => Some(f),
            ModuleOrFail::Module(_) => None,
        }
    }

    pub fn klass(&self) -> Option<&Klass> {
        self.as_module().map(|m| &m.klass)
    }
}

/// Finished modules by path, in completion order.
#[derive(Debug, Default)]
pub struct ModuleCache(IndexMap<LogicalPath, ModuleRef>);

impl ModuleCache {
    pub fn get(&self, path: &LogicalPath) -> Option<&ModuleRef> {
        self.0.get(path)
    }

    fn insert(&mut self, path: LogicalPath, module: ModuleRef) {
        self.0.insert(path, module);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LogicalPath, &ModuleRef)> {
        self.0.iter()
    }
}

impl ClassTable for ModuleCache {
    fn klass(&self, path: &LogicalPath) -> Option<&Klass> {
        self.0.get(path).and_then(|m| m.klass())
    }
}

/// Depth-first resolver. Finished modules are memoized by path; the stack
/// holds the chain currently being resolved and is the only thing cycle
/// detection looks at.
pub struct ModuleGraphBuilder<'s> {
    source: &'s dyn DocumentSource,
    config: &'s Config,
    modules: ModuleCache,
    stack: Vec<LogicalPath>,
}

impl<'s> ModuleGraphBuilder<'s> {
    pub fn new(source: &'s dyn DocumentSource, config: &'s Config) -> Self {
        Self { source, config, modules: ModuleCache::default(), stack: Vec::new() }
    }

    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    /// Resolve `path` and everything it imports.
    pub fn resolve(&mut self, path: &LogicalPath) -> ModuleRef {
        self.resolve_path(path).0
    }

    /// Resolve `path`, returning the module together with the diagnostic the
    /// importer should record for this edge, if any.
    fn resolve_path(&mut self, path: &LogicalPath) -> (ModuleRef, Option<DiagnosticKind>) {
        if let Some(module) = self.modules.get(path) {
            log::trace!("cache hit for {path}");
            let edge = match module.as_fail().map(|f| &f.reason) {
                Some(FailReason::NotFound { tried }) => {
                    Some(DiagnosticKind::CantFindLocalModule { path: path.clone(), tried: tried.clone() })
                }
                _ => None,
            };
            return (Arc::clone(module), edge);
        }

        if let Some(chain) = self.cycle_chain(path) {
            log::debug!("circular dependency on {path}");
            let placeholder = Arc::new(ModuleOrFail::Fail(FailModule {
                path: path.clone(),
                reason: FailReason::Circular,
                imports: Vec::new(),
                diagnostics: Vec::new(),
                document: None,
            }));
            return (placeholder, Some(DiagnosticKind::CircularDependency { path: path.clone(), chain }));
        }

        match resolve_document(path, self.source, &self.config.resolver) {
            Ok((document_path, document)) => (self.build_module(path, document_path, document), None),
            Err(tried) => {
                log::debug!("module {path} not found");
                let kind = DiagnosticKind::CantFindLocalModule { path: path.clone(), tried: tried.clone() };
                // Only the root has no importer to carry the report.
                let diagnostics = if self.stack.is_empty() {
                    vec![Diagnostic::unlocated(kind.clone())]
                } else {
                    Vec::new()
                };
                let module = Arc::new(ModuleOrFail::Fail(FailModule {
                    path: path.clone(),
                    reason: FailReason::NotFound { tried },
                    imports: Vec::new(),
                    diagnostics,
                    document: None,
                }));
                self.modules.insert(path.clone(), Arc::clone(&module));
                (module, Some(kind))
            }
        }
    }

    /// The chain from the earlier occurrence of `path` on the stack back to
    /// `path` itself, e.g. `[A, B, A]`.
    fn cycle_chain(&self, path: &LogicalPath) -> Option<Vec<LogicalPath>> {
        let start = self.stack.iter().position(|p| p == path)?;
        let mut chain = self.stack[start..].to_vec();
        chain.push(path.clone());
        Some(chain)
    }

    fn build_module(&mut self, path: &LogicalPath, document_path: PathBuf, document: Arc<Document>) -> ModuleRef {
        log::debug!("resolving {path} from {}", document_path.display());
        self.stack.push(path.clone());
        let result = match &document.parse {
            Ok(syntax) => self.build_parsed(path, document_path, &document, syntax),
            Err(err) => ModuleOrFail::Fail(FailModule {
                path: path.clone(),
                reason: FailReason::ParseFailed,
                imports: Vec::new(),
                diagnostics: vec![Diagnostic::new(
                    Some(path.clone()),
                    err.span,
                    DiagnosticKind::Parse { message: err.message.clone() },
                )],
                document: Some(Arc::clone(&document)),
            }),
        };
        self.stack.pop();

        let module = Arc::new(result);
        self.modules.insert(path.clone(), Arc::clone(&module));
        log::debug!("finished {path} ({})", if module.is_fail() { "failed" } else { "ok" });
        module
    }

    fn build_parsed(
        &mut self,
        path: &LogicalPath,
        document_path: PathBuf,
        document: &Arc<Document>,
        syntax: &SyntaxModule,
    ) -> ModuleOrFail {
        let mut sink = DiagnosticSink::new(Some(path.clone()));
        let mut imports = Vec::with_capacity(syntax.imports.len());
        let mut failed = false;

        for import in &syntax.imports {
            let span = import.span;
            let target = match &import.node {
                ImportDecl::Builtin(name) => {
                    match builtins::lookup(name) {
                        Some(class) => imports.push(Import { span, target: ImportTarget::Builtin(class.id) }),
                        None => {
                            sink.report(span, DiagnosticKind::UnknownBuiltin { name: name.clone() });
                            failed = true;
                        }
                    }
                    continue;
                }
                ImportDecl::Global(target) => target.clone(),
                ImportDecl::Relative(relative) => match relative.resolve(path.dir()) {
                    Some(target) => target,
                    None => {
                        sink.report(
                            span,
                            DiagnosticKind::BadRelativeImport { import: relative.to_string(), base: path.clone() },
                        );
                        failed = true;
                        continue;
                    }
                },
            };

            let (module, edge) = self.resolve_path(&target);
            if let Some(kind) = edge {
                sink.report(span, kind);
            }
            failed |= module.is_fail();
            imports.push(Import { span, target: ImportTarget::Module(module) });
        }

        if failed {
            return ModuleOrFail::Fail(FailModule {
                path: path.clone(),
                reason: FailReason::ImportsFailed,
                imports,
                diagnostics: sink.into_vec(),
                document: Some(Arc::clone(document)),
            });
        }

        let bindings = ImportBindings::new(
            path.clone(),
            imports.iter().map(|import| {
                let binding = match &import.target {
                    ImportTarget::Module(m) => ImportBinding::Module(m.path().clone()),
                    ImportTarget::Builtin(id) => ImportBinding::Builtin(*id),
                };
                (import.span, binding)
            }),
            &mut sink,
        );
        let klass = typeck::check_class(path, &syntax.class, &bindings, &self.modules, &self.config.checker, &mut sink);

        ModuleOrFail::Module(Module {
            path: path.clone(),
            document_path,
            document: Arc::clone(document),
            imports,
            klass,
            diagnostics: sink.into_vec(),
        })
    }

    pub fn finish(self, root: ModuleRef) -> Compilation {
        Compilation { root, modules: self.modules }
    }
}

/// The outcome of compiling one root module.
#[derive(Debug)]
pub struct Compilation {
    root: ModuleRef,
    modules: ModuleCache,
}

impl Compilation {
    pub fn root(&self) -> &ModuleRef {
        &self.root
    }

    pub fn get(&self, path: &LogicalPath) -> Option<&ModuleRef> {
        self.modules.get(path)
    }

    /// Every finished module, in completion order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRef> {
        self.modules.iter().map(|(_, m)| m)
    }

    /// All diagnostics reachable from the root in discovery order. Each module
    /// is visited once; its own diagnostics come before those of its imports.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        let mut seen: HashSet<*const ModuleOrFail> = HashSet::new();
        let mut out = Vec::new();
        collect_diagnostics(&self.root, &mut seen, &mut out);
        out
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics().is_empty()
    }

    /// Render every diagnostic against the text of the document it belongs to.
    pub fn render_all(&self) -> String {
        self.diagnostics()
            .into_iter()
            .map(|d| {
                let text = d
                    .module()
                    .and_then(|path| self.modules.get(path))
                    .and_then(|m| m.document())
                    .map(|doc| doc.text.as_str())
                    .unwrap_or("");
                d.render(text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn diagnostics_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.diagnostics())
    }
}

fn collect_diagnostics<'m>(
    module: &'m ModuleRef,
    seen: &mut HashSet<*const ModuleOrFail>,
    out: &mut Vec<&'m Diagnostic>,
) {
    if !seen.insert(Arc::as_ptr(module)) {
        return;
    }
    out.extend(module.diagnostics());
    for import in module.imports() {
        if let Some(target) = import.module() {
            collect_diagnostics(target, seen, out);
        }
    }
}
