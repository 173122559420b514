pub mod span;
pub mod config;
pub mod path;
pub mod document;
pub mod syntax;
pub mod diagnostics;
pub mod typeck;
pub mod modules;

use config::Config;
use document::DocumentSource;
use modules::{Compilation, ModuleGraphBuilder};
use path::LogicalPath;

/// Resolve and check `root` and everything it imports
/// (documents → imports → scopes → classes → method bodies).
///
/// Never fails: problems are reported as diagnostics on the returned graph.
/// Callers must check [`Compilation::has_diagnostics`] before handing the
/// graph to a code generator.
pub fn compile(root: &LogicalPath, source: &dyn DocumentSource, config: &Config) -> Compilation {
    log::debug!("compiling {root}");
    let mut builder = ModuleGraphBuilder::new(source, config);
    let module = builder.resolve(root);
    builder.finish(module)
}
