//! Source documents and where they come from.
//!
//! The front end never reads files or runs the parser itself: it asks a
//! [`DocumentSource`] for a path and gets back text plus the parser's verdict.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::span::Span;
use crate::syntax::ast::SyntaxModule;

/// The parser's terminal failure for a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self { message: message.into(), span }
    }
}

/// Immutable snapshot of one source document.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub version: u32,
    pub parse: Result<SyntaxModule, ParseError>,
}

impl Document {
    pub fn parsed(text: impl Into<String>, module: SyntaxModule) -> Self {
        Self { text: text.into(), version: 0, parse: Ok(module) }
    }

    pub fn failed(text: impl Into<String>, error: ParseError) -> Self {
        Self { text: text.into(), version: 0, parse: Err(error) }
    }
}

/// Supplies documents by resolved path. Must answer the same way for the same
/// path for the duration of one compilation.
pub trait DocumentSource {
    fn get_document(&self, path: &Path) -> Option<Arc<Document>>;
}

/// Documents held in memory, e.g. editor buffers or test fixtures.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: HashMap<PathBuf, Arc<Document>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document. Replacing bumps the version past the old one.
    pub fn insert(&mut self, path: impl Into<PathBuf>, mut doc: Document) -> Arc<Document> {
        let path = path.into();
        if let Some(prev) = self.docs.get(&path) {
            doc.version = doc.version.max(prev.version + 1);
        }
        let doc = Arc::new(doc);
        self.docs.insert(path, Arc::clone(&doc));
        doc
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentSource for MemorySource {
    fn get_document(&self, path: &Path) -> Option<Arc<Document>> {
        self.docs.get(path).cloned()
    }
}

type ParseFn = dyn Fn(&str) -> Result<SyntaxModule, ParseError>;

/// Reads documents from disk below `root` and runs the given parser on them.
/// Each path is read at most once, so repeated lookups see the same snapshot.
pub struct FsSource {
    root: PathBuf,
    parse: Box<ParseFn>,
    cache: RefCell<HashMap<PathBuf, Option<Arc<Document>>>>,
}

impl FsSource {
    pub fn new<F>(root: impl Into<PathBuf>, parse: F) -> Self
    where
        F: Fn(&str) -> Result<SyntaxModule, ParseError> + 'static,
    {
        Self {
            root: root.into(),
            parse: Box::new(parse),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self, path: &Path) -> Option<Arc<Document>> {
        let full = self.root.join(path);
        let text = match std::fs::read_to_string(&full) {
            Ok(text) => text,
            Err(e) => {
                log::trace!("no document at '{}': {e}", full.display());
                return None;
            }
        };
        let parse = (self.parse)(&text);
        Some(Arc::new(Document { text, version: 0, parse }))
    }
}

impl DocumentSource for FsSource {
    fn get_document(&self, path: &Path) -> Option<Arc<Document>> {
        if let Some(hit) = self.cache.borrow().get(path) {
            return hit.clone();
        }
        let doc = self.load(path);
        self.cache.borrow_mut().insert(path.to_path_buf(), doc.clone());
        doc
    }
}

impl std::fmt::Debug for FsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsSource")
            .field("root", &self.root)
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}
