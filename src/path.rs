//! Logical module paths and their mapping onto document paths.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::document::{Document, DocumentSource};

/// A language-level module identifier such as `geometry.shapes.Circle`.
/// Always has at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LogicalPath(Vec<String>);

impl LogicalPath {
    pub fn new<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            None
        } else {
            Some(Self(segments))
        }
    }

    /// Parse the dotted form `a.b.c`.
    pub fn parse(dotted: &str) -> Option<Self> {
        Self::new(dotted.split('.'))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The final segment; also the name of the class the module declares.
    pub fn last(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    /// Segments of the enclosing directory (possibly empty).
    pub fn dir(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl TryFrom<Vec<String>> for LogicalPath {
    type Error = String;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        LogicalPath::new(segments).ok_or_else(|| "logical path needs non-empty segments".to_string())
    }
}

impl From<LogicalPath> for Vec<String> {
    fn from(path: LogicalPath) -> Self {
        path.0
    }
}

/// A path written relative to the importing module's directory.
/// `ups` counts parent hops before `path` is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativePath {
    pub ups: usize,
    pub path: LogicalPath,
}

impl RelativePath {
    pub fn new(ups: usize, path: LogicalPath) -> Self {
        Self { ups, path }
    }

    /// Resolve against the directory segments of the importing module.
    /// Returns `None` when the directory has fewer than `ups` segments.
    pub fn resolve(&self, base_dir: &[String]) -> Option<LogicalPath> {
        if base_dir.len() < self.ups {
            return None;
        }
        let mut segments = base_dir[..base_dir.len() - self.ups].to_vec();
        segments.extend(self.path.segments().iter().cloned());
        Some(LogicalPath(segments))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.ups {
            write!(f, "^.")?;
        }
        write!(f, "{}", self.path)
    }
}

/// Document paths to try for `path`, in priority order:
/// the regular file `a/b/c.ext`, then the directory entry `a/b/c/main.ext`.
pub fn candidates(path: &LogicalPath, config: &ResolverConfig) -> [PathBuf; 2] {
    let mut regular: PathBuf = path.dir().iter().collect();
    regular.push(format!("{}.{}", path.last(), config.extension));

    let mut directory: PathBuf = path.segments().iter().collect();
    directory.push(format!("{}.{}", config.main_file, config.extension));

    [regular, directory]
}

/// Fetch the document for `path`, trying each candidate in order.
/// On failure every attempted document path is returned.
pub fn resolve_document(
    path: &LogicalPath,
    source: &dyn DocumentSource,
    config: &ResolverConfig,
) -> Result<(PathBuf, Arc<Document>), Vec<PathBuf>> {
    let tried = candidates(path, config);
    for candidate in &tried {
        if let Some(doc) = source.get_document(candidate) {
            log::trace!("resolved {path} -> {}", candidate.display());
            return Ok((candidate.clone(), doc));
        }
    }
    Err(tried.to_vec())
}
