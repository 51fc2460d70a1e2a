//! Mapping request paths onto the serving root.

use std::path::{Path, PathBuf};

/// What a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// An existing directory.
    Directory,
    /// Anything else that exists.
    File,
    /// Nothing could be stat'ed at the path (missing, or unreadable).
    Missing,
}

/// Joins request paths under a fixed serving root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given serving root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The serving root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a slash-separated request path under the root.
    ///
    /// Empty and `.` segments are skipped. Returns `None` when a `..`
    /// segment would step outside the root.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();

        for segment in request_path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') || Path::new(s).is_absolute() => return None,
                s => resolved.push(s),
            }
        }

        Some(resolved)
    }

    /// Classify a resolved path from filesystem metadata.
    ///
    /// Any stat error counts as [`PathKind::Missing`]; callers that need
    /// to tell "unreadable" from "absent" must check again.
    pub async fn classify(path: &Path) -> PathKind {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => PathKind::Directory,
            Ok(_) => PathKind::File,
            Err(_) => PathKind::Missing,
        }
    }
}
