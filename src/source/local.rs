use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{ChapterSource, SourceError};
use crate::catalog::{EntryKind, TreeEntry};

/// Reads a checked-out novel repository from a local directory.
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a repository-relative path onto the root, refusing anything
    /// that could leave it.
    fn resolve(&self, path: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(path);
        let plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(SourceError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ChapterSource for LocalSource {
    async fn list(&self) -> Result<Vec<TreeEntry>, SourceError> {
        let root = self.root.clone();
        // Walk on the blocking pool to keep the runtime responsive.
        tokio::task::spawn_blocking(move || collect_entries(&root))
            .await
            .map_err(|e| SourceError::Internal(e.to_string()))?
    }

    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let full_path = self.resolve(path)?;
        debug!("Reading {}", full_path.display());
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|source| SourceError::Io {
                path: full_path,
                source,
            })
    }
}

/// Walk the directory and describe every file and folder below it.
/// Hidden entries (`.git`, `.obsidian`, ...) are skipped.
fn collect_entries(root: &Path) -> Result<Vec<TreeEntry>, SourceError> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        let file_type = entry.file_type();
        let (kind, size) = if file_type.is_file() {
            (EntryKind::Blob, entry.metadata().ok().map(|m| m.len()))
        } else if file_type.is_dir() {
            (EntryKind::Tree, None)
        } else {
            (EntryKind::Other, None)
        };
        entries.push(TreeEntry {
            path: rel_path(root, entry.path()),
            kind,
            size,
        });
    }
    Ok(entries)
}

/// Repository-style relative path: `/`-separated on every platform.
fn rel_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
