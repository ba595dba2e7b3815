use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::CatalogConfig;
use crate::ordering::{compare_chapter_paths, folder_of, last_segment};
use crate::title::fallback_title;

/// Kind of a repository listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One entry of a repository listing, as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            size,
        }
    }
}

/// Which listing entries are chapters.
#[derive(Debug, Clone)]
pub struct CatalogRules {
    /// Lowercase extensions without the dot.
    pub extensions: Vec<String>,
    /// Full paths that are never chapters, compared case-insensitively.
    pub exclude_paths: Vec<String>,
    /// Keep only paths containing this substring.
    pub path_filter: Option<String>,
}

impl Default for CatalogRules {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            exclude_paths: vec!["README.md".to_string()],
            path_filter: None,
        }
    }
}

impl From<&CatalogConfig> for CatalogRules {
    fn from(cfg: &CatalogConfig) -> Self {
        Self {
            extensions: cfg
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_paths: cfg.exclude_paths.clone(),
            path_filter: cfg.path_filter.clone().filter(|f| !f.is_empty()),
        }
    }
}

impl CatalogRules {
    pub fn accepts(&self, entry: &TreeEntry) -> bool {
        if entry.kind != EntryKind::Blob {
            return false;
        }
        let ext = match last_segment(&entry.path).rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
            _ => return false,
        };
        if !self.extensions.contains(&ext) {
            return false;
        }
        if self
            .exclude_paths
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&entry.path))
        {
            return false;
        }
        match &self.path_filter {
            Some(filter) => entry.path.contains(filter.as_str()),
            None => true,
        }
    }
}

/// A chapter file in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Set once the title has been checked against the chapter text.
    pub title_resolved: bool,
}

impl FileEntry {
    pub fn new(path: String, size: Option<u64>) -> Self {
        Self {
            title: fallback_title(&path),
            path,
            size,
            title_resolved: false,
        }
    }
}

/// Catalog entries sharing one folder, in catalog order.
#[derive(Debug, Serialize)]
pub struct FolderGroup<'a> {
    pub folder: &'a str,
    pub entries: Vec<&'a FileEntry>,
}

/// Chapter files in reading order, unique by path.
///
/// The order is fixed when the catalog is built; title updates never
/// move an entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    entries: Vec<FileEntry>,
}

impl Catalog {
    /// Filter a listing down to chapter files and sort them into reading
    /// order. Repeated paths keep their first occurrence.
    pub fn build(listing: impl IntoIterator<Item = TreeEntry>, rules: &CatalogRules) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<FileEntry> = listing
            .into_iter()
            .filter(|entry| rules.accepts(entry))
            .filter(|entry| seen.insert(entry.path.clone()))
            .map(|entry| FileEntry::new(entry.path, entry.size))
            .collect();
        entries.sort_by(|a, b| compare_chapter_paths(&a.path, &b.path));
        Self { entries }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    pub fn entry_mut(&mut self, path: &str) -> Option<&mut FileEntry> {
        self.entries.iter_mut().find(|e| e.path == path)
    }

    pub fn next_index(&self, index: usize) -> Option<usize> {
        let next = index.checked_add(1)?;
        (next < self.entries.len()).then_some(next)
    }

    pub fn prev_index(&self, index: usize) -> Option<usize> {
        index.checked_sub(1).filter(|i| *i < self.entries.len())
    }

    /// Set a title by path and mark it resolved. Returns false if the
    /// path is not in the catalog.
    pub fn set_title(&mut self, path: &str, title: impl Into<String>) -> bool {
        match self.entry_mut(path) {
            Some(entry) => {
                entry.title = title.into();
                entry.title_resolved = true;
                true
            }
            None => false,
        }
    }

    /// Paths whose title has not been checked against their text yet.
    pub fn unresolved_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.title_resolved)
            .map(|e| e.path.clone())
            .collect()
    }

    /// Copy resolved titles from an earlier catalog for paths present in
    /// both.
    pub fn carry_titles_from(&mut self, previous: &Catalog) {
        for old in previous.entries.iter().filter(|e| e.title_resolved) {
            self.set_title(&old.path, old.title.clone());
        }
    }

    /// Entries grouped by folder, in catalog order. A non-empty `filter`
    /// keeps entries whose path or title contains it, ignoring case.
    pub fn groups(&self, filter: &str) -> Vec<FolderGroup<'_>> {
        let filter = filter.trim().to_lowercase();
        let mut groups: Vec<FolderGroup<'_>> = Vec::new();

        for entry in &self.entries {
            if !filter.is_empty()
                && !entry.path.to_lowercase().contains(&filter)
                && !entry.title.to_lowercase().contains(&filter)
            {
                continue;
            }
            let folder = folder_of(&entry.path);
            match groups.iter_mut().find(|g| g.folder == folder) {
                Some(group) => group.entries.push(entry),
                None => groups.push(FolderGroup {
                    folder,
                    entries: vec![entry],
                }),
            }
        }
        groups
    }
}
