pub mod render;
pub mod session;

use futures::{StreamExt, stream};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogRules};
use crate::source::{ChapterSource, SourceError};
use crate::title::refine_title;

pub use render::{count_words, render_markdown};
pub use session::{ReadingSession, Ticket};

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("chapter not in catalog: {0}")]
    NotInCatalog(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A fetched and rendered chapter.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub index: usize,
    pub path: String,
    pub title: String,
    pub html: String,
    pub word_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Outcome of a title prefetch pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrefetchReport {
    pub resolved: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Owns a source and the catalog built from it.
///
/// The catalog order is fixed per build; fetching chapters only ever
/// updates titles in place.
pub struct Library<S> {
    source: S,
    rules: CatalogRules,
    catalog: RwLock<Catalog>,
}

impl<S: ChapterSource> Library<S> {
    /// List the source and build the catalog.
    pub async fn load(source: S, rules: CatalogRules) -> Result<Self, SourceError> {
        let listing = source.list().await?;
        let catalog = Catalog::build(listing, &rules);
        info!("Catalog loaded: {} chapters", catalog.len());
        Ok(Self {
            source,
            rules,
            catalog: RwLock::new(catalog),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().await
    }

    /// Path of the entry at `index`.
    pub async fn path_at(&self, index: usize) -> Option<String> {
        self.catalog.read().await.get(index).map(|e| e.path.clone())
    }

    /// Rebuild the catalog from a fresh listing, keeping titles already
    /// resolved for paths that are still present.
    pub async fn refresh(&self) -> Result<usize, SourceError> {
        let listing = self.source.list().await?;
        let mut fresh = Catalog::build(listing, &self.rules);
        let mut catalog = self.catalog.write().await;
        fresh.carry_titles_from(&catalog);
        *catalog = fresh;
        info!("Catalog refreshed: {} chapters", catalog.len());
        Ok(catalog.len())
    }

    /// Fetch a chapter, refine its catalog title from the text, and
    /// render it. A failed fetch leaves the title as it was.
    pub async fn load_chapter(&self, path: &str) -> Result<Chapter, ReaderError> {
        if !self.catalog.read().await.contains(path) {
            return Err(ReaderError::NotInCatalog(path.to_string()));
        }

        let text = self.source.fetch(path).await.map_err(|e| {
            warn!("Failed to fetch chapter {path}: {e}");
            e
        })?;
        let html = render_markdown(&text);
        let word_count = count_words(&text);

        let mut catalog = self.catalog.write().await;
        // A refresh may have dropped the path while we were fetching.
        let index = catalog
            .position(path)
            .ok_or_else(|| ReaderError::NotInCatalog(path.to_string()))?;
        let total = catalog.len();
        let title = match catalog.entry_mut(path) {
            Some(entry) => {
                refine_title(entry, &text);
                entry.title.clone()
            }
            None => return Err(ReaderError::NotInCatalog(path.to_string())),
        };
        debug!("Loaded chapter {index} ({path}): {word_count} characters");

        Ok(Chapter {
            index,
            path: path.to_string(),
            title,
            html,
            word_count,
            has_prev: index > 0,
            has_next: index + 1 < total,
        })
    }

    /// Load the chapter following `after`; `None` at the end of the
    /// catalog.
    pub async fn next_chapter(&self, after: &str) -> Result<Option<Chapter>, ReaderError> {
        let next_path = {
            let catalog = self.catalog.read().await;
            let index = catalog
                .position(after)
                .ok_or_else(|| ReaderError::NotInCatalog(after.to_string()))?;
            catalog
                .next_index(index)
                .and_then(|i| catalog.get(i))
                .map(|e| e.path.clone())
        };
        match next_path {
            Some(path) => self.load_chapter(&path).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetch every chapter whose title is unresolved and take its
    /// heading as the title.
    ///
    /// Runs up to `concurrency` fetches at once. Failures are logged
    /// and counted; they never stop the rest of the batch.
    pub async fn prefetch_titles(&self, concurrency: usize) -> PrefetchReport {
        let (pending, total) = {
            let catalog = self.catalog.read().await;
            (catalog.unresolved_paths(), catalog.len())
        };
        let mut report = PrefetchReport {
            skipped: total - pending.len(),
            ..PrefetchReport::default()
        };

        let results: Vec<(String, Result<String, SourceError>)> = stream::iter(pending)
            .map(|path| async move {
                let result = self.source.fetch(&path).await;
                (path, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut catalog = self.catalog.write().await;
        for (path, result) in results {
            match result {
                Ok(text) => {
                    if let Some(entry) = catalog.entry_mut(&path) {
                        refine_title(entry, &text);
                        report.resolved += 1;
                    }
                }
                Err(e) => {
                    warn!("Title prefetch failed for {path}: {e}");
                    report.failed += 1;
                }
            }
        }

        info!(
            "Title prefetch finished: resolved={}, failed={}, skipped={}",
            report.resolved, report.failed, report.skipped
        );
        report
    }
}
