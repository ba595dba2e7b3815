use std::fmt::Write as _;

use futures::{StreamExt, stream};
use serde::Serialize;
use tracing::warn;

use crate::ordering::folder_of;
use crate::reader::{Library, count_words};
use crate::source::ChapterSource;
use crate::title::extract_title;

#[derive(Debug, Clone, Serialize)]
pub struct ChapterStat {
    pub path: String,
    pub title: String,
    pub words: usize,
    pub short: bool,
}

/// Word counts for a set of chapters, shortest first.
#[derive(Debug, Default, Serialize)]
pub struct StatsReport {
    pub threshold: usize,
    pub chapters: Vec<ChapterStat>,
    /// Paths that could not be fetched.
    pub failed: Vec<String>,
}

impl StatsReport {
    pub fn short_chapters(&self) -> impl Iterator<Item = &ChapterStat> {
        self.chapters.iter().filter(|c| c.short)
    }

    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(|c| c.words).sum()
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<50} | {:>8} |", "Chapter", "Words");
        let _ = writeln!(out, "{}", "-".repeat(64));
        for chapter in &self.chapters {
            let marker = if chapter.short { " *" } else { "" };
            let _ = writeln!(out, "{:<50} | {:>8} |{marker}", chapter.path, chapter.words);
        }
        let _ = writeln!(out, "{}", "-".repeat(64));
        let _ = writeln!(
            out,
            "{} chapters, {} words, {} below {} (*), {} failed",
            self.chapters.len(),
            self.total_words(),
            self.short_chapters().count(),
            self.threshold,
            self.failed.len()
        );
        out
    }
}

/// Fetch every catalog chapter (optionally only those whose folder
/// contains `folder_filter`) and count its words.
///
/// Fetch failures are recorded in [`StatsReport::failed`] and do not
/// abort the run.
pub async fn collect_stats<S: ChapterSource>(
    library: &Library<S>,
    threshold: usize,
    folder_filter: Option<&str>,
    concurrency: usize,
) -> StatsReport {
    let targets: Vec<(String, String)> = {
        let catalog = library.catalog().await;
        catalog
            .entries()
            .iter()
            .filter(|e| folder_filter.is_none_or(|f| folder_of(&e.path).contains(f)))
            .map(|e| (e.path.clone(), e.title.clone()))
            .collect()
    };

    let results: Vec<_> = stream::iter(targets)
        .map(|(path, title)| async move {
            let result = library.source().fetch(&path).await;
            (path, title, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = StatsReport {
        threshold,
        ..StatsReport::default()
    };
    for (path, title, result) in results {
        match result {
            Ok(text) => {
                let words = count_words(&text);
                let title = extract_title(&text).map_or(title, str::to_string);
                report.chapters.push(ChapterStat {
                    path,
                    title,
                    words,
                    short: words < threshold,
                });
            }
            Err(e) => {
                warn!("Failed to count {path}: {e}");
                report.failed.push(path);
            }
        }
    }
    // Stable: equal counts stay in reading order.
    report.chapters.sort_by_key(|c| c.words);
    report
}
