use std::cmp::Ordering;

use super::marker::{MarkerKind, extract_order};
use super::natural::natural_cmp;

/// Folder label for files at the repository root.
pub const UNCATEGORIZED: &str = "未分類";

/// Directory part of a `/`-separated path, or [`UNCATEGORIZED`] for a
/// root-level file.
pub fn folder_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(UNCATEGORIZED, |(dir, _)| dir)
}

/// Reading order of two repository paths.
///
/// Paths in different folders are ordered by their folders' volume
/// markers; paths in the same folder by their chapter markers. Within
/// each scope a resolved marker sorts before an unresolved one, equal
/// markers fall through to natural string order, and the raw strings
/// decide last, so distinct paths never compare equal.
pub fn compare_chapter_paths(a: &str, b: &str) -> Ordering {
    let (folder_a, folder_b) = (folder_of(a), folder_of(b));
    if folder_a != folder_b {
        return compare_scoped(folder_a, folder_b, MarkerKind::Volume);
    }
    compare_scoped(a, b, MarkerKind::Chapter)
}

fn compare_scoped(a: &str, b: &str, kind: MarkerKind) -> Ordering {
    extract_order(a, kind)
        .cmp(&extract_order(b, kind))
        .then_with(|| natural_cmp(a, b))
        .then_with(|| a.cmp(b))
}
