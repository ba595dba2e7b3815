use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::FileEntry;
use crate::ordering::last_segment;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[^\S\r\n]+(.+)$").expect("heading pattern"));

/// Title shown before a chapter has been fetched: the file name
/// without its extension.
pub fn fallback_title(path: &str) -> String {
    let name = last_segment(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Text of the first top-level (`# `) heading in a Markdown document.
pub fn extract_title(text: &str) -> Option<&str> {
    HEADING
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|title| !title.is_empty())
}

/// Replace the entry's title with the document heading, if there is
/// one, and mark the title as resolved either way.
///
/// Returns whether the title changed.
pub fn refine_title(entry: &mut FileEntry, text: &str) -> bool {
    let changed = match extract_title(text) {
        Some(title) if title != entry.title => {
            entry.title = title.to_string();
            true
        }
        _ => false,
    };
    entry.title_resolved = true;
    changed
}
