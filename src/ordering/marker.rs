use std::sync::LazyLock;

use regex::Regex;

use super::numeral::parse_numeral;

static CHAPTER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"第([0-9零〇一二三四五六七八九十兩两百千]+)章").expect("chapter marker pattern")
});

static VOLUME_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"第([0-9零〇一二三四五六七八九十兩两百千]+)卷|^卷([0-9零〇一二三四五六七八九十兩两百千]+)")
        .expect("volume marker pattern")
});

/// Sort key derived from a chapter or volume marker.
///
/// Every `Ordinal` sorts before `Unordered`, so names without a usable
/// marker sink to the end of their scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderKey {
    Ordinal(u64),
    Unordered,
}

/// Which marker to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `第<n>章` in a file name.
    Chapter,
    /// `第<n>卷`, or a name starting with `卷<n>`, in a folder name.
    Volume,
}

/// Last `/`-separated segment of a path.
pub fn last_segment(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, tail)| tail)
}

/// Find the first marker of `kind` in the last segment of `name` and
/// return its numeral as an [`OrderKey`].
///
/// A missing marker and an unparseable numeral both yield
/// [`OrderKey::Unordered`].
pub fn extract_order(name: &str, kind: MarkerKind) -> OrderKey {
    let segment = last_segment(name);
    let pattern = match kind {
        MarkerKind::Chapter => &*CHAPTER_MARKER,
        MarkerKind::Volume => &*VOLUME_MARKER,
    };

    pattern
        .captures(segment)
        .and_then(|caps| caps.iter().skip(1).flatten().next())
        .and_then(|numeral| parse_numeral(numeral.as_str()))
        .map_or(OrderKey::Unordered, OrderKey::Ordinal)
}
