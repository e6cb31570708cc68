use regex::Regex;
use std::sync::LazyLock;

// One-or-more markers, non-marker text, one-or-more markers.
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*+([^*]+?)\*+").expect("emphasis pattern is valid"));

static MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*+").expect("marker pattern is valid"));

/// Converts `**word**` (or `*word*`) into `<strong>word</strong>`. Unmatched or empty marker
/// runs pass through unchanged.
pub fn render_emphasis(text: &str) -> String {
    EMPHASIS
        .replace_all(text, "<strong>${1}</strong>")
        .into_owned()
}

/// Removes every emphasis marker, for plain-text surfaces.
pub fn strip_emphasis(text: &str) -> String {
    MARKERS.replace_all(text, "").into_owned()
}
