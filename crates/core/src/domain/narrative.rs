#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub raw_text: String,
    pub summary_lines: Vec<String>,
    pub headline: String,
}

impl Narrative {
    pub fn new(raw_text: impl Into<String>, headline: impl Into<String>) -> Self {
        let raw_text: String = raw_text.into();
        let headline: String = headline.into();
        let raw_text = raw_text.trim().to_string();
        let summary_lines = split_summary_lines(&raw_text);
        Self {
            raw_text,
            summary_lines,
            headline: headline.trim().to_string(),
        }
    }
}

/// Splits model output into summary points: blank lines are dropped, leading bullet markers
/// and whitespace are stripped, order is preserved.
pub fn split_summary_lines(raw_text: &str) -> Vec<String> {
    raw_text
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim().trim_start_matches('-').trim_start();
    let rest = line.trim_start_matches('*');
    // A `*` run glued to a word that is closed later is emphasis, not a bullet.
    let opens_emphasis = rest.len() != line.len()
        && rest.chars().next().is_some_and(|c| !c.is_whitespace())
        && rest.contains('*');
    if opens_emphasis {
        line.trim()
    } else {
        rest.trim()
    }
}
