pub mod markup;

use crate::domain::narrative::Narrative;
use crate::domain::quote::IndexFact;
use crate::time::kr_market::Edition;
use anyhow::Context;
use askama::Template;

pub const PAGE_FILE: &str = "index.html";
pub const COVER_FILE: &str = "cover.png";

#[derive(Debug, Clone)]
struct FactRow {
    name: &'static str,
    price: String,
    change: String,
    color: &'static str,
    trend: &'static str,
}

impl From<&IndexFact> for FactRow {
    fn from(fact: &IndexFact) -> Self {
        Self {
            name: fact.name(),
            price: fact.price_display(),
            change: fact.change_display(),
            color: fact.color(),
            trend: fact.trend_label(),
        }
    }
}

#[derive(Template)]
#[template(path = "briefing.html")]
struct BriefingPage<'a> {
    edition_title: &'a str,
    generated_at: String,
    headline: &'a str,
    cover_file: &'a str,
    facts: Vec<FactRow>,
    summary_lines: &'a [String],
}

/// Renders the full briefing document. The cover image is referenced by its file name
/// relative to the page.
pub fn render_page(
    edition: &Edition,
    facts: &[IndexFact],
    narrative: &Narrative,
    cover_file: &str,
) -> anyhow::Result<String> {
    let page = BriefingPage {
        edition_title: edition.title,
        generated_at: edition.generated_at_display(),
        headline: &narrative.headline,
        cover_file,
        facts: facts.iter().map(FactRow::from).collect(),
        summary_lines: &narrative.summary_lines,
    };
    page.render().context("failed to render briefing page")
}

mod filters {
    /// `{{ line|e|bold|safe }}`: strong-emphasis spans for `**marked**` terms.
    pub fn bold<T: std::fmt::Display>(s: T) -> ::askama::Result<String> {
        Ok(super::markup::render_emphasis(&s.to_string()))
    }
}
