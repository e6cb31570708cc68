use crate::domain::illustration::{Illustration, IllustrationStyle};
use crate::domain::narrative::Narrative;
use crate::domain::quote::IndexFact;
use crate::llm::compose;
use crate::llm::{ImageGenerator, TextGenerator};
use crate::market::{self, MarketDataSource};
use crate::notify::teams::{DeliveryOutcome, TeamsNotifier};
use crate::render::{self, COVER_FILE};
use crate::storage::output::{self, CommittedPaths};
use crate::time::kr_market::Edition;
use std::path::PathBuf;

pub struct Collaborators<'a> {
    pub market: &'a dyn MarketDataSource,
    pub text: &'a dyn TextGenerator,
    pub images: &'a dyn ImageGenerator,
    pub notifier: &'a TeamsNotifier,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub illustration_style: IllustrationStyle,
    /// Build everything but write no files and post nothing.
    pub dry_run: bool,
}

/// A fully assembled briefing, held in memory until it is committed.
#[derive(Debug, Clone)]
pub struct BriefingDocument {
    pub edition: Edition,
    pub facts: Vec<IndexFact>,
    pub narrative: Narrative,
    pub illustration: Illustration,
    pub page_html: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub document: BriefingDocument,
    pub committed: Option<CommittedPaths>,
    pub delivery: DeliveryOutcome,
}

/// Quotes, narrative, headline, illustration and page, with nothing written to disk. Quote
/// failures degrade; every other failure is returned.
pub async fn build_briefing(
    collaborators: &Collaborators<'_>,
    edition: Edition,
    style: IllustrationStyle,
) -> anyhow::Result<BriefingDocument> {
    let facts = market::fetch_index_facts(collaborators.market).await;

    let raw_text =
        compose::compose_narrative(collaborators.text, edition.time_of_day, &facts).await?;
    let headline = compose::extract_headline(collaborators.text, &raw_text).await?;
    let narrative = Narrative::new(raw_text, headline);

    let illustration =
        compose::request_illustration(collaborators.images, style, &narrative.headline).await?;

    let page_html = render::render_page(&edition, &facts, &narrative, COVER_FILE)?;

    Ok(BriefingDocument {
        edition,
        facts,
        narrative,
        illustration,
        page_html,
    })
}

/// One scheduled run: build in memory, commit both artifacts, then notify best-effort.
pub async fn run_briefing(
    collaborators: &Collaborators<'_>,
    edition: Edition,
    opts: &RunOptions,
) -> anyhow::Result<RunReport> {
    tracing::info!(
        edition = ?edition.time_of_day,
        generated_at = %edition.generated_at_display(),
        output_dir = %opts.output_dir.display(),
        dry_run = opts.dry_run,
        "briefing run started"
    );

    let document = build_briefing(collaborators, edition, opts.illustration_style).await?;

    if opts.dry_run {
        tracing::info!(
            page_bytes = document.page_html.len(),
            cover_bytes = document.illustration.bytes.len(),
            summary_lines = document.narrative.summary_lines.len(),
            "dry run: skipping output commit and notification"
        );
        return Ok(RunReport {
            document,
            committed: None,
            delivery: DeliveryOutcome::Disabled,
        });
    }

    let committed = output::commit_artifacts(
        &opts.output_dir,
        &document.page_html,
        &document.illustration.bytes,
    )
    .await?;
    tracing::info!(page = %committed.page.display(), cover = %committed.cover.display(), "briefing published");

    let delivery = collaborators
        .notifier
        .notify(
            &document.edition,
            &document.illustration.remote_url,
            &document.narrative,
            &document.facts,
        )
        .await;

    Ok(RunReport {
        document,
        committed: Some(committed),
        delivery,
    })
}
