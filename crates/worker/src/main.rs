use anyhow::Context;
use briefing_core::llm::{anthropic::AnthropicClient, openai::OpenAiClient, Provider, TextGenerator};
use briefing_core::market::yahoo::YahooChartClient;
use briefing_core::notify::teams::TeamsNotifier;
use briefing_core::pipeline::{Collaborators, RunOptions};
use briefing_core::time::kr_market::TimeOfDay;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "briefing_worker")]
struct Args {
    /// Edition to publish (morning|evening). Defaults to the KST clock: before noon is morning.
    #[arg(long)]
    edition: Option<TimeOfDay>,

    /// Directory receiving index.html and cover.png. Overrides BRIEFING_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Call every service and render, but write nothing and skip the webhook.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = briefing_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(&settings, args).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "briefing run failed; previous output left in place");
    }
    result
}

async fn run(settings: &briefing_core::config::Settings, args: Args) -> anyhow::Result<()> {
    let edition = briefing_core::time::kr_market::resolve_edition(args.edition, chrono::Utc::now())?;

    let market = YahooChartClient::from_settings(settings)?;
    let openai = OpenAiClient::from_settings(settings)?;
    let anthropic = match settings.text_provider {
        Provider::Anthropic => Some(AnthropicClient::from_settings(settings)?),
        Provider::OpenAI => None,
    };
    let text: &dyn TextGenerator = match &anthropic {
        Some(client) => client,
        None => &openai,
    };
    let notifier = TeamsNotifier::from_settings(settings)?;
    if !notifier.is_enabled() {
        tracing::info!("TEAMS_WEBHOOK_URL not set; notification disabled");
    }

    let collaborators = Collaborators {
        market: &market,
        text,
        images: &openai,
        notifier: &notifier,
    };
    let opts = RunOptions {
        output_dir: args
            .output_dir
            .unwrap_or_else(|| settings.output_dir.clone()),
        illustration_style: settings.illustration_style,
        dry_run: args.dry_run,
    };

    let report = briefing_core::pipeline::run_briefing(&collaborators, edition, &opts)
        .await
        .context("briefing pipeline aborted")?;

    tracing::info!(
        edition = report.document.edition.title,
        headline = %report.document.narrative.headline,
        committed = report.committed.is_some(),
        delivery = ?report.delivery,
        "briefing run finished"
    );
    Ok(())
}

fn init_sentry(settings: &briefing_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
