use crate::config::Settings;
use crate::domain::narrative::Narrative;
use crate::domain::quote::IndexFact;
use crate::render::markup::strip_emphasis;
use crate::time::kr_market::Edition;
use anyhow::Context;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const OPEN_PAGE_TITLE: &str = "📊 웹페이지에서 보기";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Disabled,
    Delivered,
    Failed,
}

/// Posts the briefing card to a Teams incoming webhook. Best-effort: never retries and never
/// returns an error.
#[derive(Debug, Clone)]
pub struct TeamsNotifier {
    http: reqwest::Client,
    webhook_url: Option<String>,
    public_page_url: Option<String>,
}

impl TeamsNotifier {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build webhook http client")?;

        Ok(Self {
            http,
            webhook_url: settings.teams_webhook_url.clone(),
            public_page_url: settings.public_page_url.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub async fn notify(
        &self,
        edition: &Edition,
        image_url: &str,
        narrative: &Narrative,
        facts: &[IndexFact],
    ) -> DeliveryOutcome {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            tracing::debug!("TEAMS_WEBHOOK_URL not set; skipping notification");
            return DeliveryOutcome::Disabled;
        };

        let payload = build_card(
            edition,
            image_url,
            narrative,
            facts,
            self.public_page_url.as_deref(),
        );

        match self.http.post(webhook_url).json(&payload).send().await {
            Ok(res) if res.status().is_success() => {
                tracing::info!(status = %res.status(), "briefing card posted");
                DeliveryOutcome::Delivered
            }
            Ok(res) => {
                tracing::warn!(status = %res.status(), "webhook rejected briefing card; ignoring");
                DeliveryOutcome::Failed
            }
            Err(err) => {
                tracing::warn!(error = %err, "webhook post failed; ignoring");
                DeliveryOutcome::Failed
            }
        }
    }
}

/// Adaptive Card 1.2 wrapped in the Teams `message` envelope.
pub fn build_card(
    edition: &Edition,
    image_url: &str,
    narrative: &Narrative,
    facts: &[IndexFact],
    public_page_url: Option<&str>,
) -> Value {
    let fact_set: Vec<Value> = facts
        .iter()
        .map(|f| json!({"title": f.name(), "value": f.summary()}))
        .collect();

    let actions: Vec<Value> = public_page_url
        .map(|url| {
            json!({
                "type": "Action.OpenUrl",
                "title": OPEN_PAGE_TITLE,
                "url": url,
            })
        })
        .into_iter()
        .collect();

    json!({
        "type": "message",
        "attachments": [{
            "contentType": "application/vnd.microsoft.card.adaptive",
            "content": {
                "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
                "type": "AdaptiveCard",
                "version": "1.2",
                "body": [
                    {
                        "type": "TextBlock",
                        "text": format!("🚨 {}", edition.title),
                        "weight": "Bolder",
                        "size": "Medium",
                        "color": "Accent"
                    },
                    {
                        "type": "Image",
                        "url": image_url,
                        "size": "Stretch"
                    },
                    {
                        "type": "TextBlock",
                        "text": format!("🔥 {} 🔥", narrative.headline),
                        "weight": "Bolder",
                        "size": "Large",
                        "wrap": true,
                        "horizontalAlignment": "Center"
                    },
                    {
                        "type": "FactSet",
                        "facts": fact_set
                    },
                    {
                        "type": "TextBlock",
                        "text": strip_emphasis(&narrative.raw_text),
                        "wrap": true,
                        "separator": true
                    }
                ],
                "actions": actions
            }
        }]
    })
}
