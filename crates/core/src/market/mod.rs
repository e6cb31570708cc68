pub mod types;
pub mod yahoo;

use crate::domain::quote::{self, IndexFact, MarketIndex};
use rust_decimal::Decimal;

#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Recent daily closes for `ticker`, oldest first.
    async fn recent_closes(&self, ticker: &str) -> anyhow::Result<Vec<Decimal>>;
}

/// Fetches and normalizes every briefing index in display order. One request per index,
/// no retries; a failed index degrades to its placeholder.
pub async fn fetch_index_facts(source: &dyn MarketDataSource) -> Vec<IndexFact> {
    let mut facts = Vec::with_capacity(MarketIndex::ALL.len());
    for index in MarketIndex::ALL {
        let closes = source.recent_closes(index.ticker()).await;
        let fact = quote::normalize(index, closes);
        tracing::info!(
            provider = source.provider_name(),
            ticker = index.ticker(),
            summary = %fact.summary(),
            "index quote"
        );
        facts.push(fact);
    }
    facts
}
