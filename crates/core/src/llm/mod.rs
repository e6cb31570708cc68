pub mod anthropic;
pub mod compose;
pub mod error;
pub mod openai;

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => anyhow::bail!("unknown text provider: {other} (expected openai|anthropic)"),
        }
    }
}

/// Single prompt in, single completion out.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Renders one image for `prompt` and returns its retrievable address.
    async fn generate_image(&self, prompt: &str) -> anyhow::Result<String>;

    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}
