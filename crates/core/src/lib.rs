pub mod domain;
pub mod llm;
pub mod market;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod storage;
pub mod time;

pub mod config {
    use crate::domain::illustration::IllustrationStyle;
    use crate::llm::Provider;
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_OUTPUT_DIR: &str = "public";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub ai_api_key: Option<String>,
        pub teams_webhook_url: Option<String>,
        pub public_page_url: Option<String>,
        pub output_dir: PathBuf,
        pub illustration_style: IllustrationStyle,
        pub text_provider: Provider,
        pub openai_base_url: Option<String>,
        pub openai_text_model: Option<String>,
        pub openai_image_model: Option<String>,
        pub openai_timeout_secs: Option<u64>,
        pub anthropic_api_key: Option<String>,
        pub anthropic_base_url: Option<String>,
        pub anthropic_model: Option<String>,
        pub anthropic_max_tokens: Option<u32>,
        pub market_data_base_url: Option<String>,
        pub market_data_timeout_secs: Option<u64>,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                ai_api_key: None,
                teams_webhook_url: None,
                public_page_url: None,
                output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
                illustration_style: IllustrationStyle::default(),
                text_provider: Provider::OpenAI,
                openai_base_url: None,
                openai_text_model: None,
                openai_image_model: None,
                openai_timeout_secs: None,
                anthropic_api_key: None,
                anthropic_base_url: None,
                anthropic_model: None,
                anthropic_max_tokens: None,
                market_data_base_url: None,
                market_data_timeout_secs: None,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let illustration_style = match non_empty_var("BRIEFING_ILLUSTRATION_STYLE") {
                Some(s) => s.parse()?,
                None => IllustrationStyle::default(),
            };
            let text_provider = match non_empty_var("BRIEFING_TEXT_PROVIDER") {
                Some(s) => s.parse()?,
                None => Provider::OpenAI,
            };

            Ok(Self {
                ai_api_key: non_empty_var("AI_API_KEY"),
                teams_webhook_url: non_empty_var("TEAMS_WEBHOOK_URL"),
                public_page_url: non_empty_var("BRIEFING_PUBLIC_URL"),
                output_dir: non_empty_var("BRIEFING_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
                illustration_style,
                text_provider,
                openai_base_url: non_empty_var("OPENAI_BASE_URL"),
                openai_text_model: non_empty_var("OPENAI_TEXT_MODEL"),
                openai_image_model: non_empty_var("OPENAI_IMAGE_MODEL"),
                openai_timeout_secs: parsed_var("OPENAI_TIMEOUT_SECS"),
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL"),
                anthropic_model: non_empty_var("ANTHROPIC_MODEL"),
                anthropic_max_tokens: parsed_var("ANTHROPIC_MAX_TOKENS"),
                market_data_base_url: non_empty_var("MARKET_DATA_BASE_URL"),
                market_data_timeout_secs: parsed_var("MARKET_DATA_TIMEOUT_SECS"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_ai_api_key(&self) -> anyhow::Result<&str> {
            self.ai_api_key.as_deref().context("AI_API_KEY is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
        non_empty_var(key).and_then(|s| s.parse::<T>().ok())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn default_settings_write_to_public_dir() {
            let settings = Settings::default();
            assert_eq!(settings.output_dir, PathBuf::from("public"));
            assert!(settings.teams_webhook_url.is_none());
            assert!(settings.require_ai_api_key().is_err());
        }
    }
}
