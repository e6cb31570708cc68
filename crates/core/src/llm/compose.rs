use crate::domain::illustration::{Illustration, IllustrationStyle};
use crate::domain::quote::IndexFact;
use crate::llm::{ImageGenerator, TextGenerator};
use crate::time::kr_market::TimeOfDay;
use anyhow::Context;

pub fn narrative_prompt(time_of_day: TimeOfDay, facts: &[IndexFact]) -> String {
    let figures = facts
        .iter()
        .map(|f| format!("{}: {}", f.index.prompt_name(), f.summary()))
        .collect::<Vec<_>>()
        .join(", ");

    [
        format!("현재 지수 - {figures}"),
        format!(
            "이 지수와 최신 경제 뉴스, 기업 실적, 지정학적 리스크를 바탕으로 {}를 상세히 분석해 줘.",
            time_of_day.prompt_context()
        ),
        "위 지수 수치는 그대로 인용하고, 주어지지 않은 수치나 사실은 절대 지어내지 마. N/A인 지수는 수치를 언급하지 마.".to_string(),
        "3~5개의 핵심 포인트로 정리해 줘.".to_string(),
        "각 포인트는 글머리 기호 없이 한 줄씩 작성하고, 강조할 핵심 단어 양쪽에만 별표(**)를 붙여.".to_string(),
    ]
    .join("\n")
}

pub fn headline_prompt(raw_narrative: &str) -> String {
    format!(
        "다음 요약 내용을 바탕으로 아주 짧고 강렬한 한 줄 헤드라인(15자 내외)을 만들어줘. \
특수기호나 마크다운 금지.\n\n내용: {raw_narrative}"
    )
}

pub fn illustration_prompt(style: IllustrationStyle, headline: &str) -> String {
    match style {
        IllustrationStyle::Isometric => [
            "A highly detailed, premium 3D isometric illustration for a modern financial technology blog.".to_string(),
            format!("Theme: {headline}."),
            "Style: Clean minimalist white background, soft studio lighting, glossy and sleek finish.".to_string(),
            "Elements: Neatly arranged, high-end 3D icons such as a glowing server, a rising green chart, a sleek rocket, and gold coins.".to_string(),
            "Layout: Very spacious, modern, and uncluttered.".to_string(),
            "Crucially: DO NOT write any text, words, or numbers. Purely visual 3D objects only.".to_string(),
        ]
        .join("\n"),
        IllustrationStyle::Comic => [
            "A vibrant 4-panel comic strip in a 2x2 grid about today's stock market.".to_string(),
            format!("Story theme: {headline}."),
            "Characters: a cheerful investor and a worried investor reacting to market screens.".to_string(),
            "Speech bubbles: only short English exclamations or emoji such as \"Wow!\", \"Oh no!\", \"To the moon!\", \"🚀\", \"📉\".".to_string(),
            "Crucially: no full sentences and no numbers anywhere in the image.".to_string(),
            "Style: bold outlines, flat bright colors, clean panel borders.".to_string(),
        ]
        .join("\n"),
    }
}

/// Asks the text service for the market narrative. Any failure is fatal for the run.
pub async fn compose_narrative(
    text: &dyn TextGenerator,
    time_of_day: TimeOfDay,
    facts: &[IndexFact],
) -> anyhow::Result<String> {
    let prompt = narrative_prompt(time_of_day, facts);
    let raw = text
        .complete(&prompt)
        .await
        .context("narrative generation failed")?;
    anyhow::ensure!(!raw.trim().is_empty(), "narrative generation returned empty text");

    tracing::info!(provider = ?text.provider(), chars = raw.chars().count(), "narrative composed");
    Ok(raw.trim().to_string())
}

/// Compresses the narrative into a one-line headline. Any failure is fatal for the run.
pub async fn extract_headline(text: &dyn TextGenerator, raw_narrative: &str) -> anyhow::Result<String> {
    let headline = text
        .complete(&headline_prompt(raw_narrative))
        .await
        .context("headline generation failed")?;
    let headline = headline.trim().to_string();
    anyhow::ensure!(!headline.is_empty(), "headline generation returned empty text");

    tracing::info!(%headline, "headline extracted");
    Ok(headline)
}

/// Renders and downloads the cover image. Any failure is fatal for the run.
pub async fn request_illustration(
    images: &dyn ImageGenerator,
    style: IllustrationStyle,
    headline: &str,
) -> anyhow::Result<Illustration> {
    let remote_url = images
        .generate_image(&illustration_prompt(style, headline))
        .await
        .context("image generation failed")?;
    let bytes = images
        .download(&remote_url)
        .await
        .context("image download failed")?;

    tracing::info!(?style, bytes = bytes.len(), "illustration fetched");
    Ok(Illustration { remote_url, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::{normalize, MarketIndex};
    use crate::llm::Provider;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct ScriptedText {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl TextGenerator for ScriptedText {
        fn provider(&self) -> Provider {
            Provider::OpenAI
        }

        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("service down"))
        }
    }

    fn facts() -> Vec<IndexFact> {
        vec![
            normalize(MarketIndex::Kospi, Ok(vec![dec!(2630.10), dec!(2650.55)])),
            IndexFact::unavailable(MarketIndex::Kosdaq),
        ]
    }

    #[test]
    fn narrative_prompt_embeds_facts_and_edition_context() {
        let prompt = narrative_prompt(TimeOfDay::Morning, &facts());
        assert!(prompt.contains("코스피: 2,650.55 ▲ 20.45 (+0.78%)"));
        assert!(prompt.contains("코스닥: N/A"));
        assert!(prompt.contains(TimeOfDay::Morning.prompt_context()));
        assert!(prompt.contains("절대 지어내지 마"));
        assert!(prompt.contains("별표(**)"));

        let evening = narrative_prompt(TimeOfDay::Evening, &facts());
        assert!(evening.contains(TimeOfDay::Evening.prompt_context()));
    }

    #[test]
    fn headline_prompt_forbids_markup() {
        let prompt = headline_prompt("**코스피** 상승");
        assert!(prompt.contains("15자 내외"));
        assert!(prompt.contains("마크다운 금지"));
        assert!(prompt.ends_with("내용: **코스피** 상승"));
    }

    #[test]
    fn illustration_styles_carry_theme() {
        let iso = illustration_prompt(IllustrationStyle::Isometric, "반도체 랠리");
        assert!(iso.contains("isometric"));
        assert!(iso.contains("Theme: 반도체 랠리."));

        let comic = illustration_prompt(IllustrationStyle::Comic, "반도체 랠리");
        assert!(comic.contains("2x2"));
        assert!(comic.contains("no full sentences"));
    }

    #[tokio::test]
    async fn narrative_then_headline_use_two_requests() {
        let text = ScriptedText {
            reply: Some("  - **코스피** 상승\n"),
            prompts: Mutex::new(Vec::new()),
        };

        let raw = compose_narrative(&text, TimeOfDay::Evening, &facts()).await.unwrap();
        assert_eq!(raw, "- **코스피** 상승");
        let headline = extract_headline(&text, &raw).await.unwrap();
        assert_eq!(headline, "- **코스피** 상승");

        let prompts = text.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains(&raw));
    }

    #[tokio::test]
    async fn service_error_propagates() {
        let text = ScriptedText {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        };
        let err = compose_narrative(&text, TimeOfDay::Morning, &facts())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("service down"));
    }

    #[tokio::test]
    async fn blank_completion_is_rejected() {
        let text = ScriptedText {
            reply: Some("   \n"),
            prompts: Mutex::new(Vec::new()),
        };
        assert!(extract_headline(&text, "narrative").await.is_err());
    }
}
