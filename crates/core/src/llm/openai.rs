use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{ImageGenerator, Provider, TextGenerator};
use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_ai_api_key()?.to_string();
        let base_url = settings
            .openai_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let text_model = settings
            .openai_text_model
            .clone()
            .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string());
        let image_model = settings
            .openai_image_model
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
        let timeout_secs = settings.openai_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            text_model,
            image_model,
        })
    }

    async fn post_json<Req: Serialize, Res: DeserializeOwned>(
        &self,
        path: &str,
        stage: &'static str,
        req: &Req,
    ) -> anyhow::Result<Res> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .with_context(|| format!("OpenAI {stage} request failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            return Err(LlmDiagnosticsError::http(Provider::OpenAI, stage, status, text).into());
        }

        serde_json::from_str::<Res>(&text)
            .with_context(|| format!("failed to decode OpenAI {stage} response: {text}"))
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let req = ChatCompletionRequest {
            model: &self.text_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let res: ChatCompletionResponse = self
            .post_json("/v1/chat/completions", "chat_completion", &req)
            .await?;
        let content = res
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("OpenAI chat completion returned no content")?;
        Ok(content.trim().to_string())
    }
}

#[async_trait::async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate_image(&self, prompt: &str) -> anyhow::Result<String> {
        let req = ImageGenerationRequest {
            model: &self.image_model,
            prompt,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            n: 1,
        };

        let res: ImageGenerationResponse = self
            .post_json("/v1/images/generations", "image_generation", &req)
            .await?;
        res.data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .context("OpenAI image generation returned no url")
    }

    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .context("image download request failed")?;
        let status = res.status();
        anyhow::ensure!(status.is_success(), "image download HTTP {status}");

        let bytes = res.bytes().await.context("failed to read image bytes")?;
        anyhow::ensure!(!bytes.is_empty(), "image download returned an empty body");
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'static str,
    quality: &'static str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> OpenAiClient {
        let settings = Settings {
            ai_api_key: Some("sk-test".to_string()),
            openai_base_url: Some(server.url()),
            ..Settings::default()
        };
        OpenAiClient::from_settings(&settings).unwrap()
    }

    #[test]
    fn requires_api_key() {
        assert!(OpenAiClient::from_settings(&Settings::default()).is_err());
    }

    #[tokio::test]
    async fn completes_chat_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "  반도체가 끌어올린 코스피 \n"}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let out = client_for(&server).complete("headline please").await.unwrap();
        mock.assert_async().await;
        assert_eq!(out, "반도체가 끌어올린 코스피");
    }

    #[tokio::test]
    async fn non_success_carries_diagnostics() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(json!({"error": {"message": "rate limited"}}).to_string())
            .create_async()
            .await;

        let err = client_for(&server).complete("x").await.unwrap_err();
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.provider, Provider::OpenAI);
        assert_eq!(diag.stage, "chat_completion");
        assert!(diag.raw_response_json.is_some());
    }

    #[tokio::test]
    async fn generates_and_downloads_image() {
        let mut server = mockito::Server::new_async().await;
        let image_url = format!("{}/files/cover.png", server.url());
        let gen = server
            .mock("POST", "/v1/images/generations")
            .match_body(Matcher::PartialJson(
                json!({"size": "1024x1024", "quality": "standard", "n": 1}),
            ))
            .with_status(200)
            .with_body(json!({"data": [{"url": image_url}]}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/files/cover.png")
            .with_status(200)
            .with_body(vec![0x89, b'P', b'N', b'G'])
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.generate_image("a rocket").await.unwrap();
        gen.assert_async().await;
        assert_eq!(url, image_url);

        let bytes = client.download(&url).await.unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }
}
