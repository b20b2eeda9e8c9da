//! OpenAI-compatible provider client.
//!
//! Two upstream operations, both with fixed parameters: `chat/completions`
//! for text and `images/generations` for pictures. Credentials come from the
//! environment only; the client holds nothing mutable and is shared across
//! concurrent relay requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::WireMessage;
use crate::provider::{ChatProvider, GeneratedImage, ProviderError};
use crate::utils::url::{endpoint_url, normalize_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Sampling and image parameters are deliberately not configurable.
const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 1000;
const IMAGE_MODEL: &str = "dall-e-3";
const IMAGE_COUNT: u32 = 1;
const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "hd";
const IMAGE_STYLE: &str = "vivid";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: &str) -> Self {
        OpenAiClient {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url),
            api_key,
        }
    }

    /// Build a client from `OPENAI_API_KEY` and (optionally)
    /// `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            "OPENAI_API_KEY environment variable not set\n\n\
             Please set your API key before starting the relay:\n\
             export OPENAI_API_KEY=\"your-api-key-here\"\n\n\
             Optionally, you can also set a custom base URL:\n\
             export OPENAI_BASE_URL=\"https://api.openai.com/v1\""
        })?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(api_key, &base_url))
    }

    async fn post_json<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .http
            .post(endpoint_url(&self.base_url, endpoint))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }
        Ok(response)
    }
}

/// Pull the human-readable message out of an OpenAI-style error body,
/// falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.error.and_then(|detail| detail.message) {
            return message;
        }
    }
    if body.trim().is_empty() {
        "no error detail provided".to_string()
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete_chat(
        &self,
        model: &str,
        history: &[WireMessage],
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model,
            messages: history,
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };

        let response = self.post_json("chat/completions", &request).await?;
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Decode("no assistant message in completion".into()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<GeneratedImage>, ProviderError> {
        let request = ImageGenerationRequest {
            model: IMAGE_MODEL,
            prompt,
            n: IMAGE_COUNT,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            style: IMAGE_STYLE,
        };

        let response = self.post_json("images/generations", &request).await?;
        let generated: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        Ok(generated
            .data
            .into_iter()
            .filter_map(|datum| datum.url)
            .map(|url| GeneratedImage { url })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    #[test]
    fn chat_request_serializes_the_fixed_sampling_parameters() {
        let history = vec![WireMessage {
            role: Role::User,
            content: "2+2?".into(),
        }];
        let request = ChatCompletionRequest {
            model: "gpt-4o",
            messages: &history,
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn image_request_serializes_the_fixed_generation_parameters() {
        let request = ImageGenerationRequest {
            model: IMAGE_MODEL,
            prompt: "a red fox in snow",
            n: IMAGE_COUNT,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            style: IMAGE_STYLE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "dall-e-3");
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["quality"], "hd");
        assert_eq!(json["style"], "vivid");
    }

    #[test]
    fn completion_bodies_decode_to_the_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"4"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("4"));
    }

    #[test]
    fn image_bodies_decode_urls_and_tolerate_missing_data() {
        let body = r#"{"data":[{"url":"https://img.example/fox.png"},{"revised_prompt":"x"}]}"#;
        let parsed: ImageGenerationResponse = serde_json::from_str(body).unwrap();
        let urls: Vec<_> = parsed.data.into_iter().filter_map(|d| d.url).collect();
        assert_eq!(urls, vec!["https://img.example/fox.png"]);

        let empty: ImageGenerationResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.data.is_empty());
    }

    #[test]
    fn error_messages_prefer_the_structured_detail() {
        let body = r#"{"error":{"message":"model overloaded","type":"server_error"}}"#;
        assert_eq!(extract_error_message(body), "model overloaded");
        assert_eq!(extract_error_message("plain text"), "plain text");
        assert_eq!(extract_error_message(""), "no error detail provided");
    }
}
