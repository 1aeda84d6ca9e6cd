use crate::traits::{ConversationHandle, GenerateOptions, LlmClient, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skimmer_common::{LlmProvider, Result, SkimmerError};
use skimmer_http::{HttpClient, HttpError};
use std::time::Instant;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

#[derive(Serialize)]
pub struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesApiResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output: Vec<ResponseMessage>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl ResponsesApiResponse {
    /// Concatenation of every `output_text` part, in order.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|msg| msg.kind == "message")
            .flat_map(|msg| &msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect()
    }
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    ///
    /// Fails with [`SkimmerError::Config`] when no key is configured.
    pub fn new(api_key: Option<String>, model: String) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SkimmerError::Config(
                    "OpenAI provider selected but OPENAI_API_KEY is not set".to_string(),
                )
            })?;

        Ok(Self {
            client: http_client(OPENAI_API_BASE)?,
            api_key,
            model,
            temperature: None,
        })
    }

    /// Point the client at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.client = http_client(base_url)?;
        Ok(self)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

fn http_client(base: &str) -> Result<HttpClient> {
    HttpClient::new(base).map_err(|e| SkimmerError::Config(format!("invalid OpenAI endpoint: {e}")))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: GenerateOptions<'_>,
    ) -> Result<LlmResponse> {
        let previous = self
            .accept_handle(options.conversation)
            .and_then(ConversationHandle::response_id);

        let req = ResponsesApiRequest {
            model: &self.model,
            input: prompt,
            instructions: system_prompt,
            previous_response_id: previous,
            temperature: self.temperature,
        };

        tracing::debug!(
            target: "llm.openai",
            model = %self.model,
            prompt_len = prompt.len(),
            continued = previous.is_some(),
            "llm.openai.generate.start"
        );
        let t0 = Instant::now();

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", Some(&self.api_key), &req)
            .await
            .map_err(|e| {
                tracing::warn!(target: "llm.openai", error = %e, "llm.openai.generate.error");
                http_to_skimmer(e)
            })?;

        if let Some(status) = resp.status.as_deref().filter(|s| *s != "completed") {
            tracing::warn!(target: "llm.openai", status, id = %resp.id, "llm.openai.generate.incomplete");
        }

        tracing::info!(
            target: "llm.openai",
            model = %self.model,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            response_id = %resp.id,
            served_model = resp.model.as_deref().unwrap_or("-"),
            total_tokens = resp.usage.as_ref().and_then(|u| u.total_tokens),
            "llm.openai.generate.success"
        );

        Ok(LlmResponse {
            text: resp.output_text(),
            conversation: Some(ConversationHandle::openai(resp.id)),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }
}

fn http_to_skimmer(e: HttpError) -> SkimmerError {
    SkimmerError::Provider(format!("OpenAI request failed: {e}"))
}
