use crate::traits::{ConversationHandle, GenerateOptions, LlmClient, LlmResponse};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use skimmer_common::{LlmProvider, Result, SkimmerError};
use std::time::{Duration, Instant};

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaClient {
    /// Create a new client and verify server/model availability.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SkimmerError::Provider(format!("Failed to create HTTP client: {e}")))?;

        let ollama_client = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: None,
        };

        ollama_client.probe_server().await?;
        ollama_client.ensure_model_available().await?;

        Ok(ollama_client)
    }

    /// Sampling temperature sent with every call.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    async fn probe_server(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| SkimmerError::Provider(OLLAMA_CONNECTION_ERROR.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(SkimmerError::Provider(OLLAMA_CONNECTION_ERROR.to_string()))
        }
    }

    async fn ensure_model_available(&self) -> Result<()> {
        let models = self.fetch_available_models().await?;

        if !models.iter().any(|m| model_matches(m, &self.model)) {
            tracing::info!(target: "llm.ollama", model = %self.model, "llm.ollama.pull.start");
            self.pull_model(&self.model).await?;
        }

        Ok(())
    }

    async fn fetch_available_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SkimmerError::Provider(format!("Failed to fetch models: {e}")))?;

        if !resp.status().is_success() {
            return Ok(Vec::new());
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| SkimmerError::Provider(format!("Failed to parse models response: {e}")))?;

        let models = val
            .get("models")
            .and_then(|m| m.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.get("name").and_then(|n| n.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn pull_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);
        let payload = json!({
            "model": model,
            "stream": false
        });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SkimmerError::Provider(format!("Failed to pull model: {e}")))?;

        if resp.status().is_success() {
            tracing::info!(target: "llm.ollama", model, "llm.ollama.pull.success");
            Ok(())
        } else {
            Err(SkimmerError::Provider(format!(
                "Failed to pull model {model}: HTTP {}",
                resp.status()
            )))
        }
    }
}

/// `llama3.2` is listed by the server as `llama3.2:latest`.
fn model_matches(listed: &str, wanted: &str) -> bool {
    listed == wanted || (!wanted.contains(':') && listed == format!("{wanted}:latest"))
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: GenerateOptions<'_>,
    ) -> Result<LlmResponse> {
        let url = format!("{}/api/generate", self.base_url);

        let mut model_options = serde_json::Map::new();
        if let Some(temp) = self.temperature {
            model_options.insert("temperature".to_string(), json!(temp));
        }

        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": model_options
        });
        if let Some(system) = system_prompt {
            payload["system"] = json!(system);
        }
        let continued = self
            .accept_handle(options.conversation)
            .and_then(ConversationHandle::context);
        if let Some(context) = continued {
            payload["context"] = json!(context);
        }

        tracing::debug!(
            target: "llm.ollama",
            model = %self.model,
            prompt_len = prompt.len(),
            continued = continued.is_some(),
            "llm.ollama.generate.start"
        );
        let t0 = Instant::now();

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SkimmerError::Provider(format!("Generate request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(target: "llm.ollama", %status, "llm.ollama.generate.error");
            return Err(SkimmerError::Provider(format!(
                "Generate failed: HTTP {status} {}",
                body.trim()
            )));
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| SkimmerError::Provider(format!("Failed to parse response: {e}")))?;

        let text = val
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        let eval_count = val.get("eval_count").and_then(|c| c.as_u64());

        let conversation = val
            .get("context")
            .and_then(|c| c.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect::<Vec<_>>())
            .filter(|ctx| !ctx.is_empty())
            .map(ConversationHandle::ollama);

        tracing::info!(
            target: "llm.ollama",
            model = %self.model,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            eval_count,
            "llm.ollama.generate.success"
        );

        Ok(LlmResponse {
            text,
            conversation,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }
}
