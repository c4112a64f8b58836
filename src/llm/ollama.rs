use crate::llm::client::{LLMClient, ModelParams};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
    models::ModelOptions,
};

const DEFAULT_OLLAMA_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    options: Option<ModelOptions>,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        Self::with_params(base_url, model, ModelParams::default()).await
    }

    pub async fn with_params(base_url: String, model: String, params: ModelParams) -> Result<Self> {
        let (host, port) = split_base_url(&base_url)?;
        let client = Ollama::new(host, port);

        Ok(Self {
            client,
            model,
            options: model_options(&params),
        })
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let mut request = ChatMessageRequest::new(self.model.clone(), messages);
        if let Some(options) = &self.options {
            request = request.options(options.clone());
        }

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

/// Map sampling parameters onto Ollama's `options` object. `None` leaves the
/// model's own defaults in place.
fn model_options(params: &ModelParams) -> Option<ModelOptions> {
    if params.temperature.is_none() && params.max_tokens.is_none() {
        return None;
    }

    let mut options = ModelOptions::default();
    if let Some(temperature) = params.temperature {
        options = options.temperature(temperature);
    }
    if let Some(max_tokens) = params.max_tokens {
        options = options.num_predict(i32::try_from(max_tokens).unwrap_or(i32::MAX));
    }
    Some(options)
}

/// Split `scheme://host:port` into the `(scheme://host, port)` pair ollama-rs expects.
fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let (scheme, rest) = base_url
        .split_once("://")
        .unwrap_or(("http", base_url));
    let rest = rest.trim_end_matches('/');

    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| {
                AppError::Configuration(format!("Invalid Ollama port in '{}'", base_url))
            })?;
            (host, port)
        }
        None => (rest, DEFAULT_OLLAMA_PORT),
    };

    if host.is_empty() {
        return Err(AppError::Configuration(format!(
            "Invalid Ollama base URL '{}'",
            base_url
        )));
    }

    Ok((format!("{}://{}", scheme, host), port))
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
