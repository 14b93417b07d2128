//! Chat proxy to the LLM backend.
//!
//! Failures never surface as errors to the caller: the user gets a canned
//! apology and the real cause goes to the log.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use shiptrack_core::config::assistant::AssistantConfig;
use shiptrack_core::error::{AppError, ErrorKind};
use shiptrack_core::result::AppResult;
use shiptrack_database::repositories::shipment::ShipmentRepository;

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant for a logistics company. \
Answer questions about the user's shipments concisely and accurately.";

const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again later.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Answers user questions with the user's shipment list as context.
#[derive(Clone)]
pub struct AssistantService {
    http: reqwest::Client,
    config: AssistantConfig,
    shipment_repo: Arc<ShipmentRepository>,
}

impl AssistantService {
    pub fn new(config: &AssistantConfig, shipment_repo: Arc<ShipmentRepository>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build assistant HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            config: config.clone(),
            shipment_repo,
        })
    }

    /// Sends the user's message to the LLM with their shipments as context.
    ///
    /// Returns the apology fallback if the backend is unreachable or returns
    /// something unusable.
    pub async fn chat(&self, user_id: Uuid, message: &str) -> AppResult<String> {
        let shipments = self.shipment_repo.find_by_user(user_id).await?;

        let context = shipments
            .iter()
            .map(|s| format!("{}: {}", s.tracking_number, s.status))
            .collect::<Vec<_>>()
            .join(", ");

        let system = if context.is_empty() {
            SYSTEM_PROMPT.to_string()
        } else {
            format!("{SYSTEM_PROMPT}\nUser's current shipments: {context}")
        };

        match self.complete(&system, message).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(%user_id, error = %e, "Assistant backend failed; returning fallback reply");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }

    async fn complete(&self, system: &str, user_message: &str) -> AppResult<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Assistant request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Assistant backend returned status {status}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Failed to decode assistant response",
                e,
            )
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::external_service("Assistant returned no choices"))
    }
}
