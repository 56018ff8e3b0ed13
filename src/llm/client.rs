//! Blocking HTTP client for a local Ollama server
//!
//! Talks to the OpenAI-compatible `/v1/chat/completions` endpoint. One
//! request per operation, no streaming; calls block and are meant to run
//! on a background thread.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use ureq::Agent;

use crate::core::config::ServerConfig;
use crate::core::curriculum::Module;
use crate::core::lesson::{Lesson, ModuleOverview};
use crate::llm::extract::{extract_json, ExtractError};
use crate::llm::prompts;

/// What went wrong while talking to the model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("could not connect to Ollama at {server} (is Ollama running?)")]
    Connection {
        server: String,
        #[source]
        source: ureq::Error,
    },
    #[error("Ollama API request failed")]
    Request(#[source] ureq::Error),
    #[error("Ollama response carried no message content")]
    EmptyResponse,
    #[error(transparent)]
    Malformed(#[from] ExtractError),
    #[error("model response JSON has an unexpected shape")]
    Shape(#[source] serde_json::Error),
}

/// Chat request body for `/v1/chat/completions`
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format: String,
}

impl ResponseFormat {
    fn json() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

/// Chat response envelope; only the first choice's content is used
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Message,
}

#[derive(Debug, Default, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
    }
}

/// Client for one configured Ollama server and model
#[derive(Clone)]
pub struct OllamaClient {
    agent: Agent,
    server: String,
    model: String,
    generate_timeout: Duration,
    correction_timeout: Duration,
}

impl OllamaClient {
    /// Build a client from the server settings
    pub fn new(config: &ServerConfig) -> Self {
        let generate_timeout = Duration::from_secs(config.generate_timeout_secs);
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(generate_timeout))
            .build()
            .into();

        Self {
            agent,
            server: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            generate_timeout,
            correction_timeout: Duration::from_secs(config.correction_timeout_secs),
        }
    }

    /// Generate one lesson with exercises for the given curriculum position
    pub fn generate_lesson(
        &self,
        language: &str,
        module: Module,
        lesson_number: u32,
    ) -> Result<Lesson, LlmError> {
        tracing::info!("Requesting lesson {} {} from {}", module, lesson_number, self.model);
        let prompt = prompts::lesson_prompt(language, module, lesson_number);
        let value = self.chat_json(&prompt, self.generate_timeout)?;
        serde_json::from_value(value).map_err(LlmError::Shape)
    }

    /// Generate the overview shown when the student enters a new module
    pub fn module_overview(
        &self,
        language: &str,
        module: Module,
    ) -> Result<ModuleOverview, LlmError> {
        tracing::info!("Requesting {} module overview from {}", module, self.model);
        let prompt = prompts::overview_prompt(language, module);
        let value = self.chat_json(&prompt, self.generate_timeout)?;
        serde_json::from_value(value).map_err(LlmError::Shape)
    }

    /// Ask for feedback on the student's answers; the reply is plain text
    /// appended to the lesson document as-is
    pub fn correct_answers(
        &self,
        language: &str,
        lesson: &Lesson,
        answers: &[String],
    ) -> Result<String, LlmError> {
        tracing::info!("Requesting correction from {}", self.model);
        let prompt = prompts::correction_prompt(language, lesson, answers);
        self.chat(&prompt, self.correction_timeout, None)
    }

    /// Chat expecting a JSON object back, tolerating wrapped output
    fn chat_json(&self, prompt: &str, timeout: Duration) -> Result<Value, LlmError> {
        let content = self.chat(prompt, timeout, Some(ResponseFormat::json()))?;
        Ok(extract_json(&content)?)
    }

    /// Send one user message and return the first choice's content
    fn chat(
        &self,
        prompt: &str,
        timeout: Duration,
        response_format: Option<ResponseFormat>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.server);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            response_format,
        };

        let response = self
            .agent
            .post(&url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .send_json(&request)
            .map_err(|e| self.classify(e))?;

        let envelope: ChatResponse = response
            .into_body()
            .read_json()
            .map_err(|e| self.classify(e))?;

        let content = envelope.into_content().ok_or(LlmError::EmptyResponse)?;
        tracing::debug!("Raw model response: {}", content);
        Ok(content)
    }

    /// Split transport-level failures from everything else so the UI can
    /// suggest checking that the server is up
    fn classify(&self, error: ureq::Error) -> LlmError {
        match error {
            e @ (ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
            | ureq::Error::Io(_)
            | ureq::Error::Timeout(_)) => LlmError::Connection {
                server: self.server.clone(),
                source: e,
            },
            e => LlmError::Request(e),
        }
    }
}
