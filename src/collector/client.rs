//! @ai:module:intent Chat-completions API client for KPI queries
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChatClient, MockChatClient
//! @ai:module:stateless false

use crate::config::ApiConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// @ai:intent Trait for the chat-completions boundary
#[allow(async_fn_in_trait)]
pub trait ChatClientTrait: Send + Sync {
    /// @ai:intent Send a single user prompt and return the reply content
    async fn send_prompt(&self, prompt: &str) -> Result<String>;
}

/// @ai:intent Chat-completions request body
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// @ai:intent Chat-completions response body
#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// @ai:intent HTTP client for an OpenAI-compatible chat-completions endpoint
pub struct ChatClient {
    client: reqwest::Client,
    config: ApiConfig,
    api_key: String,
}

impl ChatClient {
    /// @ai:intent Create a client, reading the bearer key from the environment
    /// @ai:pre the configured API key environment variable is set
    /// @ai:effects env
    pub fn new(config: ApiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} not set in environment", config.api_key_env))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

}

impl ChatClientTrait for ChatClient {
    /// @ai:intent POST the prompt and extract choices[0].message.content
    /// @ai:effects network
    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let request = ApiRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!("API request: {}", prompt);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to chat API")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat API error ({}): {}", status, error_text);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse chat API response")?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("No valid content found in response")?;

        Ok(content.trim().to_string())
    }
}

/// @ai:intent Mock client for dry runs and tests
pub struct MockChatClient {
    fallback: String,
    queue: Mutex<VecDeque<Result<String, String>>>,
}

impl MockChatClient {
    /// @ai:intent Create a mock that always returns one fixed reply
    /// @ai:effects pure
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            fallback: response.into(),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// @ai:intent Queue a scripted reply, consumed before the fallback
    /// @ai:effects state:write
    pub fn push_response(&self, response: impl Into<String>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    /// @ai:intent Queue a scripted failure
    /// @ai:effects state:write
    pub fn push_error(&self, message: impl Into<String>) {
        self.queue.lock().unwrap().push_back(Err(message.into()));
    }
}

impl ChatClientTrait for MockChatClient {
    /// @ai:intent Return the next scripted reply, or the fallback
    /// @ai:effects state:write
    async fn send_prompt(&self, _prompt: &str) -> Result<String> {
        match self.queue.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}
