//! AI chat endpoints
//!
//! `/ai/chat/stream` answers with server-sent events: one `data: <text>`
//! frame per generated piece of text, then `data: [DONE]`.

use super::intents::IntentAnalysis;
use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload that marks the end of a chat stream.
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body for `/ai/chat` and `/ai/chat/stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ChatMessage>>,
    /// Use the faster, smaller model.
    pub use_flash: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Prior turns of the conversation, oldest first.
    pub fn context(mut self, context: Vec<ChatMessage>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn flash(mut self) -> Self {
        self.use_flash = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    /// Token accounting as reported by the model provider.
    #[serde(default)]
    pub tokens: Value,
    #[serde(default)]
    pub function_call: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_tokens: u32,
    #[serde(default)]
    pub recommended_for: Vec<String>,
}

#[derive(Deserialize)]
struct ModelList {
    models: Vec<ModelInfo>,
}

/// Body for [`AiApi::analyze_intent`].
///
/// Unset lists fall back to the backend's default capabilities and actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntentAnalysisRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_actions: Option<Vec<String>>,
}

impl IntentAnalysisRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.capabilities = Some(capabilities.into_iter().map(Into::into).collect());
        self
    }

    pub fn available_actions(mut self, actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }
}

/// Body for [`AiApi::plan_transaction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPlanRequest {
    /// A parsed intent, as returned by intent analysis.
    pub intent: Value,
    pub wallet_balance: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_data: Option<Value>,
}

/// Step-by-step execution plan. When planning fails the backend still
/// answers 200, with empty steps and `error` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPlan {
    #[serde(default)]
    pub steps: Vec<Value>,
    #[serde(default)]
    pub estimated_gas_usd: f64,
    #[serde(default)]
    pub estimated_value_usd: f64,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Splits a text stream into server-sent-event `data` payloads.
///
/// Chunks may cut lines, or even the `\r\n` pair, anywhere. Multiple `data:`
/// lines in one event are joined with `\n`. Comment lines and other fields
/// are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: String,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the payloads of every event it completed.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        let mut events = Vec::new();
        for ch in chunk.chars() {
            if ch != '\n' {
                self.line.push(ch);
                continue;
            }

            let line = std::mem::take(&mut self.line);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        events
    }

    /// Returns the payload of an event left unterminated at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.line);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if let Some(value) = line.strip_prefix("data:") {
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        if self.data.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.data).join("\n"))
        }
    }
}

/// AI API interface
#[derive(Clone)]
pub struct AiApi {
    client: Client,
}

impl AiApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sends one chat turn and waits for the whole reply.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.client.post("/ai/chat", request).await
    }

    /// Sends one chat turn and streams the reply.
    ///
    /// `on_text` receives each piece of generated text as it arrives; the
    /// assembled reply is returned once the backend sends `[DONE]` or closes
    /// the stream.
    pub async fn chat_stream<F>(&self, request: &ChatRequest, mut on_text: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut stream = self.client.stream_text("/ai/chat/stream", request).await?;
        let mut decoder = SseDecoder::new();
        let mut reply = String::new();

        let mut emit = |payload: String, reply: &mut String| -> bool {
            if payload == DONE_MARKER {
                return true;
            }
            on_text(&payload);
            reply.push_str(&payload);
            false
        };

        while let Some(chunk) = stream.next_chunk().await? {
            for payload in decoder.push(&chunk) {
                if emit(payload, &mut reply) {
                    return Ok(reply);
                }
            }
        }

        if let Some(payload) = decoder.finish() {
            emit(payload, &mut reply);
        } else {
            tracing::debug!("Chat stream closed without a [DONE] marker");
        }
        Ok(reply)
    }

    /// Extracts the action a message asks for, without storing an intent.
    pub async fn analyze_intent(&self, request: &IntentAnalysisRequest) -> Result<IntentAnalysis> {
        self.client.post("/ai/analyze-intent", request).await
    }

    /// Plans the transactions needed to carry out an intent.
    pub async fn plan_transaction(&self, request: &TransactionPlanRequest) -> Result<TransactionPlan> {
        self.client.post("/ai/plan-transaction", request).await
    }

    /// Lists the models agents can use.
    pub async fn models(&self) -> Result<Vec<ModelInfo>> {
        let list: ModelList = self.client.get("/ai/models").await?;
        Ok(list.models)
    }
}
