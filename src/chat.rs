//! Given a chat conversation, the model returns a chat completion response.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::assistants::Tool;
use crate::client::Client;
use crate::{ApiResult, Usage};

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionChoice {
    pub index: u64,
    pub finish_reason: String,
    pub message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ChatMessage {
    pub role: ChatRole,
    /// Absent when the model answers with tool calls instead of text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls requested by the model. Populated only on assistant
    /// messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set on tool-role messages carrying a tool result back to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Default for ChatRole {
    fn default() -> Self {
        ChatRole::User
    }
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// A pending function invocation requested by the model. Shared between chat
/// completions and the run `required_action` payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Referenced when submitting the matching output.
    pub id: String,
    /// Always `function` for now.
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, in the shape declared by the function's
    /// parameter schema.
    pub arguments: String,
}

#[derive(Serialize, Builder, Debug, Clone, Default)]
#[builder(pattern = "owned")]
#[builder(name = "ChatCompletionRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct ChatCompletionRequest {
    /// ID of the model to use.
    pub model: String,
    pub messages: Vec<ChatMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub tools: Option<Vec<Tool>>,
}

impl ChatCompletionRequest {
    pub fn builder(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
    ) -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::create_empty()
            .model(model)
            .messages(messages)
    }
}

impl Client {
    /// Creates a chat completion for the provided conversation.
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> ApiResult<ChatCompletion> {
        self.post("chat/completions", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assistant_message_with_tool_calls_decodes() {
        let raw = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "getCityLocalNames", "arguments": "{\"city\":\"Amsterdam\"}" }
            }]
        });
        let message: ChatMessage = serde_json::from_value(raw).unwrap();
        assert!(message.content.is_none());
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls[0].function.name, "getCityLocalNames");
    }

    #[test]
    fn request_serializes_minimal_shape() {
        let request = ChatCompletionRequest::builder(
            "gpt-4",
            vec![ChatMessage::user("Hello")],
        )
        .build()
        .unwrap();
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["model"], "gpt-4");
        assert_eq!(encoded["messages"][0]["role"], "user");
        assert!(encoded.get("temperature").is_none());
    }
}
