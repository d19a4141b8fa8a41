use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Client, ListQuery, Page};
use crate::error::require_id;
use crate::ApiResult;

/// A message within a thread. Immutable once created, except for metadata.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The thread this message belongs to.
    pub thread_id: String,
    /// The entity that produced the message.
    pub role: Role,
    /// Ordered content blocks, each either text or an image reference.
    pub content: Vec<Content>,
    /// If applicable, the assistant that authored this message.
    pub assistant_id: Option<String>,
    /// If applicable, the run associated with authoring this message.
    pub run_id: Option<String>,
    /// IDs of files attached to the message. A maximum of 10.
    #[serde(default)]
    pub file_ids: Vec<String>,
    pub metadata: Option<HashMap<String, String>>,
}

impl Message {
    /// Concatenates the text blocks of this message, ignoring image blocks.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            match block {
                Content::Text { text } => out.push_str(&text.value),
                Content::ImageFile { .. } => {}
            }
        }
        out
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One content block of a message. The wire format tags each block with its
/// type and nests the payload under a matching key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text { text: Text },
    ImageFile { image_file: ImageFile },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    /// Citations and file-path annotations referenced from placeholders in
    /// `value`. Left as raw JSON; the shapes vary per annotation kind.
    #[serde(default)]
    pub annotations: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageFile {
    pub file_id: String,
}

/// Request body for creating (or, metadata-only, modifying) a message.
#[derive(Serialize, Builder, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "MessageRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct MessageRequest {
    pub role: Role,
    pub content: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub file_ids: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl MessageRequest {
    /// A plain user/assistant text message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            file_ids: Vec::new(),
            metadata: None,
        }
    }

    pub fn builder(role: Role, content: impl Into<String>) -> MessageRequestBuilder {
        MessageRequestBuilder::create_empty()
            .role(role)
            .content(content)
    }
}

impl Client {
    /// Appends a message to a thread.
    pub async fn create_message(
        &self,
        thread_id: &str,
        request: &MessageRequest,
    ) -> ApiResult<Message> {
        require_id(thread_id, "thread id")?;
        self.post(&format!("threads/{thread_id}/messages"), request)
            .await
    }

    /// Retrieves a message.
    pub async fn retrieve_message(&self, thread_id: &str, message_id: &str) -> ApiResult<Message> {
        require_id(thread_id, "thread id")?;
        require_id(message_id, "message id")?;
        self.get(&format!("threads/{thread_id}/messages/{message_id}"))
            .await
    }

    /// Modifies a message's metadata.
    pub async fn modify_message(
        &self,
        thread_id: &str,
        message_id: &str,
        request: &MessageRequest,
    ) -> ApiResult<Message> {
        require_id(thread_id, "thread id")?;
        require_id(message_id, "message id")?;
        self.post(&format!("threads/{thread_id}/messages/{message_id}"), request)
            .await
    }

    /// Returns one page of messages for a thread, newest first by default.
    /// Callers follow `Page::last_id` with [`ListQuery::after`] for the rest.
    pub async fn list_messages(
        &self,
        thread_id: &str,
        query: &ListQuery,
    ) -> ApiResult<Page<Message>> {
        require_id(thread_id, "thread id")?;
        self.get_query(&format!("threads/{thread_id}/messages"), query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_blocks_decode_by_type_tag() {
        let raw = json!([
            { "type": "text", "text": { "value": "2+2 equals 4.", "annotations": [] } },
            { "type": "image_file", "image_file": { "file_id": "file-abc" } }
        ]);
        let blocks: Vec<Content> = serde_json::from_value(raw).unwrap();
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Content::Text { text } => assert_eq!(text.value, "2+2 equals 4."),
            other => panic!("expected text block, got {other:?}"),
        }
        match &blocks[1] {
            Content::ImageFile { image_file } => assert_eq!(image_file.file_id, "file-abc"),
            other => panic!("expected image block, got {other:?}"),
        }
    }

    #[test]
    fn text_helper_skips_image_blocks() {
        let message = Message {
            id: "msg_1".into(),
            object: "thread.message".into(),
            created_at: 0,
            thread_id: "thread_1".into(),
            role: Role::Assistant,
            content: vec![
                Content::Text {
                    text: Text {
                        value: "see attached".into(),
                        annotations: vec![],
                    },
                },
                Content::ImageFile {
                    image_file: ImageFile {
                        file_id: "file-abc".into(),
                    },
                },
            ],
            assistant_id: None,
            run_id: None,
            file_ids: vec![],
            metadata: None,
        };
        assert_eq!(message.text(), "see attached");
    }

    #[test]
    fn request_round_trips_plain_text() {
        let request = MessageRequest::new(Role::User, "What is the capital of France?");
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(
            encoded,
            json!({ "role": "user", "content": "What is the capital of France?" })
        );
    }
}
