use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::assistants::messages::MessageRequest;
use crate::client::{Client, Deleted};
use crate::error::require_id;
use crate::ApiResult;

/// A conversation container owning an ordered, append-only sequence of
/// messages.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Thread {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    pub metadata: Option<HashMap<String, String>>,
}

/// Request body for creating or modifying a thread. A thread may be seeded
/// with initial messages at creation; modification only touches metadata.
#[derive(Serialize, Builder, Debug, Clone, Default)]
#[builder(pattern = "owned")]
#[builder(name = "ThreadRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct ThreadRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub messages: Vec<MessageRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl ThreadRequest {
    pub fn builder() -> ThreadRequestBuilder {
        ThreadRequestBuilder::create_empty()
    }
}

impl Client {
    /// Creates a thread, optionally seeded with messages.
    pub async fn create_thread(&self, request: &ThreadRequest) -> ApiResult<Thread> {
        self.post("threads", request).await
    }

    /// Retrieves a thread by id.
    pub async fn retrieve_thread(&self, thread_id: &str) -> ApiResult<Thread> {
        require_id(thread_id, "thread id")?;
        self.get(&format!("threads/{thread_id}")).await
    }

    /// Modifies a thread. Only the metadata can be changed.
    pub async fn modify_thread(
        &self,
        thread_id: &str,
        request: &ThreadRequest,
    ) -> ApiResult<Thread> {
        require_id(thread_id, "thread id")?;
        self.post(&format!("threads/{thread_id}"), request).await
    }

    /// Deletes a thread and the messages it owns.
    pub async fn delete_thread(&self, thread_id: &str) -> ApiResult<Deleted> {
        require_id(thread_id, "thread id")?;
        self.delete(&format!("threads/{thread_id}")).await
    }
}
