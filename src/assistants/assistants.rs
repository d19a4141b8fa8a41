use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Client, Deleted, ListQuery, Page};
use crate::error::require_id;
use crate::ApiResult;

/// A server-side configured agent: model, instructions, tools and attached
/// files. Created once and referenced by id thereafter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Assistant {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The name of the assistant. The maximum length is 256 characters.
    pub name: Option<String>,
    /// The description of the assistant. The maximum length is 512 characters.
    pub description: Option<String>,
    /// ID of the model the assistant uses.
    pub model: String,
    /// The system instructions that the assistant uses.
    pub instructions: Option<String>,
    /// Tools enabled on the assistant. A maximum of 128 tools per assistant.
    pub tools: Vec<Tool>,
    /// IDs of files attached to this assistant, ordered by creation date.
    #[serde(default)]
    pub file_ids: Vec<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// A tool the assistant may call during a run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    CodeInterpreter,
    Retrieval,
    Function { function: Function },
}

impl Tool {
    /// Convenience constructor for a function tool.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Tool::Function {
            function: Function {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// A callable function definition. `parameters` is the JSON Schema the model
/// uses to shape the call arguments.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Request body for creating or modifying an assistant.
#[derive(Serialize, Builder, Debug, Clone, Default)]
#[builder(pattern = "owned")]
#[builder(name = "AssistantRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct AssistantRequest {
    /// ID of the model to use.
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub instructions: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub tools: Vec<Tool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub file_ids: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl AssistantRequest {
    pub fn builder(model: impl Into<String>) -> AssistantRequestBuilder {
        AssistantRequestBuilder::create_empty().model(model)
    }
}

/// A file attached to an assistant.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssistantFile {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    pub assistant_id: String,
}

#[derive(Serialize)]
struct AttachFileRequest<'a> {
    file_id: &'a str,
}

impl Client {
    /// Creates an assistant with a model and instructions.
    pub async fn create_assistant(&self, request: &AssistantRequest) -> ApiResult<Assistant> {
        self.post("assistants", request).await
    }

    /// Retrieves an assistant by id.
    pub async fn retrieve_assistant(&self, assistant_id: &str) -> ApiResult<Assistant> {
        require_id(assistant_id, "assistant id")?;
        self.get(&format!("assistants/{assistant_id}")).await
    }

    /// Modifies an assistant.
    pub async fn modify_assistant(
        &self,
        assistant_id: &str,
        request: &AssistantRequest,
    ) -> ApiResult<Assistant> {
        require_id(assistant_id, "assistant id")?;
        self.post(&format!("assistants/{assistant_id}"), request)
            .await
    }

    /// Returns one page of assistants.
    pub async fn list_assistants(&self, query: &ListQuery) -> ApiResult<Page<Assistant>> {
        self.get_query("assistants", query).await
    }

    /// Deletes an assistant.
    pub async fn delete_assistant(&self, assistant_id: &str) -> ApiResult<Deleted> {
        require_id(assistant_id, "assistant id")?;
        self.delete(&format!("assistants/{assistant_id}")).await
    }

    /// Attaches an uploaded file (purpose `assistants`) to an assistant so
    /// tools like retrieval and code_interpreter can access it.
    pub async fn attach_assistant_file(
        &self,
        assistant_id: &str,
        file_id: &str,
    ) -> ApiResult<AssistantFile> {
        require_id(assistant_id, "assistant id")?;
        require_id(file_id, "file id")?;
        self.post(
            &format!("assistants/{assistant_id}/files"),
            &AttachFileRequest { file_id },
        )
        .await
    }

    /// Retrieves an assistant file.
    pub async fn retrieve_assistant_file(
        &self,
        assistant_id: &str,
        file_id: &str,
    ) -> ApiResult<AssistantFile> {
        require_id(assistant_id, "assistant id")?;
        require_id(file_id, "file id")?;
        self.get(&format!("assistants/{assistant_id}/files/{file_id}"))
            .await
    }

    /// Detaches a file from an assistant. The underlying file itself is not
    /// deleted.
    pub async fn delete_assistant_file(
        &self,
        assistant_id: &str,
        file_id: &str,
    ) -> ApiResult<Deleted> {
        require_id(assistant_id, "assistant id")?;
        require_id(file_id, "file id")?;
        self.delete(&format!("assistants/{assistant_id}/files/{file_id}"))
            .await
    }

    /// Returns one page of files attached to an assistant.
    pub async fn list_assistant_files(
        &self,
        assistant_id: &str,
        query: &ListQuery,
    ) -> ApiResult<Page<AssistantFile>> {
        require_id(assistant_id, "assistant id")?;
        self.get_query(&format!("assistants/{assistant_id}/files"), query)
            .await
    }
}
