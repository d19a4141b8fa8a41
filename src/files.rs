//! Upload documents usable by assistants and fine-tuning, and fetch their
//! contents back.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::{Client, Deleted, Page};
use crate::error::require_id;
use crate::ApiResult;

/// A document uploaded to the API, referenced by id from assistants and
/// messages.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct File {
    pub id: String,
    pub object: String,
    /// Size of the file in bytes.
    pub bytes: u64,
    pub created_at: u64,
    pub filename: String,
    pub purpose: String,
    pub status: Option<String>,
    pub status_details: Option<String>,
}

/// The intended use of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    FineTune,
    Assistants,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::FineTune => "fine-tune",
            Purpose::Assistants => "assistants",
        }
    }
}

/// An in-memory upload: payload, original filename and purpose.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub purpose: Purpose,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, purpose: Purpose) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            purpose,
        }
    }
}

impl Client {
    /// Uploads a file. Use purpose `assistants` for files attached to
    /// assistants or messages and `fine-tune` for fine-tuning datasets.
    pub async fn upload_file(&self, upload: &FileUpload) -> ApiResult<File> {
        require_id(&upload.filename, "file name")?;
        let part = Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        let form = Form::new()
            .text("purpose", upload.purpose.as_str())
            .part("file", part);
        self.post_multipart("files", form).await
    }

    /// Returns the files belonging to the given purpose.
    pub async fn list_files(&self, purpose: Purpose) -> ApiResult<Page<File>> {
        self.get(&format!("files?purpose={}", purpose.as_str()))
            .await
    }

    /// Retrieves a file descriptor by id.
    pub async fn retrieve_file(&self, file_id: &str) -> ApiResult<File> {
        require_id(file_id, "file id")?;
        self.get(&format!("files/{file_id}")).await
    }

    /// Deletes a file.
    pub async fn delete_file(&self, file_id: &str) -> ApiResult<Deleted> {
        require_id(file_id, "file id")?;
        self.delete(&format!("files/{file_id}")).await
    }

    /// Returns the raw contents of a file.
    pub async fn retrieve_file_content(&self, file_id: &str) -> ApiResult<Vec<u8>> {
        require_id(file_id, "file id")?;
        self.get_bytes(&format!("files/{file_id}/content")).await
    }
}
