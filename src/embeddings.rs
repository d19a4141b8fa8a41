//! Vector representations of input text, consumable by machine-learning
//! models and algorithms.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::{ApiResult, Usage};

#[derive(Debug, Serialize, Clone)]
pub struct EmbeddingsRequest {
    /// ID of the model to use.
    pub model: String,
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingsRequest {
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: vec![input.into()],
            user: None,
        }
    }

    pub fn batch(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
            user: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Embeddings {
    pub object: String,
    pub data: Vec<Embedding>,
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Embedding {
    pub object: String,
    pub embedding: Vec<f32>,
    pub index: u32,
}

impl Client {
    /// Creates embedding vectors for the given inputs. The response data is
    /// ordered by the `index` of each input.
    pub async fn create_embeddings(&self, request: &EmbeddingsRequest) -> ApiResult<Embeddings> {
        self.post("embeddings", request).await
    }
}
