//! Models API.

use openai_model::models::{Model, ModelList};

use crate::client::{OpenAiClient, path_segment};
use crate::error::Result;

/// Models API client.
pub struct ModelsApi {
    client: OpenAiClient,
}

impl ModelsApi {
    pub(crate) fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// List all available models. This endpoint is not paginated.
    pub async fn list(&self) -> Result<ModelList> {
        self.client.get("models").await
    }

    /// Get a model by ID.
    pub async fn retrieve(&self, id: &str) -> Result<Model> {
        self.client.get(&format!("models/{}", path_segment(id)?)).await
    }
}
