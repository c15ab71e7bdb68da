//! Embeddings API.

use openai_model::embeddings::{EmbeddingCreateRequest, EmbeddingInput, EmbeddingResponse};

use crate::client::OpenAiClient;
use crate::error::Result;

/// Embeddings API client.
pub struct EmbeddingsApi {
    client: OpenAiClient,
}

impl EmbeddingsApi {
    pub(crate) fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Create embeddings.
    pub async fn create(&self, request: &EmbeddingCreateRequest) -> Result<EmbeddingResponse> {
        self.client.post("embeddings", request).await
    }

    /// Embed a single input with the server's defaults (convenience method).
    pub async fn embed(
        &self,
        model: impl Into<String>,
        input: impl Into<EmbeddingInput>,
    ) -> Result<EmbeddingResponse> {
        self.create(&EmbeddingCreateRequest::new(model, input)).await
    }
}
