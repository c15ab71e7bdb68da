//! Vector stores API.

use futures::Stream;
use openai_model::PageRequest;
use openai_model::PageResponse;
use openai_model::vector_stores::{
    DeletionStatus, VectorStore, VectorStoreCreateRequest, VectorStoreModifyRequest,
};

use crate::client::{OpenAiClient, path_segment};
use crate::error::Result;

/// Vector stores API client.
pub struct VectorStoresApi {
    client: OpenAiClient,
}

impl VectorStoresApi {
    pub(crate) fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// List one page of vector stores.
    pub async fn list(&self, request: &PageRequest) -> Result<PageResponse<VectorStore>> {
        self.client.list("vector_stores", request).await
    }

    /// Stream every vector store, starting from `request`.
    pub fn list_all(
        &self,
        request: PageRequest,
    ) -> impl Stream<Item = Result<VectorStore>> + Send + use<> {
        self.client.list_all("vector_stores".to_string(), request)
    }

    /// Create a vector store.
    pub async fn create(&self, request: &VectorStoreCreateRequest) -> Result<VectorStore> {
        self.client.post("vector_stores", request).await
    }

    /// Get a vector store by ID.
    pub async fn retrieve(&self, id: &str) -> Result<VectorStore> {
        self.client.get(&store_path(id)?).await
    }

    /// Modify a vector store. Null fields in the request are cleared.
    pub async fn modify(&self, id: &str, request: &VectorStoreModifyRequest) -> Result<VectorStore> {
        self.client.post(&store_path(id)?, request).await
    }

    /// Delete a vector store.
    pub async fn delete(&self, id: &str) -> Result<DeletionStatus> {
        self.client.delete(&store_path(id)?).await
    }
}

fn store_path(id: &str) -> Result<String> {
    Ok(format!("vector_stores/{}", path_segment(id)?))
}
