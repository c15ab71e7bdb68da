//! Threads API.

use openai_model::threads::ThreadMessageRequest;
use serde_json::Value;

use crate::client::{OpenAiClient, path_segment};
use crate::error::Result;

/// Threads API client.
pub struct ThreadsApi {
    client: OpenAiClient,
}

impl ThreadsApi {
    pub(crate) fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Add a message to a thread.
    ///
    /// Returns the created message object as raw JSON.
    pub async fn create_message(
        &self,
        thread_id: &str,
        request: &ThreadMessageRequest,
    ) -> Result<Value> {
        self.client
            .post(&format!("threads/{}/messages", path_segment(thread_id)?), request)
            .await
    }
}
