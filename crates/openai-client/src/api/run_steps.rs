//! Run steps API.

use futures::Stream;
use openai_model::runs::RunStep;
use openai_model::{PageRequest, PageResponse};

use crate::client::{OpenAiClient, path_segment};
use crate::error::Result;

/// Run steps API client, scoped to one run.
pub struct RunStepsApi {
    client: OpenAiClient,
    path: String,
}

impl RunStepsApi {
    pub(crate) fn new(client: OpenAiClient, thread_id: &str, run_id: &str) -> Result<Self> {
        let path = format!(
            "threads/{}/runs/{}/steps",
            path_segment(thread_id)?,
            path_segment(run_id)?
        );
        Ok(Self { client, path })
    }

    /// List one page of steps.
    pub async fn list(&self, request: &PageRequest) -> Result<PageResponse<RunStep>> {
        self.client.list(&self.path, request).await
    }

    /// Stream every step of the run, starting from `request`.
    pub fn list_all(&self, request: PageRequest) -> impl Stream<Item = Result<RunStep>> + Send + use<> {
        self.client.list_all(self.path.clone(), request)
    }

    /// Get a step by ID.
    pub async fn retrieve(&self, step_id: &str) -> Result<RunStep> {
        self.client
            .get(&format!("{}/{}", self.path, path_segment(step_id)?))
            .await
    }
}
