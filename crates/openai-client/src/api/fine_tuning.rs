//! Fine-tuning API.

use futures::Stream;
use openai_model::models::FineTuningJobEvent;
use openai_model::{PageRequest, PageResponse};

use crate::client::{OpenAiClient, path_segment};
use crate::error::Result;

/// Fine-tuning API client.
pub struct FineTuningApi {
    client: OpenAiClient,
}

impl FineTuningApi {
    pub(crate) fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// List one page of a job's events, newest first.
    pub async fn list_events(
        &self,
        job_id: &str,
        request: &PageRequest,
    ) -> Result<PageResponse<FineTuningJobEvent>> {
        self.client.list(&events_path(job_id)?, request).await
    }

    /// Stream every event of a job, starting from `request`.
    ///
    /// Fails up front if `job_id` cannot be used as a path segment.
    pub fn list_all_events(
        &self,
        job_id: &str,
        request: PageRequest,
    ) -> Result<impl Stream<Item = Result<FineTuningJobEvent>> + Send + use<>> {
        Ok(self.client.list_all(events_path(job_id)?, request))
    }
}

fn events_path(job_id: &str) -> Result<String> {
    Ok(format!("fine_tuning/jobs/{}/events", path_segment(job_id)?))
}
