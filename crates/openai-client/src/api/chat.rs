//! Chat completions API.

use openai_model::OptionalField;
use openai_model::chat::{ChatCompletion, ChatCompletionsCreateRequest, ChatMessage};

use crate::client::OpenAiClient;
use crate::error::{Error, Result};

/// Chat completions API client.
pub struct ChatApi {
    client: OpenAiClient,
}

impl ChatApi {
    pub(crate) fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Create a chat completion.
    ///
    /// Streamed responses are not supported; a request with `stream: true`
    /// is rejected before it is sent.
    pub async fn create(&self, request: &ChatCompletionsCreateRequest) -> Result<ChatCompletion> {
        if request.stream == OptionalField::Present(true) {
            return Err(Error::Config(
                "streamed chat completions are not supported".to_string(),
            ));
        }
        self.client.post("chat/completions", request).await
    }

    /// Send a single user message (convenience method).
    pub async fn message(
        &self,
        model: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<ChatCompletion> {
        let request = ChatCompletionsCreateRequest::builder(model)
            .message(ChatMessage::user(text))
            .build()?;
        self.create(&request).await
    }
}
