//! Main client implementation.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, TryStreamExt};
use openai_model::{
    Decode, Encode, Identified, ListResource, PageRequest, PageResponse, Paginator,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::api::{
    ChatApi, EmbeddingsApi, FineTuningApi, ModelsApi, RunStepsApi, ThreadsApi, VectorStoresApi,
};
use crate::error::{Error, ErrorResponse, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Environment variable overriding the API root.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Percent-encode a caller-supplied id for use as one path segment.
///
/// Empty and dot segments would change the target path and are rejected.
pub(crate) fn path_segment(id: &str) -> Result<Cow<'_, str>> {
    match id {
        "" | "." | ".." => Err(Error::Config(format!("invalid path segment {id:?}"))),
        _ => Ok(urlencoding::encode(id)),
    }
}

/// API client.
///
/// Cheap to clone; clones share one connection pool. Credentials are not
/// managed here: add an `Authorization` header through the builder or hand
/// in a preconfigured `reqwest::Client`.
///
/// # Example
///
/// ```no_run
/// use openai_client::OpenAiClient;
/// use openai_model::PageRequest;
///
/// # async fn example() -> openai_client::Result<()> {
/// let client = OpenAiClient::builder()
///     .header("Authorization", "Bearer sk-...")
///     .build()?;
///
/// let page = client.vector_stores().list(&PageRequest::new()).await?;
/// for store in &page.data {
///     println!("{}", store.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the models API.
    pub fn models(&self) -> ModelsApi {
        ModelsApi::new(self.clone())
    }

    /// Access the embeddings API.
    pub fn embeddings(&self) -> EmbeddingsApi {
        EmbeddingsApi::new(self.clone())
    }

    /// Access the chat completions API.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    /// Access the vector stores API.
    pub fn vector_stores(&self) -> VectorStoresApi {
        VectorStoresApi::new(self.clone())
    }

    /// Access the threads API.
    pub fn threads(&self) -> ThreadsApi {
        ThreadsApi::new(self.clone())
    }

    /// Access the steps of one assistant run.
    ///
    /// Fails with [`Error::Config`] if either id cannot be used as a path
    /// segment.
    pub fn run_steps(&self, thread_id: &str, run_id: &str) -> Result<RunStepsApi> {
        RunStepsApi::new(self.clone(), thread_id, run_id)
    }

    /// Access the fine-tuning API.
    pub fn fine_tuning(&self) -> FineTuningApi {
        FineTuningApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .headers(self.inner.headers.clone())
            .timeout(self.inner.timeout)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: Decode>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(method = "GET", path, "sending request");
        let response = self.request(reqwest::Method::GET, url).send().await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: Decode,
        Q: serde::Serialize + std::fmt::Debug + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(method = "GET", path, ?query, "sending request");
        let response = self
            .request(reqwest::Method::GET, url)
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: Decode,
        B: Encode + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(method = "POST", path, "sending request");
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body.encode())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete<T: Decode>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(method = "DELETE", path, "sending request");
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch one page of a list endpoint.
    ///
    /// The request is checked against the item type's bounds before anything
    /// is sent.
    pub(crate) async fn list<T>(&self, path: &str, request: &PageRequest) -> Result<PageResponse<T>>
    where
        T: Decode + Identified + ListResource,
    {
        let query = request.to_query_parameters(&T::BOUNDS)?;
        let page: PageResponse<T> = self.get_with_query(path, &query).await?;
        if !page.cursors_consistent() && page.first_id.is_some() {
            tracing::warn!(
                path,
                first_id = ?page.first_id,
                last_id = ?page.last_id,
                "list cursors do not match page items"
            );
        }
        Ok(page.with_item_cursors())
    }

    /// Stream every item of a list endpoint, fetching pages on demand.
    ///
    /// The first error ends the stream.
    pub(crate) fn list_all<T>(
        &self,
        path: String,
        request: PageRequest,
    ) -> impl Stream<Item = Result<T>> + Send + use<T>
    where
        T: Decode + Identified + ListResource + Send + 'static,
    {
        let client = self.clone();
        stream::try_unfold(Paginator::new(request), move |mut paginator| {
            let client = client.clone();
            let path = path.clone();
            async move {
                let Some(request) = paginator.next_request().cloned() else {
                    return Ok(None);
                };
                let page: PageResponse<T> = client.list(&path, &request).await?;
                paginator.advance(&page);
                tracing::trace!(
                    path = %path,
                    pages = paginator.pages_seen(),
                    items = page.len(),
                    "fetched page"
                );
                Ok::<_, Error>(Some((page.data, paginator)))
            }
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, Error>)))
        .try_flatten()
    }

    /// Handle a response, decoding the body or error.
    async fn handle_response<T: Decode>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }
        let url = response.url().clone();
        let body: Value = response.json().await?;
        T::decode(&body).map_err(|e| {
            tracing::debug!(url = %url, error = %e, "response did not match the model");
            Error::from(e)
        })
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let url = response.url().clone();

        let parsed = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<ErrorResponse>(&bytes).ok(),
            Err(e) => {
                tracing::debug!(error = %e, "failed to read error body");
                None
            }
        };
        tracing::warn!(url = %url, status, "request failed");

        match parsed {
            Some(ErrorResponse { error }) => {
                if status == 404 {
                    Error::NotFound(error.message)
                } else if status == 401 {
                    Error::Auth(error.message)
                } else {
                    Error::Api {
                        status,
                        code: error.code_string(),
                        error_type: error.error_type,
                        message: error.message,
                    }
                }
            }
            None => Error::Api {
                status,
                error_type: None,
                code: None,
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating an [`OpenAiClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            headers: Vec::new(),
            http: None,
        }
    }

    /// Create a builder honouring `OPENAI_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::new();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            builder.base_url = url;
        }
        builder
    }

    /// Set the API root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent. Ignored when a client is supplied.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<OpenAiClient> {
        // Parse and normalize base URL
        let mut base_url = Url::parse(&self.base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Config(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Config(format!("invalid value for header {name}")))?;
            headers.append(name, value);
        }

        let http = match self.http {
            Some(http) => http,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("openai-client/{}", env!("CARGO_PKG_VERSION")));
                reqwest::Client::builder().user_agent(user_agent).build()?
            }
        };

        Ok(OpenAiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/v1")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/v1/");
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/v1")
            .build()
            .unwrap();

        let url = client.url("vector_stores").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/vector_stores");

        let url = client.url("/threads/t1/runs/r1/steps").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/threads/t1/runs/r1/steps");
    }

    #[test]
    fn test_path_segment_escapes_ids() {
        assert_eq!(path_segment("vs_1").unwrap(), "vs_1");
        assert_eq!(path_segment("a/b?c#d").unwrap(), "a%2Fb%3Fc%23d");
        for id in ["", ".", ".."] {
            assert!(matches!(path_segment(id), Err(Error::Config(_))), "{id:?}");
        }

        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/v1")
            .build()
            .unwrap();
        let path = format!("vector_stores/{}", path_segment("../models").unwrap());
        assert_eq!(
            client.url(&path).unwrap().as_str(),
            "http://localhost:8080/v1/vector_stores/..%2Fmodels"
        );
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let result = ClientBuilder::new().header("bad header", "x").build();
        assert!(matches!(result, Err(Error::Config(_))));

        let result = ClientBuilder::new().header("X-Ok", "line\nbreak").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_env_lookup() {
        let builder = ClientBuilder::from_lookup(|key| {
            (key == BASE_URL_ENV).then(|| "http://proxy.internal/openai".to_string())
        });
        let client = builder.build().unwrap();
        assert_eq!(client.base_url().as_str(), "http://proxy.internal/openai/");

        let builder = ClientBuilder::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(builder.build().unwrap().base_url().as_str(), DEFAULT_BASE_URL);
    }
}
