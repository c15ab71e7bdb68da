//! Thin async HTTP client over the `openai-model` wire types.
//!
//! Requests are encoded and responses decoded with the model crate's
//! `Encode`/`Decode` pairs, so absent-versus-null fields, union shapes and
//! tagged variants behave exactly as they do offline. List endpoints take a
//! [`PageRequest`](openai_model::PageRequest) and can be walked to the end
//! as a `futures::Stream`.
//!
//! # Example
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use openai_client::{OpenAiClient, Result};
//! use openai_model::{PageRequest, SortOrder};
//!
//! # async fn example() -> Result<()> {
//! let client = OpenAiClient::builder()
//!     .header("Authorization", "Bearer sk-...")
//!     .build()?;
//!
//! let request = PageRequest::builder().limit(100).order(SortOrder::Asc).build()?;
//! let steps: Vec<_> = client
//!     .run_steps("thread_abc", "run_abc")?
//!     .list_all(request)
//!     .try_collect()
//!     .await?;
//! println!("{} steps", steps.len());
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Models**: list, retrieve
//! - **Embeddings**: create
//! - **Chat**: create completions (non-streamed)
//! - **Vector stores**: list, create, retrieve, modify, delete
//! - **Threads**: add messages
//! - **Run steps**: list, retrieve
//! - **Fine-tuning**: list job events
//!
//! Retries, rate limiting and credential management are left to the caller.

pub mod api;
pub mod client;
pub mod error;

pub use client::{BASE_URL_ENV, ClientBuilder, DEFAULT_BASE_URL, OpenAiClient};
pub use error::{Error, Result};

pub use openai_model as model;
