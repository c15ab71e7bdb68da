//! API endpoint implementations.

mod chat;
mod embeddings;
mod fine_tuning;
mod models;
mod run_steps;
mod threads;
mod vector_stores;

pub use chat::ChatApi;
pub use embeddings::EmbeddingsApi;
pub use fine_tuning::FineTuningApi;
pub use models::ModelsApi;
pub use run_steps::RunStepsApi;
pub use threads::ThreadsApi;
pub use vector_stores::VectorStoresApi;
