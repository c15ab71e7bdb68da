//! Typed wire model for an OpenAI-style JSON-over-HTTP API.
//!
//! Request and response bodies are plain Rust values that convert to and
//! from `serde_json::Value` without loss. Four building blocks carry the
//! parts of the wire format that plain serde derives get wrong:
//!
//! - [`OptionalField`] keeps "key absent", "key present with null" and
//!   "key present with a value" apart, so a modify request can clear a field
//!   without touching the others.
//! - [`WireUnion`] decodes a field whose value may take several unrelated
//!   JSON shapes by trying an ordered table of shape predicates.
//! - [`VariantRecord`] maps flat `{"type": "...", ...}` envelopes to enums
//!   through a per-type registry, shared by encoding and decoding.
//! - [`PageRequest`], [`PageResponse`] and [`Paginator`] model cursor based
//!   list endpoints. Nothing here performs I/O.
//!
//! # Example
//!
//! ```
//! use openai_model::{Decode, Encode, PageBounds, PageRequest, SortOrder};
//! use openai_model::runs::RunToolCall;
//! use serde_json::json;
//!
//! let call = RunToolCall::decode(&json!({
//!     "id": "call_1",
//!     "type": "function",
//!     "function": {"name": "lookup", "arguments": "{}", "output": null}
//! }))
//! .unwrap();
//! assert_eq!(call.encode()["type"], "function");
//!
//! let request = PageRequest::builder()
//!     .limit(50)
//!     .order(SortOrder::Desc)
//!     .build()
//!     .unwrap();
//! let query = request.to_query_parameters(&PageBounds::STANDARD).unwrap();
//! assert_eq!(query, vec![("limit", "50".to_string()), ("order", "desc".to_string())]);
//! ```
//!
//! # Resources
//!
//! - **Embeddings**: create request, input and vector unions
//! - **Chat**: create request, messages, tools, completions
//! - **Runs**: run steps and their tool calls
//! - **Vector stores**: stores, create and modify requests
//! - **Threads**: message requests
//! - **Models**: models and fine-tuning job events

pub mod chat;
pub mod codec;
pub mod embeddings;
pub mod error;
pub mod models;
pub mod optional;
pub mod pagination;
pub mod runs;
pub mod threads;
pub mod union;
pub mod variant;
pub mod vector_stores;

pub use codec::{Decode, Encode, NonEmpty, ObjectReader, ObjectWriter, from_json_str, to_json_string};
pub use error::{Result, WireError};
pub use optional::OptionalField;
pub use pagination::{
    Direction, Identified, ListResource, PageBounds, PageRequest, PageRequestBuilder,
    PageResponse, Paginator, SortOrder,
};
pub use union::{UnionArm, WireUnion, decode_union};
pub use variant::{VariantEntry, VariantPayload, VariantRecord, VariantRegistry};
