//! Embedding requests and responses.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::codec::{Decode, Encode, NonEmpty, ObjectReader, ObjectWriter};
use crate::error::{Result, WireError};
use crate::optional::OptionalField;
use crate::union::{UnionArm, WireUnion, decode_union, shape};

crate::wire_string_enum! {
    /// Format of the returned embedding vectors.
    pub enum EncodingFormat {
        /// A JSON array of numbers.
        Float => "float",
        /// A base64 string of little-endian `f32` values.
        Base64 => "base64",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedding vector
// ─────────────────────────────────────────────────────────────────────────────

/// An embedding as returned on the wire.
///
/// Which arm arrives depends on the request's `encoding_format`; the decoder
/// only looks at the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingVector {
    /// Plain numeric vector.
    Float(Vec<f64>),
    /// Base64 of the little-endian `f32` vector.
    Base64(String),
}

impl EmbeddingVector {
    /// The numeric vector, if this is the float arm.
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            EmbeddingVector::Float(v) => Some(v),
            EmbeddingVector::Base64(_) => None,
        }
    }

    /// The base64 blob, if this is the base64 arm.
    pub fn as_base64(&self) -> Option<&str> {
        match self {
            EmbeddingVector::Float(_) => None,
            EmbeddingVector::Base64(s) => Some(s),
        }
    }

    /// Materialize the vector as `f32`s, decoding the base64 arm.
    pub fn to_f32(&self) -> Result<Vec<f32>> {
        match self {
            EmbeddingVector::Float(v) => Ok(v.iter().map(|&x| x as f32).collect()),
            EmbeddingVector::Base64(s) => decode_f32_blob(s),
        }
    }

    /// Base64-encode a vector the way the server does.
    pub fn encode_f32(values: &[f32]) -> Self {
        let bytes: Vec<u8> = values.iter().flat_map(|x| x.to_le_bytes()).collect();
        EmbeddingVector::Base64(BASE64.encode(bytes))
    }
}

fn decode_f32_blob(blob: &str) -> Result<Vec<f32>> {
    let bytes = BASE64
        .decode(blob)
        .map_err(|e| WireError::MalformedWireValue {
            field: String::new(),
            expected: "base64 string",
            found: e.to_string(),
        })?;
    if bytes.len() % 4 != 0 {
        return Err(WireError::MalformedWireValue {
            field: String::new(),
            expected: "a whole number of f32 values",
            found: format!("{} bytes", bytes.len()),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

impl Encode for EmbeddingVector {
    fn encode(&self) -> Value {
        match self {
            EmbeddingVector::Float(v) => v.encode(),
            EmbeddingVector::Base64(s) => s.encode(),
        }
    }
}

impl WireUnion for EmbeddingVector {
    const NAME: &'static str = "EmbeddingVector";
    const ARMS: &'static [UnionArm<Self>] = &[
        UnionArm {
            shape: "array of numbers",
            matches: shape::number_array,
            build: |v| Vec::<f64>::decode(v).map(EmbeddingVector::Float),
        },
        UnionArm {
            shape: "string",
            matches: shape::string,
            build: |v| String::decode(v).map(EmbeddingVector::Base64),
        },
    ];

    fn shape(&self) -> &'static str {
        match self {
            EmbeddingVector::Float(_) => "array of numbers",
            EmbeddingVector::Base64(_) => "string",
        }
    }
}

impl Decode for EmbeddingVector {
    fn decode(value: &Value) -> Result<Self> {
        decode_union(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedding input
// ─────────────────────────────────────────────────────────────────────────────

/// Text or token input to embed.
///
/// Array arms are [`NonEmpty`]: an empty array carries no shape to tell the
/// arms apart, so it can neither be built nor decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingInput {
    /// Several token arrays.
    TokenBatch(NonEmpty<NonEmpty<u32>>),
    /// One token array.
    Tokens(NonEmpty<u32>),
    /// Several strings.
    TextBatch(NonEmpty<String>),
    /// One string.
    Text(String),
}

impl EmbeddingInput {
    /// A single string.
    pub fn text(text: impl Into<String>) -> Self {
        EmbeddingInput::Text(text.into())
    }

    /// Several strings; fails if `texts` is empty.
    pub fn texts(texts: Vec<String>) -> Result<Self> {
        NonEmpty::try_from(texts).map(EmbeddingInput::TextBatch)
    }

    /// One token array; fails if `tokens` is empty.
    pub fn tokens(tokens: Vec<u32>) -> Result<Self> {
        NonEmpty::try_from(tokens).map(EmbeddingInput::Tokens)
    }

    /// Several token arrays; fails if the batch or any row is empty.
    pub fn token_batch(batch: Vec<Vec<u32>>) -> Result<Self> {
        let rows = batch
            .into_iter()
            .enumerate()
            .map(|(i, row)| NonEmpty::try_from(row).map_err(|e| e.at(&format!("[{i}]"))))
            .collect::<Result<Vec<_>>>()?;
        NonEmpty::try_from(rows).map(EmbeddingInput::TokenBatch)
    }
}

impl From<&str> for EmbeddingInput {
    fn from(text: &str) -> Self {
        EmbeddingInput::Text(text.to_string())
    }
}

impl From<String> for EmbeddingInput {
    fn from(text: String) -> Self {
        EmbeddingInput::Text(text)
    }
}

impl From<NonEmpty<String>> for EmbeddingInput {
    fn from(texts: NonEmpty<String>) -> Self {
        EmbeddingInput::TextBatch(texts)
    }
}

impl TryFrom<Vec<String>> for EmbeddingInput {
    type Error = WireError;

    fn try_from(texts: Vec<String>) -> Result<Self> {
        Self::texts(texts)
    }
}

impl Encode for EmbeddingInput {
    fn encode(&self) -> Value {
        match self {
            EmbeddingInput::TokenBatch(v) => v.encode(),
            EmbeddingInput::Tokens(v) => v.encode(),
            EmbeddingInput::TextBatch(v) => v.encode(),
            EmbeddingInput::Text(s) => s.encode(),
        }
    }
}

impl WireUnion for EmbeddingInput {
    const NAME: &'static str = "EmbeddingInput";
    const ARMS: &'static [UnionArm<Self>] = &[
        UnionArm {
            shape: "array of token arrays",
            matches: shape::non_empty_nested_number_array,
            build: |v| NonEmpty::decode(v).map(EmbeddingInput::TokenBatch),
        },
        UnionArm {
            shape: "token array",
            matches: shape::non_empty_number_array,
            build: |v| NonEmpty::decode(v).map(EmbeddingInput::Tokens),
        },
        UnionArm {
            shape: "array of strings",
            matches: shape::non_empty_string_array,
            build: |v| NonEmpty::decode(v).map(EmbeddingInput::TextBatch),
        },
        UnionArm {
            shape: "string",
            matches: shape::string,
            build: |v| String::decode(v).map(EmbeddingInput::Text),
        },
    ];

    fn shape(&self) -> &'static str {
        match self {
            EmbeddingInput::TokenBatch(_) => "array of token arrays",
            EmbeddingInput::Tokens(_) => "token array",
            EmbeddingInput::TextBatch(_) => "array of strings",
            EmbeddingInput::Text(_) => "string",
        }
    }
}

impl Decode for EmbeddingInput {
    fn decode(value: &Value) -> Result<Self> {
        decode_union(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for creating embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingCreateRequest {
    /// Input to embed.
    pub input: EmbeddingInput,
    /// Model id.
    pub model: String,
    /// Format for the returned vectors.
    pub encoding_format: OptionalField<EncodingFormat>,
    /// Number of output dimensions, for models that support it.
    pub dimensions: OptionalField<u32>,
    /// End-user identifier.
    pub user: OptionalField<String>,
}

impl EmbeddingCreateRequest {
    /// Create a request with only the required fields.
    pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
        Self {
            input: input.into(),
            model: model.into(),
            encoding_format: OptionalField::Absent,
            dimensions: OptionalField::Absent,
            user: OptionalField::Absent,
        }
    }

    /// Set the encoding format.
    pub fn with_encoding_format(mut self, format: EncodingFormat) -> Self {
        self.encoding_format = OptionalField::Present(format);
        self
    }

    /// Set the output dimensions.
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = OptionalField::Present(dimensions);
        self
    }

    /// Set the end-user identifier.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = OptionalField::Present(user.into());
        self
    }
}

impl Encode for EmbeddingCreateRequest {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("input", &self.input)
            .field("model", &self.model)
            .optional("encoding_format", &self.encoding_format)
            .optional("dimensions", &self.dimensions)
            .optional("user", &self.user);
        out.into_value()
    }
}

impl Decode for EmbeddingCreateRequest {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "EmbeddingCreateRequest")?;
        Ok(Self {
            input: fields.required("input")?,
            model: fields.required("model")?,
            encoding_format: fields.optional("encoding_format")?,
            dimensions: fields.optional("dimensions")?,
            user: fields.optional("user")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// One embedding in a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// Position of the input this embedding belongs to.
    pub index: u32,
    /// The vector.
    pub embedding: EmbeddingVector,
    /// Always `"embedding"`.
    pub object: String,
}

impl Encode for Embedding {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("object", &self.object)
            .field("index", &self.index)
            .field("embedding", &self.embedding);
        out.into_value()
    }
}

impl Decode for Embedding {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "Embedding")?;
        Ok(Self {
            index: fields.required("index")?,
            embedding: fields.required("embedding")?,
            object: fields.required("object")?,
        })
    }
}

/// Token accounting for an embeddings call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingUsage {
    /// Tokens in the input.
    pub prompt_tokens: u32,
    /// Total tokens billed.
    pub total_tokens: u32,
}

impl Encode for EmbeddingUsage {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("prompt_tokens", &self.prompt_tokens)
            .field("total_tokens", &self.total_tokens);
        out.into_value()
    }
}

impl Decode for EmbeddingUsage {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "EmbeddingUsage")?;
        Ok(Self {
            prompt_tokens: fields.required("prompt_tokens")?,
            total_tokens: fields.required("total_tokens")?,
        })
    }
}

/// Response body for creating embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    /// Always `"list"`.
    pub object: String,
    /// One embedding per input.
    pub data: Vec<Embedding>,
    /// Model that produced the embeddings.
    pub model: String,
    /// Token accounting.
    pub usage: EmbeddingUsage,
}

impl Encode for EmbeddingResponse {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("object", &self.object)
            .field("data", &self.data)
            .field("model", &self.model)
            .field("usage", &self.usage);
        out.into_value()
    }
}

impl Decode for EmbeddingResponse {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "EmbeddingResponse")?;
        Ok(Self {
            object: fields.required("object")?,
            data: fields.required("data")?,
            model: fields.required("model")?,
            usage: fields.required("usage")?,
        })
    }
}

crate::impl_serde_via_wire!(
    EmbeddingVector,
    EmbeddingInput,
    EmbeddingCreateRequest,
    Embedding,
    EmbeddingUsage,
    EmbeddingResponse,
);
