//! Messages posted to assistant threads.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::{Decode, Encode, ObjectReader, ObjectWriter};
use crate::error::Result;

crate::wire_string_enum! {
    /// Author of a thread message.
    pub enum MessageRole {
        User => "user",
        Assistant => "assistant",
    }
}

impl Default for MessageRole {
    fn default() -> Self {
        MessageRole::User
    }
}

/// A message to add to a thread.
///
/// `file_ids` and `metadata` are left out of the body when unset or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadMessageRequest {
    /// Defaults to `user`.
    pub role: MessageRole,
    pub content: String,
    /// Up to 10 files the message may use.
    pub file_ids: Option<Vec<String>>,
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl ThreadMessageRequest {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            file_ids: None,
            metadata: None,
        }
    }

    pub fn with_role(mut self, role: MessageRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_file(mut self, file_id: impl Into<String>) -> Self {
        self.file_ids.get_or_insert_with(Vec::new).push(file_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

impl Encode for ThreadMessageRequest {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("role", &self.role).field("content", &self.content);
        if let Some(file_ids) = self.file_ids.as_ref().filter(|ids| !ids.is_empty()) {
            out.field("file_ids", file_ids);
        }
        if let Some(metadata) = self.metadata.as_ref().filter(|m| !m.is_empty()) {
            out.field("metadata", metadata);
        }
        out.into_value()
    }
}

impl Decode for ThreadMessageRequest {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "ThreadMessageRequest")?;
        Ok(Self {
            role: fields.or_default("role")?,
            content: fields.required("content")?,
            file_ids: fields.nullable("file_ids")?,
            metadata: fields.nullable("metadata")?,
        })
    }
}

crate::impl_serde_via_wire!(ThreadMessageRequest);
