//! Vector stores and their create and modify requests.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::{Decode, Encode, ObjectReader, ObjectWriter};
use crate::error::Result;
use crate::optional::OptionalField;
use crate::pagination::{Identified, ListResource};

crate::wire_string_enum! {
    /// Timestamp an expiration policy counts from.
    pub enum ExpirationAnchor {
        /// Time of last activity.
        LastActiveAt => "last_active_at",
    }
}

/// Expiration policy of a vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiresAfter {
    /// What the countdown starts from.
    pub anchor: ExpirationAnchor,
    /// Days after the anchor.
    pub days: u32,
}

impl ExpiresAfter {
    /// Expire `days` after the last activity.
    pub fn days_after_last_activity(days: u32) -> Self {
        Self {
            anchor: ExpirationAnchor::LastActiveAt,
            days,
        }
    }
}

impl Encode for ExpiresAfter {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("anchor", &self.anchor).field("days", &self.days);
        out.into_value()
    }
}

impl Decode for ExpiresAfter {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "ExpiresAfter")?;
        Ok(Self {
            anchor: fields.required("anchor")?,
            days: fields.required("days")?,
        })
    }
}

crate::wire_string_enum! {
    /// Processing state of a vector store.
    pub enum VectorStoreStatus {
        /// Expired and no longer usable.
        Expired => "expired",
        /// Files still being processed.
        InProgress => "in_progress",
        /// Ready for use.
        Completed => "completed",
    }
}

/// File counts of a vector store by processing state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCounts {
    pub in_progress: u32,
    pub completed: u32,
    pub failed: u32,
    pub cancelled: u32,
    pub total: u32,
}

impl Encode for FileCounts {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("in_progress", &self.in_progress)
            .field("completed", &self.completed)
            .field("failed", &self.failed)
            .field("cancelled", &self.cancelled)
            .field("total", &self.total);
        out.into_value()
    }
}

impl Decode for FileCounts {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "FileCounts")?;
        Ok(Self {
            in_progress: fields.required("in_progress")?,
            completed: fields.required("completed")?,
            failed: fields.required("failed")?,
            cancelled: fields.required("cancelled")?,
            total: fields.required("total")?,
        })
    }
}

/// A vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    pub id: String,
    /// Always `"vector_store"`.
    pub object: String,
    pub created_at: i64,
    pub name: Option<String>,
    pub usage_bytes: u64,
    pub file_counts: FileCounts,
    pub status: VectorStoreStatus,
    pub expires_after: Option<ExpiresAfter>,
    pub expires_at: Option<i64>,
    pub last_active_at: Option<i64>,
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl Identified for VectorStore {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ListResource for VectorStore {}

impl Encode for VectorStore {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)
            .field("object", &self.object)
            .field("created_at", &self.created_at)
            .nullable("name", &self.name)
            .field("usage_bytes", &self.usage_bytes)
            .field("file_counts", &self.file_counts)
            .field("status", &self.status)
            .omit_none("expires_after", &self.expires_after)
            .nullable("expires_at", &self.expires_at)
            .nullable("last_active_at", &self.last_active_at)
            .nullable("metadata", &self.metadata);
        out.into_value()
    }
}

impl Decode for VectorStore {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "VectorStore")?;
        Ok(Self {
            id: fields.required("id")?,
            object: fields.required("object")?,
            created_at: fields.required("created_at")?,
            name: fields.nullable("name")?,
            usage_bytes: fields.or_default("usage_bytes")?,
            file_counts: fields.or_default("file_counts")?,
            status: fields.required("status")?,
            expires_after: fields.nullable("expires_after")?,
            expires_at: fields.nullable("expires_at")?,
            last_active_at: fields.nullable("last_active_at")?,
            metadata: fields.nullable("metadata")?,
        })
    }
}

/// Request body for creating a vector store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorStoreCreateRequest {
    /// Files to add on creation.
    pub file_ids: OptionalField<Vec<String>>,
    pub name: OptionalField<String>,
    pub expires_after: OptionalField<ExpiresAfter>,
    /// Up to 16 key-value pairs.
    pub metadata: OptionalField<BTreeMap<String, String>>,
}

impl VectorStoreCreateRequest {
    /// An empty request; the server picks every default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = OptionalField::Present(name.into());
        self
    }

    pub fn with_file_ids(mut self, file_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.file_ids = OptionalField::Present(file_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_expires_after(mut self, expires_after: ExpiresAfter) -> Self {
        self.expires_after = expires_after.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_metadata(&mut self.metadata, key.into(), value.into());
        self
    }
}

impl Encode for VectorStoreCreateRequest {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.optional("file_ids", &self.file_ids)
            .optional("name", &self.name)
            .optional("expires_after", &self.expires_after)
            .optional("metadata", &self.metadata);
        out.into_value()
    }
}

impl Decode for VectorStoreCreateRequest {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "VectorStoreCreateRequest")?;
        Ok(Self {
            file_ids: fields.optional("file_ids")?,
            name: fields.optional("name")?,
            expires_after: fields.optional("expires_after")?,
            metadata: fields.optional("metadata")?,
        })
    }
}

/// Request body for modifying a vector store.
///
/// Absent fields are left unchanged; null fields are cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorStoreModifyRequest {
    pub name: OptionalField<String>,
    pub expires_after: OptionalField<ExpiresAfter>,
    pub metadata: OptionalField<BTreeMap<String, String>>,
}

impl VectorStoreModifyRequest {
    /// A request that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = OptionalField::Present(name.into());
        self
    }

    /// Remove the store's name.
    pub fn clear_name(mut self) -> Self {
        self.name = OptionalField::Null;
        self
    }

    pub fn with_expires_after(mut self, expires_after: ExpiresAfter) -> Self {
        self.expires_after = expires_after.into();
        self
    }

    /// Remove the expiration policy.
    pub fn clear_expires_after(mut self) -> Self {
        self.expires_after = OptionalField::Null;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_metadata(&mut self.metadata, key.into(), value.into());
        self
    }

    /// Remove all metadata.
    pub fn clear_metadata(mut self) -> Self {
        self.metadata = OptionalField::Null;
        self
    }

    /// Returns true if sending this request would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_absent() && self.expires_after.is_absent() && self.metadata.is_absent()
    }
}

impl Encode for VectorStoreModifyRequest {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.optional("name", &self.name)
            .optional("expires_after", &self.expires_after)
            .optional("metadata", &self.metadata);
        out.into_value()
    }
}

impl Decode for VectorStoreModifyRequest {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "VectorStoreModifyRequest")?;
        Ok(Self {
            name: fields.optional("name")?,
            expires_after: fields.optional("expires_after")?,
            metadata: fields.optional("metadata")?,
        })
    }
}

fn insert_metadata(
    metadata: &mut OptionalField<BTreeMap<String, String>>,
    key: String,
    value: String,
) {
    match metadata {
        OptionalField::Present(map) => {
            map.insert(key, value);
        }
        other => *other = OptionalField::Present(BTreeMap::from([(key, value)])),
    }
}

/// Result of a delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionStatus {
    /// Id of the deleted object.
    pub id: String,
    /// E.g. `"vector_store.deleted"`.
    pub object: String,
    pub deleted: bool,
}

impl Encode for DeletionStatus {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)
            .field("object", &self.object)
            .field("deleted", &self.deleted);
        out.into_value()
    }
}

impl Decode for DeletionStatus {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "DeletionStatus")?;
        Ok(Self {
            id: fields.required("id")?,
            object: fields.required("object")?,
            deleted: fields.required("deleted")?,
        })
    }
}

crate::impl_serde_via_wire!(
    ExpiresAfter,
    FileCounts,
    VectorStore,
    VectorStoreCreateRequest,
    VectorStoreModifyRequest,
    DeletionStatus,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;
    use serde_json::json;

    #[test]
    fn test_modify_distinguishes_absent_and_null() {
        let request = VectorStoreModifyRequest::new()
            .with_name("docs")
            .clear_expires_after();
        assert_eq!(
            request.encode(),
            json!({"name": "docs", "expires_after": null})
        );
        assert!(VectorStoreModifyRequest::new().is_empty());
        assert_eq!(VectorStoreModifyRequest::new().encode(), json!({}));
    }

    #[test]
    fn test_modify_decode_keeps_null() {
        let request =
            VectorStoreModifyRequest::decode(&json!({"metadata": null})).unwrap();
        assert!(request.metadata.is_null());
        assert!(request.name.is_absent());
    }

    #[test]
    fn test_create_request() {
        let request = VectorStoreCreateRequest::new()
            .with_name("kb")
            .with_file_ids(["file_1", "file_2"])
            .with_expires_after(ExpiresAfter::days_after_last_activity(7))
            .with_metadata("team", "search")
            .with_metadata("env", "dev");
        assert_eq!(
            request.encode(),
            json!({
                "file_ids": ["file_1", "file_2"],
                "name": "kb",
                "expires_after": {"anchor": "last_active_at", "days": 7},
                "metadata": {"env": "dev", "team": "search"}
            })
        );
    }

    #[test]
    fn test_vector_store_decode() {
        let wire = json!({
            "id": "vs_1",
            "object": "vector_store",
            "created_at": 1_699_061_776,
            "name": null,
            "usage_bytes": 139_920,
            "file_counts": {"in_progress": 0, "completed": 3, "failed": 0, "cancelled": 0, "total": 3},
            "status": "completed",
            "expires_at": null,
            "last_active_at": 1_699_061_776,
            "metadata": {}
        });
        let store = VectorStore::decode(&wire).unwrap();
        assert_eq!(store.name, None);
        assert_eq!(store.file_counts.total, 3);
        assert_eq!(store.status, VectorStoreStatus::Completed);
        assert_eq!(store.encode(), wire);
    }

    #[test]
    fn test_bad_anchor() {
        let err = ExpiresAfter::decode(&json!({"anchor": "created_at", "days": 1})).unwrap_err();
        assert!(matches!(err, WireError::MalformedWireValue { .. }));
        assert_eq!(err.field(), Some("anchor"));
    }
}
