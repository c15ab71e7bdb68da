//! Models and fine-tuning job events.

use serde_json::Value;

use crate::codec::{Decode, Encode, ObjectReader, ObjectWriter};
use crate::error::Result;
use crate::pagination::{Identified, ListResource};

/// A model available to the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Model id, as passed to other endpoints.
    pub id: String,
    /// Unix timestamp (seconds).
    pub created: i64,
    /// Always `"model"`.
    pub object: String,
    /// Owning organization.
    pub owned_by: String,
}

impl Identified for Model {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Encode for Model {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)
            .field("created", &self.created)
            .field("object", &self.object)
            .field("owned_by", &self.owned_by);
        out.into_value()
    }
}

impl Decode for Model {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "Model")?;
        Ok(Self {
            id: fields.required("id")?,
            created: fields.required("created")?,
            object: fields.required("object")?,
            owned_by: fields.required("owned_by")?,
        })
    }
}

/// The unpaginated model listing.
///
/// Unlike cursor pages this envelope carries no `has_more` or cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelList {
    pub data: Vec<Model>,
}

impl Encode for ModelList {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("object", "list").field("data", &self.data);
        out.into_value()
    }
}

impl Decode for ModelList {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "ModelList")?;
        fields.literal("object", "list")?;
        Ok(Self {
            data: fields.required("data")?,
        })
    }
}

/// A status or metrics event emitted by a fine-tuning job.
#[derive(Debug, Clone, PartialEq)]
pub struct FineTuningJobEvent {
    pub id: String,
    /// Unix timestamp (seconds).
    pub created_at: i64,
    /// `info`, `warn` or `error`.
    pub level: String,
    pub message: String,
    /// Always `"fine_tuning.job.event"`.
    pub object: String,
    /// Structured payload, e.g. training metrics.
    pub data: Option<Value>,
    /// `message` or `metrics`.
    pub event_type: String,
}

impl Identified for FineTuningJobEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ListResource for FineTuningJobEvent {}

impl Encode for FineTuningJobEvent {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("level", &self.level)
            .field("message", &self.message)
            .field("object", &self.object)
            .omit_none("data", &self.data)
            .field("type", &self.event_type);
        out.into_value()
    }
}

impl Decode for FineTuningJobEvent {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "FineTuningJobEvent")?;
        Ok(Self {
            id: fields.required("id")?,
            created_at: fields.required("created_at")?,
            level: fields.required("level")?,
            message: fields.required("message")?,
            object: fields.required("object")?,
            data: fields.nullable("data")?,
            event_type: fields.required("type")?,
        })
    }
}

crate::impl_serde_via_wire!(Model, ModelList, FineTuningJobEvent);
