//! Three-state optional fields for partial-update requests.
//!
//! Request objects in this API distinguish a key that is missing altogether
//! from a key that is explicitly `null`: the first leaves the server-side
//! value untouched, the second clears it. [`OptionalField`] models both next
//! to a present value so the two are never conflated.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::codec::Encode;

/// A field that is either absent, explicitly null, or present with a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum OptionalField<T> {
    /// The key is omitted from the wire object.
    #[default]
    Absent,
    /// The key is emitted with a JSON `null`.
    Null,
    /// The key is emitted with the encoded value.
    Present(T),
}

impl<T> OptionalField<T> {
    /// Returns true if the key is omitted.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns true if the key is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if a value is present.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Borrow the present value, if any.
    pub fn as_ref(&self) -> OptionalField<&T> {
        match self {
            Self::Absent => OptionalField::Absent,
            Self::Null => OptionalField::Null,
            Self::Present(v) => OptionalField::Present(v),
        }
    }

    /// The present value, collapsing `Absent` and `Null` to `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into the present value, collapsing `Absent` and `Null`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Map the present value, preserving `Absent` and `Null`.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> OptionalField<U> {
        match self {
            Self::Absent => OptionalField::Absent,
            Self::Null => OptionalField::Null,
            Self::Present(v) => OptionalField::Present(f(v)),
        }
    }

    /// Build from an `Option`, treating `None` as an explicit null.
    pub fn nullable(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Present(v),
            None => Self::Null,
        }
    }

    /// Build from an `Option`, treating `None` as absent.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Present(v),
            None => Self::Absent,
        }
    }
}

impl<T> From<T> for OptionalField<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

/// Serializes `Null` as `null` and `Present` as the value.
///
/// Pair with `#[serde(default, skip_serializing_if = "OptionalField::is_absent")]`
/// so that `Absent` never produces a key.
impl<T: Serialize> Serialize for OptionalField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(v) => v.serialize(serializer),
            Self::Null | Self::Absent => serializer.serialize_none(),
        }
    }
}

/// Only called when the key exists; a missing key falls back to `Default`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionalField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Present))
    }
}

impl<T: Encode> OptionalField<T> {
    /// Encode the present value, keeping the tri-state.
    pub fn encode(&self) -> OptionalField<Value> {
        self.as_ref().map(Encode::encode)
    }
}
