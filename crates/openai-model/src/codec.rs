//! Explicit encode/decode pairs between model types and JSON wire values.
//!
//! Every model type implements [`Encode`] and [`Decode`] by hand. Object
//! shaped types read their keys through an [`ObjectReader`], which attaches
//! the key to any nested failure, and write them through an [`ObjectWriter`],
//! which applies the absent/null/present discipline of [`OptionalField`].
//!
//! The [`impl_serde_via_wire!`](crate::impl_serde_via_wire) macro adapts both
//! traits to `serde`, so the same types work with `serde_json` and HTTP client
//! `.json(..)` helpers without a second, derived encoding.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::error::{Result, WireError};
use crate::optional::OptionalField;

/// Converts a value into its JSON wire form.
pub trait Encode {
    /// Encode into a wire value.
    fn encode(&self) -> Value;
}

/// Reconstructs a value from its JSON wire form.
pub trait Decode: Sized {
    /// Decode from a wire value.
    fn decode(value: &Value) -> Result<Self>;
}

/// Decode a value from JSON text.
pub fn from_json_str<T: Decode>(text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text)?;
    T::decode(&value)
}

/// Encode a value as compact JSON text.
pub fn to_json_string<T: Encode + ?Sized>(value: &T) -> String {
    value.encode().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Object access
// ─────────────────────────────────────────────────────────────────────────────

/// Typed, path-aware read access to a wire object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    type_name: &'static str,
}

impl<'a> ObjectReader<'a> {
    /// Wrap a wire value that must be an object.
    pub fn new(value: &'a Value, type_name: &'static str) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { map, type_name }),
            other => Err(WireError::malformed("object", other)),
        }
    }

    /// Wrap an already-extracted map.
    pub fn from_map(map: &'a Map<String, Value>, type_name: &'static str) -> Self {
        Self { map, type_name }
    }

    /// Name of the type being decoded.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The underlying map.
    pub fn raw(&self) -> &'a Map<String, Value> {
        self.map
    }

    /// Decode a key that must be present and non-null.
    pub fn required<T: Decode>(&self, key: &str) -> Result<T> {
        match self.map.get(key) {
            None => Err(WireError::missing_field(key, self.type_name)),
            Some(value) => T::decode(value).map_err(|e| e.at(key)),
        }
    }

    /// Decode a key that must be present but may be null.
    pub fn required_nullable<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        match self.map.get(key) {
            None => Err(WireError::missing_field(key, self.type_name)),
            Some(Value::Null) => Ok(None),
            Some(value) => T::decode(value).map(Some).map_err(|e| e.at(key)),
        }
    }

    /// Decode a key into its three states.
    pub fn optional<T: Decode>(&self, key: &str) -> Result<OptionalField<T>> {
        match self.map.get(key) {
            None => Ok(OptionalField::Absent),
            Some(Value::Null) => Ok(OptionalField::Null),
            Some(value) => T::decode(value)
                .map(OptionalField::Present)
                .map_err(|e| e.at(key)),
        }
    }

    /// Decode a key where absent and null both mean "no value".
    pub fn nullable<T: Decode>(&self, key: &str) -> Result<Option<T>> {
        self.optional(key).map(OptionalField::into_option)
    }

    /// Decode a key, falling back to `T::default()` when absent or null.
    pub fn or_default<T: Decode + Default>(&self, key: &str) -> Result<T> {
        self.nullable(key).map(Option::unwrap_or_default)
    }

    /// Borrow a required string key without copying it.
    pub fn tag(&self, key: &str) -> Result<&'a str> {
        match self.map.get(key) {
            None => Err(WireError::missing_field(key, self.type_name)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(WireError::malformed("string", other).at(key)),
        }
    }

    /// Require a string key to hold one fixed literal.
    pub fn literal(&self, key: &str, expected: &'static str) -> Result<()> {
        let found = self.tag(key)?;
        if found == expected {
            Ok(())
        } else {
            Err(WireError::MalformedWireValue {
                field: key.to_string(),
                expected,
                found: format!("{found:?}"),
            })
        }
    }
}

/// Builds a wire object key by key.
#[derive(Debug, Clone, Default)]
pub struct ObjectWriter {
    map: Map<String, Value>,
}

impl ObjectWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a key unconditionally.
    pub fn field<T: Encode + ?Sized>(&mut self, key: &str, value: &T) -> &mut Self {
        self.map.insert(key.to_string(), value.encode());
        self
    }

    /// Write a raw JSON value.
    pub fn raw(&mut self, key: &str, value: Value) -> &mut Self {
        self.map.insert(key.to_string(), value);
        self
    }

    /// Write an optional field: absent is skipped, null and present are written.
    pub fn optional<T: Encode>(&mut self, key: &str, value: &OptionalField<T>) -> &mut Self {
        match value.encode() {
            OptionalField::Absent => {}
            OptionalField::Null => {
                self.map.insert(key.to_string(), Value::Null);
            }
            OptionalField::Present(v) => {
                self.map.insert(key.to_string(), v);
            }
        }
        self
    }

    /// Write a key whose missing value is emitted as `null`.
    pub fn nullable<T: Encode>(&mut self, key: &str, value: &Option<T>) -> &mut Self {
        let encoded = value.as_ref().map_or(Value::Null, Encode::encode);
        self.map.insert(key.to_string(), encoded);
        self
    }

    /// Write a key only when the value is `Some`.
    pub fn omit_none<T: Encode>(&mut self, key: &str, value: &Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), v.encode());
        }
        self
    }

    /// Number of keys written so far.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no keys were written.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Finish as a map.
    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }

    /// Finish as a wire value.
    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Primitive impls
// ─────────────────────────────────────────────────────────────────────────────

impl Encode for Value {
    fn encode(&self) -> Value {
        self.clone()
    }
}

impl Decode for Value {
    fn decode(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl Encode for str {
    fn encode(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Encode for String {
    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Decode for String {
    fn decode(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WireError::malformed("string", value))
    }
}

impl Encode for bool {
    fn encode(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Decode for bool {
    fn decode(value: &Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| WireError::malformed("boolean", value))
    }
}

macro_rules! wire_unsigned {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Encode for $ty {
            fn encode(&self) -> Value {
                Value::Number(Number::from(*self))
            }
        }

        impl Decode for $ty {
            fn decode(value: &Value) -> Result<Self> {
                value
                    .as_u64()
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or_else(|| WireError::malformed($name, value))
            }
        }
    )*};
}

macro_rules! wire_signed {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Encode for $ty {
            fn encode(&self) -> Value {
                Value::Number(Number::from(*self))
            }
        }

        impl Decode for $ty {
            fn decode(value: &Value) -> Result<Self> {
                value
                    .as_i64()
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or_else(|| WireError::malformed($name, value))
            }
        }
    )*};
}

wire_unsigned!(u32 => "unsigned 32-bit integer", u64 => "unsigned 64-bit integer");
wire_signed!(i32 => "32-bit integer", i64 => "64-bit integer");

impl Encode for f64 {
    fn encode(&self) -> Value {
        // Non-finite floats have no JSON form.
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl Decode for f64 {
    fn decode(value: &Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| WireError::malformed("number", value))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| WireError::malformed("array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::decode(item).map_err(|e| e.at(&format!("[{i}]"))))
            .collect()
    }
}

/// A vector holding at least one item.
///
/// Used where an empty array would be indistinguishable from another wire
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmpty<T>(Vec<T>);

impl<T> NonEmpty<T> {
    /// Wrap `items`, or `None` if there are none.
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() { None } else { Some(Self(items)) }
    }

    /// The items as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> std::ops::Deref for NonEmpty<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> TryFrom<Vec<T>> for NonEmpty<T> {
    type Error = WireError;

    fn try_from(items: Vec<T>) -> Result<Self> {
        Self::new(items).ok_or_else(|| WireError::MalformedWireValue {
            field: String::new(),
            expected: "non-empty array",
            found: "empty array".to_string(),
        })
    }
}

impl<T> From<NonEmpty<T>> for Vec<T> {
    fn from(items: NonEmpty<T>) -> Self {
        items.0
    }
}

impl<T: Encode> Encode for NonEmpty<T> {
    fn encode(&self) -> Value {
        self.0.encode()
    }
}

impl<T: Decode> Decode for NonEmpty<T> {
    fn decode(value: &Value) -> Result<Self> {
        Vec::<T>::decode(value).and_then(Self::try_from)
    }
}

impl<T: Encode> Encode for BTreeMap<String, T> {
    fn encode(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.encode()))
                .collect(),
        )
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| WireError::malformed("object", value))?;
        map.iter()
            .map(|(k, v)| T::decode(v).map(|d| (k.clone(), d)).map_err(|e| e.at(k)))
            .collect()
    }
}

/// Implements `serde::Serialize` and `serde::Deserialize` for types that
/// implement [`Encode`] and [`Decode`].
#[macro_export]
macro_rules! impl_serde_via_wire {
    ($($ty:ty),+ $(,)?) => {$(
        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                ::serde::Serialize::serialize(&$crate::codec::Encode::encode(self), serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::std::result::Result<Self, D::Error> {
                let value = <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::codec::Decode>::decode(&value).map_err(::serde::de::Error::custom)
            }
        }
    )+};
}

/// Declares a fieldless enum encoded as one of a fixed set of strings.
#[macro_export]
macro_rules! wire_string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Wire form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::codec::Encode for $name {
            fn encode(&self) -> ::serde_json::Value {
                ::serde_json::Value::String(self.as_str().to_string())
            }
        }

        impl $crate::codec::Decode for $name {
            fn decode(value: &::serde_json::Value) -> $crate::error::Result<Self> {
                match value.as_str() {
                    $( Some($wire) => Ok($name::$variant), )+
                    Some(other) => Err($crate::error::WireError::MalformedWireValue {
                        field: String::new(),
                        expected: concat!("one of" $(, " ", stringify!($wire))+),
                        found: format!("{other:?}"),
                    }),
                    None => Err($crate::error::WireError::malformed("string", value)),
                }
            }
        }

        $crate::impl_serde_via_wire!($name);
    };
}

/// Returns true if the value is an array whose items all satisfy `pred`.
///
/// Vacuously true for the empty array.
pub fn is_array_of(value: &Value, pred: impl Fn(&Value) -> bool) -> bool {
    value.as_array().is_some_and(|items| items.iter().all(pred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_missing() {
        let value = json!({"a": 1});
        let reader = ObjectReader::new(&value, "Thing").unwrap();
        let err = reader.required::<String>("b").unwrap_err();
        assert_eq!(err, WireError::missing_field("b", "Thing"));
    }

    #[test]
    fn test_required_wrong_type_reports_field() {
        let value = json!({"a": "one"});
        let reader = ObjectReader::new(&value, "Thing").unwrap();
        let err = reader.required::<u32>("a").unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedWireValue { ref field, ref found, .. } if field == "a" && found == "string"
        ));
    }

    #[test]
    fn test_nested_array_path() {
        let value = json!({"ids": ["a", 2]});
        let reader = ObjectReader::new(&value, "Thing").unwrap();
        let err = reader.required::<Vec<String>>("ids").unwrap_err();
        assert_eq!(err.field(), Some("ids[1]"));
    }

    #[test]
    fn test_non_object_rejected() {
        let value = json!([1]);
        let err = ObjectReader::new(&value, "Thing").unwrap_err();
        assert_eq!(err, WireError::malformed("object", &value));
    }

    #[test]
    fn test_required_nullable_distinguishes_absent() {
        let value = json!({"first_id": null});
        let reader = ObjectReader::new(&value, "Page").unwrap();
        assert_eq!(reader.required_nullable::<String>("first_id").unwrap(), None);
        assert!(reader.required_nullable::<String>("last_id").is_err());
        assert_eq!(reader.nullable::<String>("last_id").unwrap(), None);
    }

    #[test]
    fn test_literal() {
        let value = json!({"object": "list"});
        let reader = ObjectReader::new(&value, "Page").unwrap();
        assert!(reader.literal("object", "list").is_ok());
        assert!(reader.literal("object", "model").is_err());
    }

    #[test]
    fn test_writer_states() {
        let mut w = ObjectWriter::new();
        w.optional("a", &OptionalField::<u32>::Absent)
            .optional("b", &OptionalField::<u32>::Null)
            .optional("c", &OptionalField::Present(7u32))
            .nullable("d", &None::<String>)
            .omit_none("e", &None::<String>);
        assert_eq!(w.into_value(), json!({"b": null, "c": 7, "d": null}));
    }

    #[test]
    fn test_integer_range_checked() {
        assert!(u32::decode(&json!(-1)).is_err());
        assert!(u32::decode(&json!(1.5)).is_err());
        assert_eq!(i64::decode(&json!(-3)).unwrap(), -3);
    }

    #[test]
    fn test_is_array_of() {
        assert!(is_array_of(&json!([1, 2.5]), Value::is_number));
        assert!(is_array_of(&json!([]), Value::is_number));
        assert!(!is_array_of(&json!([1, "x"]), Value::is_number));
        assert!(!is_array_of(&json!("x"), Value::is_number));
    }

    #[test]
    fn test_non_empty_rejects_empty() {
        assert!(NonEmpty::<u32>::new(vec![]).is_none());
        let err = NonEmpty::<u32>::decode(&json!([])).unwrap_err();
        assert!(matches!(err, WireError::MalformedWireValue { expected: "non-empty array", .. }));

        let items = NonEmpty::<u32>::decode(&json!([4, 5])).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.encode(), json!([4, 5]));
        assert_eq!(Vec::from(items), vec![4, 5]);
    }
}
