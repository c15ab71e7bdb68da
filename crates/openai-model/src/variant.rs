//! Discriminator-keyed registries for closed sets of record shapes.
//!
//! A polymorphic field on the wire is a flat object whose discriminator key
//! (usually `"type"`) selects the shape of the remaining keys:
//!
//! ```json
//! {"type": "function", "id": "call_1", "function": {"name": "f", "arguments": "{}"}}
//! ```
//!
//! Each concrete payload implements [`VariantPayload`] and owns its tag. The
//! [`variant_record!`](crate::variant_record) macro groups payloads into an
//! enum and builds a [`VariantRegistry`] for it on first use. The same
//! `TAG` constant is read on both the encode and the decode path.

use std::collections::HashMap;

use serde_json::Value;

use crate::codec::{ObjectReader, ObjectWriter};
use crate::error::{Result, WireError};

/// A concrete payload shape inside a variant envelope.
pub trait VariantPayload: Sized {
    /// The discriminator for this payload. Exact, case-sensitive.
    const TAG: &'static str;

    /// Write the payload's keys. Must not write the discriminator key.
    fn write_fields(&self, out: &mut ObjectWriter);

    /// Read the payload's keys from the envelope.
    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self>;
}

/// An enum over a closed set of payloads sharing one envelope.
pub trait VariantRecord: Sized + 'static {
    /// The registry for this record type.
    fn registry() -> &'static VariantRegistry<Self>;

    /// Discriminator of the populated payload.
    fn discriminator(&self) -> &'static str;

    /// Write the populated payload's keys.
    fn write_payload(&self, out: &mut ObjectWriter);
}

/// Registry row: a tag and the decoder for its payload.
pub struct VariantEntry<V> {
    tag: &'static str,
    decode: fn(&ObjectReader<'_>) -> Result<V>,
}

impl<V> VariantEntry<V> {
    /// Row for payload type `P`.
    pub fn of<P>() -> Self
    where
        P: VariantPayload,
        V: From<P>,
    {
        Self {
            tag: P::TAG,
            decode: decode_payload::<P, V>,
        }
    }

    /// The row's discriminator.
    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

fn decode_payload<P: VariantPayload, V: From<P>>(fields: &ObjectReader<'_>) -> Result<V> {
    P::read_fields(fields).map(V::from)
}

/// Bidirectional mapping between discriminators and payload decoders.
///
/// Built once per record type and read-only afterwards.
pub struct VariantRegistry<V> {
    name: &'static str,
    key: &'static str,
    entries: Vec<VariantEntry<V>>,
    index: HashMap<&'static str, usize>,
}

impl<V: VariantRecord> VariantRegistry<V> {
    /// Build a registry.
    ///
    /// # Panics
    ///
    /// Panics if two entries share a tag.
    pub fn new(name: &'static str, key: &'static str, entries: Vec<VariantEntry<V>>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.tag, i).is_some() {
                panic!("duplicate discriminator {:?} in {name} registry", entry.tag);
            }
        }
        tracing::trace!(registry = name, key, variants = entries.len(), "built variant registry");
        Self {
            name,
            key,
            entries,
            index,
        }
    }

    /// Registry name, used in errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The discriminator key in the envelope.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// All registered tags, in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(VariantEntry::tag)
    }

    /// Look up the entry for a tag.
    pub fn resolve(&self, tag: &str) -> Option<&VariantEntry<V>> {
        self.index.get(tag).map(|&i| &self.entries[i])
    }

    /// Returns true if the tag is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// The discriminator for a record, checked against the registry.
    ///
    /// # Panics
    ///
    /// Panics if the record's payload type was never registered.
    pub fn discriminator_of(&self, record: &V) -> &'static str {
        let tag = record.discriminator();
        assert!(
            self.contains(tag),
            "payload tag {tag:?} is not registered in the {} registry",
            self.name
        );
        tag
    }

    /// Decode a flat envelope.
    pub fn decode(&self, value: &Value) -> Result<V> {
        let fields = ObjectReader::new(value, self.name)?;
        let tag = fields.tag(self.key)?;
        let Some(entry) = self.resolve(tag) else {
            tracing::debug!(registry = self.name, tag, "unknown variant tag");
            return Err(WireError::unknown_tag(self.name, tag).at(self.key));
        };
        (entry.decode)(&fields)
    }

    /// Encode a record as a flat envelope, discriminator first.
    pub fn encode(&self, record: &V) -> Value {
        let tag = self.discriminator_of(record);
        let mut out = ObjectWriter::new();
        out.field(self.key, tag);
        record.write_payload(&mut out);
        out.into_value()
    }
}

/// Declares a variant record enum over payload types.
///
/// ```ignore
/// variant_record! {
///     /// Output of a code interpreter call.
///     pub enum CodeInterpreterOutput: "type" {
///         Logs(LogsOutput),
///         Image(ImageOutput),
///     }
/// }
/// ```
///
/// Generates the enum, `From` conversions from each payload, the
/// [`VariantRecord`] impl with its registry, `Encode`/`Decode` and serde
/// adapters.
#[macro_export]
macro_rules! variant_record {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $key:literal {
            $( $(#[$vmeta:meta])* $variant:ident($payload:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant($payload), )+
        }

        $(
            impl ::std::convert::From<$payload> for $name {
                fn from(payload: $payload) -> Self {
                    $name::$variant(payload)
                }
            }
        )+

        impl $crate::variant::VariantRecord for $name {
            fn registry() -> &'static $crate::variant::VariantRegistry<Self> {
                static REGISTRY: ::std::sync::OnceLock<$crate::variant::VariantRegistry<$name>> =
                    ::std::sync::OnceLock::new();
                REGISTRY.get_or_init(|| {
                    $crate::variant::VariantRegistry::new(
                        stringify!($name),
                        $key,
                        vec![$($crate::variant::VariantEntry::of::<$payload>()),+],
                    )
                })
            }

            fn discriminator(&self) -> &'static str {
                match self {
                    $( $name::$variant(_) => <$payload as $crate::variant::VariantPayload>::TAG, )+
                }
            }

            fn write_payload(&self, out: &mut $crate::codec::ObjectWriter) {
                match self {
                    $( $name::$variant(payload) => {
                        $crate::variant::VariantPayload::write_fields(payload, out)
                    } )+
                }
            }
        }

        impl $crate::codec::Encode for $name {
            fn encode(&self) -> ::serde_json::Value {
                <Self as $crate::variant::VariantRecord>::registry().encode(self)
            }
        }

        impl $crate::codec::Decode for $name {
            fn decode(value: &::serde_json::Value) -> $crate::error::Result<Self> {
                <Self as $crate::variant::VariantRecord>::registry().decode(value)
            }
        }

        $crate::impl_serde_via_wire!($name);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decode, Encode};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Circle {
        radius: f64,
    }

    impl VariantPayload for Circle {
        const TAG: &'static str = "circle";

        fn write_fields(&self, out: &mut ObjectWriter) {
            out.field("radius", &self.radius);
        }

        fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
            Ok(Self {
                radius: fields.required("radius")?,
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Label {
        text: String,
    }

    impl VariantPayload for Label {
        const TAG: &'static str = "label";

        fn write_fields(&self, out: &mut ObjectWriter) {
            out.field("text", &self.text);
        }

        fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
            Ok(Self {
                text: fields.required("text")?,
            })
        }
    }

    variant_record! {
        pub enum Shape: "kind" {
            Circle(Circle),
            Label(Label),
        }
    }

    #[test]
    fn test_flat_envelope() {
        let shape = Shape::from(Circle { radius: 2.5 });
        assert_eq!(shape.encode(), json!({"kind": "circle", "radius": 2.5}));
    }

    #[test]
    fn test_decode_dispatches_on_tag() {
        let decoded = Shape::decode(&json!({"kind": "label", "text": "hi"})).unwrap();
        assert_eq!(decoded, Shape::Label(Label { text: "hi".into() }));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let err = Shape::decode(&json!({"kind": "Circle", "radius": 1})).unwrap_err();
        assert_eq!(err.unknown_tag_value(), Some("Circle"));
        assert_eq!(err.field(), Some("kind"));
    }

    #[test]
    fn test_missing_discriminator() {
        let err = Shape::decode(&json!({"radius": 1})).unwrap_err();
        assert_eq!(err, WireError::missing_field("kind", "Shape"));
    }

    #[test]
    fn test_payload_error_keeps_path() {
        let err = Shape::decode(&json!({"kind": "circle", "radius": "big"})).unwrap_err();
        assert_eq!(err.field(), Some("radius"));
    }

    #[test]
    fn test_registry_lookup_is_inverse() {
        let registry = Shape::registry();
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["circle", "label"]);
        let shape = Shape::from(Label { text: "x".into() });
        let tag = registry.discriminator_of(&shape);
        assert_eq!(registry.resolve(tag).map(VariantEntry::tag), Some(tag));
        assert!(registry.resolve("square").is_none());
    }

    #[test]
    fn test_serde_adapter() {
        let shape: Shape = serde_json::from_value(json!({"kind": "circle", "radius": 1.0})).unwrap();
        assert_eq!(serde_json::to_value(&shape).unwrap(), json!({"kind": "circle", "radius": 1.0}));
        assert!(serde_json::from_value::<Shape>(json!({"kind": "nope"})).is_err());
    }
}
