//! Fields whose wire value may take one of several unrelated shapes.
//!
//! A union declares its arms as a fixed, ordered table. Decoding walks the
//! table and builds the first arm whose shape predicate accepts the value, so
//! the more specific shapes must come first (an array of arrays of numbers
//! before an array of numbers before a string). Encoding is the populated
//! arm's own business and always re-emits that arm's shape.
//!
//! Only the shape is checked here; lengths and value ranges are not.

use serde_json::Value;

use crate::codec::{Encode, is_array_of};
use crate::error::{Result, WireError, json_type_name};

/// One arm of a union: a shape test and a constructor.
pub struct UnionArm<U> {
    /// Human readable name of the shape, for diagnostics.
    pub shape: &'static str,
    /// Returns true if the value has this arm's shape.
    pub matches: fn(&Value) -> bool,
    /// Builds the arm from a value the predicate accepted.
    pub build: fn(&Value) -> Result<U>,
}

/// A closed union over wire shapes.
pub trait WireUnion: Encode + Sized + 'static {
    /// Type name used in errors.
    const NAME: &'static str;

    /// The arms, most specific first.
    const ARMS: &'static [UnionArm<Self>];

    /// Name of the populated arm's shape.
    fn shape(&self) -> &'static str;
}

/// Decode a union by trying its arms in declaration order.
pub fn decode_union<U: WireUnion>(value: &Value) -> Result<U> {
    for arm in U::ARMS {
        if (arm.matches)(value) {
            return (arm.build)(value);
        }
    }
    tracing::debug!(
        union = U::NAME,
        json_type = json_type_name(value),
        expected = ?U::ARMS.iter().map(|arm| arm.shape).collect::<Vec<_>>(),
        "no union arm matched wire value"
    );
    Err(WireError::unrecognized_shape(U::NAME, value))
}

/// Shape predicates shared by union declarations.
pub mod shape {
    use super::*;

    /// A JSON string.
    pub fn string(value: &Value) -> bool {
        value.is_string()
    }

    /// A JSON object.
    pub fn object(value: &Value) -> bool {
        value.is_object()
    }

    /// An array of numbers, including the empty array.
    pub fn number_array(value: &Value) -> bool {
        is_array_of(value, Value::is_number)
    }

    /// A non-empty array of numbers.
    pub fn non_empty_number_array(value: &Value) -> bool {
        non_empty(value) && number_array(value)
    }

    /// An array of strings, including the empty array.
    pub fn string_array(value: &Value) -> bool {
        is_array_of(value, Value::is_string)
    }

    /// A non-empty array of strings.
    pub fn non_empty_string_array(value: &Value) -> bool {
        non_empty(value) && string_array(value)
    }

    /// A non-empty array whose items are all non-empty arrays of numbers.
    pub fn non_empty_nested_number_array(value: &Value) -> bool {
        non_empty(value) && is_array_of(value, non_empty_number_array)
    }

    fn non_empty(value: &Value) -> bool {
        value.as_array().is_some_and(|items| !items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Decode;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    enum Sample {
        Numbers(Vec<f64>),
        Text(String),
    }

    impl Encode for Sample {
        fn encode(&self) -> Value {
            match self {
                Sample::Numbers(v) => v.encode(),
                Sample::Text(s) => s.encode(),
            }
        }
    }

    impl WireUnion for Sample {
        const NAME: &'static str = "Sample";
        const ARMS: &'static [UnionArm<Self>] = &[
            UnionArm {
                shape: "array of numbers",
                matches: shape::number_array,
                build: |v| Vec::<f64>::decode(v).map(Sample::Numbers),
            },
            UnionArm {
                shape: "string",
                matches: shape::string,
                build: |v| String::decode(v).map(Sample::Text),
            },
        ];

        fn shape(&self) -> &'static str {
            match self {
                Sample::Numbers(_) => "array of numbers",
                Sample::Text(_) => "string",
            }
        }
    }

    #[test]
    fn test_first_matching_arm_wins() {
        let decoded: Sample = decode_union(&json!([1.0, 2])).unwrap();
        assert_eq!(decoded, Sample::Numbers(vec![1.0, 2.0]));
        assert_eq!(decoded.shape(), "array of numbers");

        let decoded: Sample = decode_union(&json!("abc")).unwrap();
        assert_eq!(decoded, Sample::Text("abc".into()));
    }

    #[test]
    fn test_no_arm_matches() {
        let err = decode_union::<Sample>(&json!({"a": 1})).unwrap_err();
        assert_eq!(
            err,
            WireError::UnrecognizedUnionShape {
                field: String::new(),
                union: "Sample",
                json_type: "object",
            }
        );
    }

    #[test]
    fn test_mixed_array_is_not_numbers() {
        assert!(decode_union::<Sample>(&json!([1, "a"])).is_err());
    }

    #[test]
    fn test_nested_predicate() {
        assert!(shape::non_empty_nested_number_array(&json!([[1], [2, 3]])));
        assert!(!shape::non_empty_nested_number_array(&json!([[]])));
        assert!(!shape::non_empty_nested_number_array(&json!([])));
        assert!(!shape::non_empty_nested_number_array(&json!([1, 2])));
    }
}
