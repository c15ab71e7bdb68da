//! Error types for wire encoding and decoding.

use serde_json::Value;
use thiserror::Error;

/// Result type alias using the wire error type.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors raised while encoding or decoding wire values.
///
/// Every variant that concerns a field carries the dotted path of that field
/// relative to the value being decoded (e.g. `step_details.tool_calls[1]`).
/// An empty path means the error concerns the root value itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// A required key was missing from a wire object.
    #[error("missing required field `{}` on {type_name}", display_path(.field))]
    MissingRequiredField {
        /// Path of the missing field.
        field: String,
        /// Name of the type that declares the field.
        type_name: &'static str,
    },

    /// No arm of a union matched the wire value's shape.
    #[error("unrecognized shape for union {union} at `{}`: got {json_type}", display_path(.field))]
    UnrecognizedUnionShape {
        /// Path of the union field.
        field: String,
        /// Name of the union type.
        union: &'static str,
        /// JSON type of the received value.
        json_type: &'static str,
    },

    /// A discriminator did not resolve to any registered variant.
    #[error("unknown {registry} tag {tag:?} at `{}`", display_path(.field))]
    UnknownVariantTag {
        /// Path of the discriminator key.
        field: String,
        /// Name of the registry that was consulted.
        registry: &'static str,
        /// The offending tag, exactly as received.
        tag: String,
    },

    /// A list request parameter was out of bounds or conflicting.
    #[error("invalid page parameter `{parameter}`: {reason}")]
    InvalidPageParameter {
        /// Name of the query parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A wire value had the wrong JSON type or an unusable value.
    #[error("malformed value at `{}`: expected {expected}, got {found}", display_path(.field))]
    MalformedWireValue {
        /// Path of the value.
        field: String,
        /// Description of what was expected.
        expected: &'static str,
        /// JSON type (or short description) of what was received.
        found: String,
    },

    /// The input text was not JSON at all.
    #[error("JSON error: {0}")]
    Json(String),
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        WireError::Json(err.to_string())
    }
}

impl WireError {
    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>, type_name: &'static str) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            type_name,
        }
    }

    /// Create a type mismatch error for a root value.
    pub fn malformed(expected: &'static str, value: &Value) -> Self {
        Self::MalformedWireValue {
            field: String::new(),
            expected,
            found: json_type_name(value).to_string(),
        }
    }

    /// Create an unrecognized union shape error for a root value.
    pub fn unrecognized_shape(union: &'static str, value: &Value) -> Self {
        Self::UnrecognizedUnionShape {
            field: String::new(),
            union,
            json_type: json_type_name(value),
        }
    }

    /// Create an unknown tag error for a root value.
    pub fn unknown_tag(registry: &'static str, tag: impl Into<String>) -> Self {
        Self::UnknownVariantTag {
            field: String::new(),
            registry,
            tag: tag.into(),
        }
    }

    /// Create an invalid page parameter error.
    pub fn invalid_page_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidPageParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// Prefix the error's field path with an enclosing segment.
    ///
    /// Object keys are joined with `.`, array indices (`[3]`) are appended
    /// directly.
    pub fn at(mut self, segment: &str) -> Self {
        if let Some(path) = self.path_mut() {
            *path = join_path(segment, path);
        }
        self
    }

    /// The field path this error refers to, if it concerns a field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { field, .. }
            | Self::UnrecognizedUnionShape { field, .. }
            | Self::UnknownVariantTag { field, .. }
            | Self::MalformedWireValue { field, .. } => Some(field),
            Self::InvalidPageParameter { parameter, .. } => Some(parameter),
            Self::Json(_) => None,
        }
    }

    /// Returns true if this error was caused by an unregistered discriminator.
    pub fn is_unknown_tag(&self) -> bool {
        matches!(self, Self::UnknownVariantTag { .. })
    }

    /// Returns the offending tag for unknown-variant errors.
    pub fn unknown_tag_value(&self) -> Option<&str> {
        match self {
            Self::UnknownVariantTag { tag, .. } => Some(tag),
            _ => None,
        }
    }

    fn path_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::MissingRequiredField { field, .. }
            | Self::UnrecognizedUnionShape { field, .. }
            | Self::UnknownVariantTag { field, .. }
            | Self::MalformedWireValue { field, .. } => Some(field),
            Self::InvalidPageParameter { .. } | Self::Json(_) => None,
        }
    }
}

fn join_path(segment: &str, rest: &str) -> String {
    if rest.is_empty() {
        segment.to_string()
    } else if rest.starts_with('[') {
        format!("{segment}{rest}")
    } else {
        format!("{segment}.{rest}")
    }
}

/// Name of a JSON value's type, as used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_prefixing() {
        let err = WireError::malformed("string", &json!(1))
            .at("name")
            .at("function")
            .at("[2]")
            .at("tool_calls");
        assert_eq!(err.field(), Some("tool_calls[2].function.name"));
    }

    #[test]
    fn test_root_path_display() {
        let err = WireError::unrecognized_shape("EmbeddingVector", &json!(true));
        assert_eq!(
            err.to_string(),
            "unrecognized shape for union EmbeddingVector at `<root>`: got boolean"
        );
    }

    #[test]
    fn test_page_parameter_ignores_prefix() {
        let err = WireError::invalid_page_parameter("limit", "too big").at("query");
        assert_eq!(err.field(), Some("limit"));
    }

    #[test]
    fn test_unknown_tag_accessors() {
        let err = WireError::unknown_tag("RunToolCall", "nope").at("type");
        assert!(err.is_unknown_tag());
        assert_eq!(err.unknown_tag_value(), Some("nope"));
        assert_eq!(err.field(), Some("type"));
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!([1.0])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
