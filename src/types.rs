use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::VjsonError;

/// Semantic type of one editor item.
///
/// The first six variants are the JSON base types. `Color` and `Datetime` are
/// string-encoded subtypes: pure editing affordances that collapse to their
/// base type (`String`) whenever a value is persisted. The tag is set once at
/// node construction and never inferred by scanning markup classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Null,
    Boolean,
    Number,
    String,
    Object,
    Array,
    Color,
    Datetime,
}

/// Strict timestamp pattern for the datetime subtype: `YYYY-MM-DDThh:mm:ss.sssZ`.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

impl TypeTag {
    /// Classify an in-memory JSON value.
    ///
    /// With `detect_specials`, plain strings additionally run the anchored
    /// subtype patterns via [`TypeTag::detect_special_string`].
    pub fn detect(value: &Value, detect_specials: bool) -> TypeTag {
        match value {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
            Value::String(s) => {
                if detect_specials {
                    Self::detect_special_string(s)
                } else {
                    TypeTag::String
                }
            }
        }
    }

    /// Match a string against the registered subtype patterns, first match
    /// wins. Every pattern is anchored: the whole string must match, so
    /// substrings never trigger a false positive.
    pub fn detect_special_string(s: &str) -> TypeTag {
        if is_color_literal(s) {
            return TypeTag::Color;
        }
        if NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).is_ok() {
            return TypeTag::Datetime;
        }
        TypeTag::String
    }

    /// Strip subtype aliasing. Subtypes never reach a persisted value; only
    /// the base type does.
    pub fn base(self) -> TypeTag {
        match self {
            TypeTag::Color | TypeTag::Datetime => TypeTag::String,
            other => other,
        }
    }

    pub fn is_subtype(self) -> bool {
        self.base() != self
    }

    pub fn is_collection(self) -> bool {
        matches!(self, TypeTag::Object | TypeTag::Array)
    }

    /// Static conversion matrix for the `type` edit.
    ///
    /// Identity always holds. Null converts to anything, and anything clears
    /// to null. Anything converts to the string family (lossy: collection
    /// members are discarded). String
    /// text converts to number/boolean subject to re-validation of the text
    /// when the edit is applied. Object and array never convert into each
    /// other; a scalar converts to a collection only when its text is empty,
    /// which is a content-dependent check made at application time on top of
    /// this matrix.
    pub fn can_convert(self, to: TypeTag) -> bool {
        use TypeTag::*;
        if self == to {
            return true;
        }
        match (self, to) {
            (Null, _) | (_, Null) => true,
            (_, String | Color | Datetime) => !self.is_collection() || to == String,
            (String | Color | Datetime, Number | Boolean) => true,
            (String | Color | Datetime, Object | Array) => true, // empty text only
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Color => "color",
            TypeTag::Datetime => "datetime",
        }
    }

    /// All tags, base types first. The order is also the scan order used by
    /// the lenient snapshot fallback.
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Null,
        TypeTag::Boolean,
        TypeTag::Number,
        TypeTag::String,
        TypeTag::Object,
        TypeTag::Array,
        TypeTag::Color,
        TypeTag::Datetime,
    ];
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = VjsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| VjsonError::MalformedEdit(format!("unknown type tag '{}'", s)))
    }
}

/// `#` followed by exactly six hex digits.
fn is_color_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_base_types() {
        assert_eq!(TypeTag::detect(&Value::Null, true), TypeTag::Null);
        assert_eq!(TypeTag::detect(&json!(true), true), TypeTag::Boolean);
        assert_eq!(TypeTag::detect(&json!(42), true), TypeTag::Number);
        assert_eq!(TypeTag::detect(&json!("hi"), true), TypeTag::String);
        assert_eq!(TypeTag::detect(&json!([1]), true), TypeTag::Array);
        assert_eq!(TypeTag::detect(&json!({"a": 1}), true), TypeTag::Object);
    }

    #[test]
    fn test_color_detection_boundary() {
        assert_eq!(TypeTag::detect_special_string("#AA00FF"), TypeTag::Color);
        assert_eq!(TypeTag::detect_special_string("#aa00ff"), TypeTag::Color);
        // Invalid hex digit
        assert_eq!(TypeTag::detect_special_string("#AA00FG"), TypeTag::String);
        // Too short / too long / unanchored
        assert_eq!(TypeTag::detect_special_string("#AA00F"), TypeTag::String);
        assert_eq!(TypeTag::detect_special_string("#AA00FF0"), TypeTag::String);
        assert_eq!(TypeTag::detect_special_string(" #AA00FF"), TypeTag::String);
    }

    #[test]
    fn test_datetime_detection_boundary() {
        assert_eq!(
            TypeTag::detect_special_string("2024-01-01T00:00:00.000Z"),
            TypeTag::Datetime
        );
        // Date-only, no time component
        assert_eq!(TypeTag::detect_special_string("2024-01-01"), TypeTag::String);
        // Missing milliseconds
        assert_eq!(
            TypeTag::detect_special_string("2024-01-01T00:00:00Z"),
            TypeTag::String
        );
        // Trailing garbage must not match
        assert_eq!(
            TypeTag::detect_special_string("2024-01-01T00:00:00.000Z extra"),
            TypeTag::String
        );
    }

    #[test]
    fn test_specials_can_be_disabled() {
        assert_eq!(TypeTag::detect(&json!("#AA00FF"), false), TypeTag::String);
    }

    #[test]
    fn test_base_strips_subtypes() {
        assert_eq!(TypeTag::Color.base(), TypeTag::String);
        assert_eq!(TypeTag::Datetime.base(), TypeTag::String);
        assert_eq!(TypeTag::Number.base(), TypeTag::Number);
        assert!(TypeTag::Color.is_subtype());
        assert!(!TypeTag::String.is_subtype());
    }

    #[test]
    fn test_conversion_matrix() {
        assert!(TypeTag::Null.can_convert(TypeTag::Array));
        assert!(TypeTag::Object.can_convert(TypeTag::Null));
        assert!(TypeTag::Number.can_convert(TypeTag::Null));
        assert!(TypeTag::Number.can_convert(TypeTag::String));
        assert!(TypeTag::String.can_convert(TypeTag::Color));
        assert!(TypeTag::Object.can_convert(TypeTag::String));
        assert!(!TypeTag::Object.can_convert(TypeTag::Array));
        assert!(!TypeTag::Array.can_convert(TypeTag::Object));
        assert!(!TypeTag::Object.can_convert(TypeTag::Color));
        assert!(!TypeTag::Number.can_convert(TypeTag::Boolean));
    }

    #[test]
    fn test_wire_spelling() {
        assert_eq!(serde_json::to_string(&TypeTag::Datetime).unwrap(), "\"datetime\"");
        let tag: TypeTag = serde_json::from_str("\"color\"").unwrap();
        assert_eq!(tag, TypeTag::Color);
        assert_eq!("boolean".parse::<TypeTag>().unwrap(), TypeTag::Boolean);
        assert!("element".parse::<TypeTag>().is_err());
    }
}
