//! Strongly typed entity identifiers and raw-input coercion.
//!
//! Every identifier in folio is a positive 64-bit integer. Raw values coming
//! from clients (JSON numbers, numeric strings, form fields, DOM attributes)
//! pass through [`RawId`] so there is exactly one coercion rule for the whole
//! system.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a raw integer is not a valid identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("identifier must be a positive integer, got {0}")]
pub struct InvalidId(pub i64);

/// An identifier exactly as a client supplied it.
///
/// JSON bodies may carry numbers or numeric strings; form bodies and DOM
/// attributes always carry strings. Anything that is not an integer or a
/// string is kept as `Other` so it can be rejected with a precise message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawId {
    /// Coerce to a positive integer.
    ///
    /// Accepts integers > 0 and strings of ASCII digits (surrounding
    /// whitespace ignored) that parse to a value > 0. Rejects zero,
    /// negatives, fractions, signs, empty strings and non-scalar values.
    pub fn to_positive(&self) -> Option<i64> {
        match self {
            RawId::Int(n) if *n > 0 => Some(*n),
            RawId::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                trimmed.parse::<i64>().ok().filter(|n| *n > 0)
            }
            _ => None,
        }
    }

    /// Short rendering of the raw value for log lines and messages.
    pub fn describe(&self) -> String {
        match self {
            RawId::Int(n) => n.to_string(),
            RawId::Float(f) => f.to_string(),
            RawId::Text(s) => format!("'{}'", s),
            RawId::Other(v) => v.to_string(),
        }
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        RawId::Int(value)
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        RawId::Text(value.to_string())
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            sqlx::Type,
            utoipa::ToSchema,
        )]
        #[serde(try_from = "i64", into = "i64")]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Build from a raw integer; `None` unless the value is positive.
            pub fn new(value: i64) -> Option<Self> {
                (value > 0).then_some(Self(value))
            }

            /// Build from a client-supplied value using the shared coercion rule.
            pub fn coerce(raw: &RawId) -> Option<Self> {
                raw.to_positive().map(Self)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = InvalidId;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(InvalidId(value))
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::Company`].
    CompanyId
);
define_id!(
    /// Identifier of a [`crate::Department`].
    DepartmentId
);
define_id!(
    /// Identifier of a [`crate::Folder`].
    FolderId
);
define_id!(
    /// Identifier of a [`crate::Document`].
    DocumentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_integers_accepted() {
        assert_eq!(RawId::Int(37).to_positive(), Some(37));
        assert_eq!(DocumentId::coerce(&RawId::Int(1)).map(|d| d.get()), Some(1));
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(RawId::Int(0).to_positive(), None);
        assert_eq!(RawId::Int(-1).to_positive(), None);
        assert!(FolderId::new(0).is_none());
        assert!(FolderId::new(-5).is_none());
    }

    #[test]
    fn test_numeric_strings_coerced() {
        assert_eq!(RawId::from("9").to_positive(), Some(9));
        assert_eq!(RawId::from("  12 ").to_positive(), Some(12));
        assert_eq!(RawId::from("007").to_positive(), Some(7));
    }

    #[test]
    fn test_malformed_strings_rejected() {
        for raw in ["", "   ", "abc", "12abc", "-3", "+3", "1.5", "0", "doc-37"] {
            assert_eq!(
                RawId::from(raw).to_positive(),
                None,
                "'{}' should not coerce",
                raw
            );
        }
    }

    #[test]
    fn test_overflowing_string_rejected() {
        assert_eq!(RawId::from("99999999999999999999").to_positive(), None);
    }

    #[test]
    fn test_non_scalar_values_rejected() {
        assert_eq!(RawId::Float(5.0).to_positive(), None);
        assert_eq!(RawId::Other(serde_json::Value::Bool(true)).to_positive(), None);
        assert_eq!(
            RawId::Other(serde_json::json!([1, 2])).to_positive(),
            None
        );
    }

    #[test]
    fn test_raw_id_deserializes_from_json_shapes() {
        let n: RawId = serde_json::from_str("42").unwrap();
        assert_eq!(n, RawId::Int(42));
        let s: RawId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(s, RawId::Text("42".to_string()));
        let f: RawId = serde_json::from_str("4.5").unwrap();
        assert_eq!(f, RawId::Float(4.5));
        let b: RawId = serde_json::from_str("false").unwrap();
        assert!(matches!(b, RawId::Other(_)));
    }

    #[test]
    fn test_typed_id_serde_rejects_non_positive() {
        let ok: DocumentId = serde_json::from_str("37").unwrap();
        assert_eq!(ok.get(), 37);
        assert!(serde_json::from_str::<DocumentId>("0").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "37");
    }

    #[test]
    fn test_describe() {
        assert_eq!(RawId::Int(3).describe(), "3");
        assert_eq!(RawId::from("x").describe(), "'x'");
    }
}
