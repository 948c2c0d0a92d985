use std::error::Error as StdError;
use std::fmt;

use crate::core::element::ElementType;

/// Strict decode failures. There is no local recovery: every failure reaches the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodingError {
    /// A required field has no entry in the element map.
    EntryMissing { key: String },
    /// The entry exists but its variant cannot produce the requested type.
    TypeMismatch {
        key: Option<String>,
        expected: &'static str,
        found: ElementType,
    },
    /// The requested type has no extractor or record decoder in the registry.
    UnsupportedTargetType { type_name: &'static str },
}

impl DecodingError {
    pub fn entry_missing(key: impl Into<String>) -> Self {
        DecodingError::EntryMissing { key: key.into() }
    }

    pub fn type_mismatch(expected: &'static str, found: ElementType) -> Self {
        DecodingError::TypeMismatch {
            key: None,
            expected,
            found,
        }
    }

    pub fn unsupported(type_name: &'static str) -> Self {
        DecodingError::UnsupportedTargetType { type_name }
    }

    pub(crate) fn at_key(self, key: &str) -> Self {
        match self {
            DecodingError::TypeMismatch {
                key: None,
                expected,
                found,
            } => DecodingError::TypeMismatch {
                key: Some(key.to_string()),
                expected,
                found,
            },
            other => other,
        }
    }

    pub fn is_entry_missing(&self) -> bool {
        matches!(self, DecodingError::EntryMissing { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, DecodingError::TypeMismatch { .. })
    }

    pub fn is_unsupported_target(&self) -> bool {
        matches!(self, DecodingError::UnsupportedTargetType { .. })
    }
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodingError::EntryMissing { key } => {
                write!(f, "no element named `{key}`")
            }
            DecodingError::TypeMismatch {
                key,
                expected,
                found,
            } => {
                write!(f, "cannot decode {expected} from a {found} element")?;
                if let Some(key) = key {
                    write!(f, " (key: {key})")?;
                }
                Ok(())
            }
            DecodingError::UnsupportedTargetType { type_name } => {
                write!(f, "{type_name} is not decodable from elements")
            }
        }
    }
}

impl StdError for DecodingError {}

#[cfg(test)]
mod tests {
    use super::DecodingError;
    use crate::core::element::ElementType;

    #[test]
    fn at_key_only_fills_mismatch_without_key() {
        let err = DecodingError::type_mismatch("bool", ElementType::Text).at_key("flag");
        assert_eq!(
            err.to_string(),
            "cannot decode bool from a text element (key: flag)"
        );
        let missing = DecodingError::entry_missing("title").at_key("other");
        assert_eq!(missing, DecodingError::entry_missing("title"));
    }
}
