//! Key handling errors

use thiserror::Error;

/// Key handling error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// No raw key object was supplied
    #[error(
        "the key parameter is required, whether this instance is for the public key or private key"
    )]
    MissingKey,

    /// The raw key is not an EC key
    #[error("only EC keys are supported: the key must have a \"type\" property of value \"EC\" (found {})", .found.as_deref().unwrap_or("none"))]
    UnsupportedKeyType {
        /// The `type` tag that was found, if any
        found: Option<String>,
    },

    /// A required field is missing from the raw key
    #[error("malformed EC key: it must have a \"{field}\" property")]
    MalformedKey {
        /// Wire name of the offending field
        field: String,
    },

    /// The named curve is not supported by the backend
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Hex, scalar or point rejected by the backend
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The private exponent does not produce the stored public point
    #[error("public point does not match private exponent")]
    KeyMismatch,

    /// PEM/DER encoding or decoding failed
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl KeyError {
    pub(crate) fn malformed(field: &str) -> Self {
        KeyError::MalformedKey {
            field: field.to_string(),
        }
    }

    /// Returns true for the errors a handle can fail construction with
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KeyError::MissingKey | KeyError::UnsupportedKeyType { .. } | KeyError::MalformedKey { .. }
        )
    }
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = KeyError::malformed("prvKeyHex");
        assert!(err.to_string().contains("\"prvKeyHex\" property"));

        let err = KeyError::UnsupportedKeyType {
            found: Some("RSA".to_string()),
        };
        assert!(err.to_string().contains("\"type\" property of value \"EC\""));
        assert!(err.to_string().contains("RSA"));
    }

    #[test]
    fn test_validation_classification() {
        assert!(KeyError::MissingKey.is_validation());
        assert!(KeyError::malformed("pubKeyHex").is_validation());
        assert!(!KeyError::UnsupportedCurve("secp521r1".into()).is_validation());
        assert!(!KeyError::KeyMismatch.is_validation());
        assert!(!KeyError::Encoding("x".into()).is_validation());
    }
}
