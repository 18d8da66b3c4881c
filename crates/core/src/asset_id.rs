//! Asset identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied identifier of a stored asset.
///
/// The id is opaque to the store but must be usable as a single file name
/// component, since each asset lives at `<root>/<id>.epub`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Create from a string, validating that it is a safe file name stem.
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidAssetId(
                "asset id cannot be empty".to_string(),
            ));
        }
        if id.len() > crate::MAX_ASSET_ID_LEN {
            return Err(crate::Error::InvalidAssetId(format!(
                "asset id must be at most {} bytes, got {}",
                crate::MAX_ASSET_ID_LEN,
                id.len()
            )));
        }
        // Leading dots are reserved for in-flight temporary files.
        if id.starts_with('.') {
            return Err(crate::Error::InvalidAssetId(format!(
                "asset id cannot start with '.': {id}"
            )));
        }
        for c in id.chars() {
            if matches!(c, '/' | '\\' | '\0') || c.is_control() {
                return Err(crate::Error::InvalidAssetId(format!(
                    "invalid character in asset id: {c:?}"
                )));
            }
        }
        Ok(Self(id))
    }

    /// Get the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the file holding this asset inside the store root.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, crate::ASSET_EXTENSION)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({self})")
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AssetId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AssetId {
    type Error = crate::Error;

    fn try_from(value: &str) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        for id in [
            "book-1",
            "3f2b8c1e-4d5a-4c1b-9e2f-0a1b2c3d4e5f",
            "My Book (2nd ed.)",
            "a..b",
        ] {
            assert!(AssetId::new(id).is_ok(), "expected {id:?} to be valid");
        }
    }

    #[test]
    fn test_invalid_ids() {
        for id in ["", ".", "..", ".hidden", "a/b", "..\\x", "nul\0byte", "tab\tchar"] {
            assert!(AssetId::new(id).is_err(), "expected {id:?} to be rejected");
        }
    }

    #[test]
    fn test_length_limit() {
        let max = "x".repeat(crate::MAX_ASSET_ID_LEN);
        assert!(AssetId::new(max).is_ok());

        let too_long = "x".repeat(crate::MAX_ASSET_ID_LEN + 1);
        let err = AssetId::new(too_long).unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_file_name() {
        let id = AssetId::new("book-1").unwrap();
        assert_eq!(id.file_name(), "book-1.epub");
        assert_eq!(id.as_str(), "book-1");
    }

    #[test]
    fn test_serde_validates() {
        let id: AssetId = serde_json::from_str("\"book-1\"").unwrap();
        assert_eq!(id.as_str(), "book-1");

        assert!(serde_json::from_str::<AssetId>("\"../etc/passwd\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"book-1\"");
    }
}
