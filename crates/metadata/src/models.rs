//! Book records and partial updates.

use crate::error::{MetadataError, MetadataResult};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shelf_core::AssetId;

/// Serialized field names of a record that attributes may not use.
///
/// Attributes are flattened next to these fields, so an attribute with one of
/// these names would shadow the id or the inline payload once written out.
pub const RESERVED_ATTRIBUTES: [&str; 2] = ["id", "data"];

fn check_attribute_names<'a>(keys: impl IntoIterator<Item = &'a String>) -> MetadataResult<()> {
    match keys
        .into_iter()
        .find(|key| RESERVED_ATTRIBUTES.contains(&key.as_str()))
    {
        Some(key) => Err(MetadataError::ReservedAttribute(key.clone())),
        None => Ok(()),
    }
}

/// A book's metadata record.
///
/// Descriptive attributes (title, author, progress, ...) are opaque to the
/// storage layer and kept as a JSON object. Records created before assets moved
/// to the asset store may still carry the book content inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: AssetId,
    /// Book content embedded in the record, pending migration.
    #[serde(
        default,
        rename = "data",
        skip_serializing_if = "Option::is_none",
        with = "base64_payload"
    )]
    pub inline_payload: Option<Bytes>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl BookRecord {
    /// Create a record with no attributes and no inline payload.
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            inline_payload: None,
            attributes: Map::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Embed content inline.
    pub fn with_inline_payload(mut self, payload: Bytes) -> Self {
        self.inline_payload = Some(payload);
        self
    }

    /// Whether the record still embeds its content.
    pub fn has_inline_payload(&self) -> bool {
        self.inline_payload.is_some()
    }

    /// Title attribute, if present.
    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }

    /// Reject records whose attributes use a reserved name.
    pub fn validate(&self) -> MetadataResult<()> {
        check_attribute_names(self.attributes.keys())
    }

    /// Apply a partial update in place.
    ///
    /// An update touching a reserved attribute name is rejected and leaves the
    /// record unchanged.
    pub fn apply(&mut self, update: RecordUpdate) -> MetadataResult<()> {
        update.validate()?;
        match update.inline_payload {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => self.inline_payload = None,
            FieldUpdate::Set(payload) => self.inline_payload = Some(payload),
        }
        for (key, value) in update.attributes {
            if value.is_null() {
                self.attributes.remove(&key);
            } else {
                self.attributes.insert(key, value);
            }
        }
        Ok(())
    }
}

/// Change to a single optional field.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldUpdate<T> {
    /// Leave the field as it is.
    #[default]
    Keep,
    /// Remove the field.
    Clear,
    /// Replace the field.
    Set(T),
}

/// Partial update of a [`BookRecord`].
///
/// Attributes listed here overwrite existing ones; a `null` value removes the
/// attribute. Anything not mentioned is left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordUpdate {
    pub inline_payload: FieldUpdate<Bytes>,
    pub attributes: Map<String, Value>,
}

impl RecordUpdate {
    /// Update that only drops the inline payload.
    pub fn clear_inline_payload() -> Self {
        Self {
            inline_payload: FieldUpdate::Clear,
            attributes: Map::new(),
        }
    }

    /// Reject updates that touch a reserved attribute name.
    pub fn validate(&self) -> MetadataResult<()> {
        check_attribute_names(self.attributes.keys())
    }

    /// Add an attribute change.
    pub fn set_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Serde adapter storing `Option<Bytes>` as a base64 string.
pub(crate) mod base64_payload {
    use base64::{Engine as _, engine::general_purpose};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(payload: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match payload {
            Some(data) => serializer.serialize_str(&general_purpose::STANDARD.encode(data)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| {
                general_purpose::STANDARD
                    .decode(s.as_bytes())
                    .map(Bytes::from)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
