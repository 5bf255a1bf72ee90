//! Object references and raw object records as returned by the API.
//!
//! Every field is deserialized leniently: a field with an unexpected type
//! reads as absent instead of failing the whole record. The mapper then
//! applies "omit, don't null" on top of that.

use crate::types::{ObjectId, SpaceId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Points at one object in one space. Produced by the indexer, consumed by
/// the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectReference {
    pub space_id: SpaceId,
    pub object_id: ObjectId,
}

impl ObjectReference {
    pub fn new(space_id: SpaceId, object_id: ObjectId) -> Self {
        Self {
            space_id,
            object_id,
        }
    }
}

/// The full record behind `GET /v1/spaces/:space_id/objects/:object_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub space_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub archived: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub markdown: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub object_type: Option<ObjectType>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub properties: Vec<Property>,
}

impl ObjectRecord {
    /// Finds the first property with the given key.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.key.as_deref() == Some(key))
    }
}

/// The type an object is an instance of (`Page`, `Note`, `Task`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectType {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

impl ObjectType {
    /// The human-readable label, never the raw type id or key.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// One entry of an object's `properties` array.
///
/// The value lives under a field named after the property's `format`
/// (`{"format": "date", "date": "..."}`), so everything besides the
/// common header is kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Property {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Property {
    /// The value stored under the property's own format, as a non-empty string.
    pub fn scalar_text(&self) -> Option<&str> {
        let format = self.format.as_deref()?;
        self.values
            .get(format)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Tag options of a `multi_select` property, in API order.
    pub fn tag_options(&self) -> Vec<TagOption> {
        match self.values.get("multi_select") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A tag as embedded in a `multi_select` property value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagOption {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Deserializes a field, reading a value of the wrong shape as `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserializes a list, dropping entries of the wrong shape.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
