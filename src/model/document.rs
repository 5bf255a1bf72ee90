use indexmap::IndexMap;
use serde::Serialize;

/// Metadata keys a [`Document`] may carry, in canonical emission order.
pub mod keys {
    pub const SPACE_ID: &str = "space_id";
    pub const SPACE_NAME: &str = "space_name";
    pub const OBJECT_ID: &str = "object_id";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const ARCHIVED: &str = "archived";
    pub const TYPE: &str = "type";
    pub const TAGS: &str = "tags";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const LAST_OPENED_AT: &str = "last_opened_at";
    pub const DESCRIPTION: &str = "description";

    // Legacy aliases carrying the raw Anytype property keys.
    pub const CREATED_DATE: &str = "created_date";
    pub const LAST_MODIFIED_DATE: &str = "last_modified_date";
    pub const LAST_OPENED_DATE: &str = "last_opened_date";
}

/// A flattened metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Insertion-ordered metadata mapping.
pub type Metadata = IndexMap<String, MetadataValue>;

/// A normalized document: text content plus flattened metadata.
///
/// Immutable once produced; consumers adapt it into their own document
/// type through [`Document::into_parts`] or its JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    #[serde(rename = "page_content")]
    content: String,
    metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Text metadata value under `key`, if present.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_text)
    }

    pub fn into_parts(self) -> (String, Metadata) {
        (self.content, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serializes_in_key_order() {
        let mut metadata = Metadata::new();
        metadata.insert(keys::ID.to_string(), "o1".into());
        metadata.insert(keys::ARCHIVED.to_string(), false.into());
        metadata.insert(keys::TAGS.to_string(), vec!["x".to_string()].into());

        let json = serde_json::to_string(&Document::new("hello", metadata)).unwrap();
        assert_eq!(
            json,
            r#"{"page_content":"hello","metadata":{"id":"o1","archived":false,"tags":["x"]}}"#
        );
    }
}
