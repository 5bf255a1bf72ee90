// src/mapping.rs
//! Flattens an object record into a [`Document`].
//!
//! The mapping is pure: the same record and space always produce the same
//! document, with metadata keys in a fixed order. A key is emitted only
//! when its source value is present and non-empty.

use crate::model::{keys, Document, Metadata, ObjectRecord, ObjectReference, Property, Space};

/// Property key holding an object's tags.
const TAG_PROPERTY: &str = "tag";

/// Property key holding an object's description.
const DESCRIPTION_PROPERTY: &str = "description";

/// Date properties: (Anytype property key, normalized metadata key).
const DATE_PROPERTIES: [(&str, &str); 3] = [
    (keys::CREATED_DATE, keys::CREATED_AT),
    (keys::LAST_MODIFIED_DATE, keys::UPDATED_AT),
    (keys::LAST_OPENED_DATE, keys::LAST_OPENED_AT),
];

/// Property formats whose value is a plain string under the format's name.
const SCALAR_FORMATS: [&str; 2] = ["date", "text"];

/// Knobs for the flattening step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingOptions {
    /// Also emit dates under their raw Anytype keys (`created_date`, ...).
    pub legacy_date_aliases: bool,
}

/// Converts one fetched record into a document.
///
/// `reference` supplies the object id when the record omits it.
pub fn map_document(
    record: ObjectRecord,
    reference: &ObjectReference,
    space: &Space,
    options: &MappingOptions,
) -> Document {
    let mut metadata = Metadata::new();

    insert_text(&mut metadata, keys::SPACE_ID, Some(space.id.as_str()));
    insert_text(&mut metadata, keys::SPACE_NAME, space.name.as_deref());

    let object_id = record
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| reference.object_id.as_str());
    insert_text(&mut metadata, keys::OBJECT_ID, Some(object_id));
    insert_text(&mut metadata, keys::ID, Some(object_id));

    insert_text(&mut metadata, keys::NAME, record.name.as_deref());
    metadata.insert(
        keys::ARCHIVED.to_string(),
        record.archived.unwrap_or(false).into(),
    );
    insert_text(
        &mut metadata,
        keys::TYPE,
        record.object_type.as_ref().and_then(|t| t.label()),
    );

    let tags = tag_names(&record, object_id);
    if !tags.is_empty() {
        metadata.insert(keys::TAGS.to_string(), tags.into());
    }

    for (property_key, metadata_key) in DATE_PROPERTIES {
        let value = scalar_property(&record, property_key);
        insert_text(&mut metadata, metadata_key, value);
        if options.legacy_date_aliases {
            insert_text(&mut metadata, property_key, value);
        }
    }

    insert_text(
        &mut metadata,
        keys::DESCRIPTION,
        scalar_property(&record, DESCRIPTION_PROPERTY),
    );

    Document::new(record.markdown.unwrap_or_default(), metadata)
}

fn insert_text(metadata: &mut Metadata, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        metadata.insert(key.to_string(), value.into());
    }
}

/// A recognized scalar property's value, if its format carries a string.
fn scalar_property<'a>(record: &'a ObjectRecord, key: &str) -> Option<&'a str> {
    record
        .property(key)
        .filter(|p| {
            p.format
                .as_deref()
                .is_some_and(|format| SCALAR_FORMATS.contains(&format))
        })
        .and_then(Property::scalar_text)
}

/// Tag display names in API order. Tags embedded without a name cannot be
/// resolved locally and are left out.
fn tag_names(record: &ObjectRecord, object_id: &str) -> Vec<String> {
    let Some(property) = record.property(TAG_PROPERTY) else {
        return Vec::new();
    };

    property
        .tag_options()
        .into_iter()
        .filter_map(|tag| match tag.name.filter(|name| !name.is_empty()) {
            Some(name) => Some(name),
            None => {
                log::debug!(
                    "Dropping unresolved tag {} on object {}",
                    tag.id.as_deref().unwrap_or("<no id>"),
                    object_id
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetadataValue;
    use crate::types::{ObjectId, SpaceId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reference() -> ObjectReference {
        ObjectReference::new(
            SpaceId::parse("space-1").unwrap(),
            ObjectId::parse("o1").unwrap(),
        )
    }

    fn record(value: serde_json::Value) -> ObjectRecord {
        serde_json::from_value(value).unwrap()
    }

    fn keys_of(document: &Document) -> Vec<&str> {
        document.metadata().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_minimal_record_keeps_only_present_keys() {
        let space = Space::from_id(SpaceId::parse("space-1").unwrap());
        let document = map_document(
            record(json!({"id": "o1", "markdown": "hello"})),
            &reference(),
            &space,
            &MappingOptions::default(),
        );

        assert_eq!(document.content(), "hello");
        assert_eq!(
            keys_of(&document),
            vec!["space_id", "object_id", "id", "archived"]
        );
        assert_eq!(
            document.metadata().get("archived"),
            Some(&MetadataValue::Flag(false))
        );
    }

    #[test]
    fn test_missing_markdown_maps_to_empty_content() {
        let space = Space::from_id(SpaceId::parse("space-1").unwrap());
        let document = map_document(
            record(json!({"name": "No body"})),
            &reference(),
            &space,
            &MappingOptions::default(),
        );

        assert_eq!(document.content(), "");
        assert_eq!(document.text("id"), Some("o1"));
        assert_eq!(document.text("name"), Some("No body"));
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let space = Space {
            id: SpaceId::parse("space-1").unwrap(),
            name: Some(String::new()),
        };
        let document = map_document(
            record(json!({
                "id": "",
                "name": "",
                "type": {"name": "", "key": "page"},
                "properties": [
                    {"key": "tag", "format": "multi_select", "multi_select": []},
                    {"key": "created_date", "format": "date", "date": ""},
                    {"key": "description", "format": "text", "text": null}
                ]
            })),
            &reference(),
            &space,
            &MappingOptions::default(),
        );

        assert_eq!(
            keys_of(&document),
            vec!["space_id", "object_id", "id", "archived"]
        );
    }

    #[test]
    fn test_unsupported_formats_are_ignored() {
        let space = Space::from_id(SpaceId::parse("space-1").unwrap());
        let document = map_document(
            record(json!({
                "properties": [
                    {"key": "description", "format": "objects", "objects": ["x"]},
                    {"key": "links", "format": "objects", "objects": ["y"]}
                ]
            })),
            &reference(),
            &space,
            &MappingOptions::default(),
        );

        assert!(document.metadata().get("description").is_none());
        assert!(document.metadata().get("links").is_none());
    }

    #[test]
    fn test_unresolved_tags_are_dropped_in_order() {
        let space = Space::from_id(SpaceId::parse("space-1").unwrap());
        let document = map_document(
            record(json!({
                "properties": [{
                    "key": "tag",
                    "format": "multi_select",
                    "multi_select": [
                        {"id": "t2", "name": "beta"},
                        {"id": "t9"},
                        {"id": "t1", "name": "alpha"}
                    ]
                }]
            })),
            &reference(),
            &space,
            &MappingOptions::default(),
        );

        assert_eq!(
            document.metadata().get("tags"),
            Some(&MetadataValue::List(vec![
                "beta".to_string(),
                "alpha".to_string()
            ]))
        );
    }

    #[test]
    fn test_legacy_date_aliases() {
        let space = Space::from_id(SpaceId::parse("space-1").unwrap());
        let document = map_document(
            record(json!({
                "properties": [
                    {"key": "last_modified_date", "format": "date", "date": "2024-02-02T00:00:00Z"}
                ]
            })),
            &reference(),
            &space,
            &MappingOptions {
                legacy_date_aliases: true,
            },
        );

        assert_eq!(document.text("updated_at"), Some("2024-02-02T00:00:00Z"));
        assert_eq!(
            document.text("last_modified_date"),
            Some("2024-02-02T00:00:00Z")
        );
        assert!(document.metadata().get("created_date").is_none());
    }

    #[test]
    fn test_mapping_is_deterministic_regardless_of_property_order() {
        let space = Space::named(SpaceId::parse("space-1").unwrap(), "Personal");
        let forward = record(json!({
            "id": "o1",
            "properties": [
                {"key": "description", "format": "text", "text": "d"},
                {"key": "created_date", "format": "date", "date": "2024-01-01"}
            ]
        }));
        let backward = record(json!({
            "id": "o1",
            "properties": [
                {"key": "created_date", "format": "date", "date": "2024-01-01"},
                {"key": "description", "format": "text", "text": "d"}
            ]
        }));

        let a = map_document(forward, &reference(), &space, &MappingOptions::default());
        let b = map_document(backward, &reference(), &space, &MappingOptions::default());

        assert_eq!(a, b);
        assert_eq!(keys_of(&a), keys_of(&b));
    }
}
