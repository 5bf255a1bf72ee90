use crate::types::SpaceId;
use serde::Deserialize;

/// Which spaces a loader reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceSelector {
    /// A space id known up front; no resolution request is made.
    Id(SpaceId),
    /// Space names resolved against the spaces listing, in caller order.
    Names(Vec<String>),
}

/// A resolved space. `name` is present only when the space was requested
/// by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    pub id: SpaceId,
    pub name: Option<String>,
}

impl Space {
    pub fn from_id(id: SpaceId) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: SpaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// One entry of the `/v1/spaces` listing. Both fields are optional so a
/// malformed entry is skipped instead of failing the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpaceSummary {
    #[serde(default, deserialize_with = "super::object::lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "super::object::lenient")]
    pub name: Option<String>,
}
