//! Domain model: what the loader reads from Anytype and what it hands back.

mod document;
mod object;
mod space;

pub use document::{keys, Document, Metadata, MetadataValue};
pub(crate) use object::lenient;
pub use object::{ObjectRecord, ObjectReference, ObjectType, Property, TagOption};
pub use space::{Space, SpaceSelector, SpaceSummary};
