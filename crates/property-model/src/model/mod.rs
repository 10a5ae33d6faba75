//! Core value types shared by schemas and properties.
//!
//! This module contains:
//! - Identifiers (UUID and string IDs, plugin and schema IDs)
//! - Values and value types
//! - Casting and loose JSON conversion
//! - Optional values (typed field slots)

pub mod cast;
pub mod id;
pub mod optional;
pub mod value;

pub use cast::looks_like_url;
pub use id::{
    DatasetFieldId, DatasetId, DatasetSchemaId, ExtensionId, FieldId, ItemId, PluginId,
    PropertyId, SceneId, SchemaGroupId, SchemaId,
};
pub use optional::OptionalValue;
pub use value::{
    Camera, LatLng, LatLngHeight, Rect, Spacing, TextAlign, Typography, Value, ValueType,
};
