//! Typed, schema-driven property model for scene layers and widgets.
//!
//! A plugin extension declares a [`Schema`]: named groups of typed fields,
//! some of them repeatable lists. Every layer or widget instance owns a
//! [`Property`] holding values for that schema, addressed through
//! [`Pointer`]s.
//!
//! # Overview
//!
//! - **Validated writes**: values are checked against their schema field on
//!   every write, and rejected writes leave the property untouched
//! - **Inheritance**: [`merge`] overlays an instance property on its parent
//!   (e.g. a layer group's property) and reports which fields override
//! - **Migration**: a [`SchemaDiff`] computed from two schema versions
//!   rewrites stored properties, deleting, moving and casting fields
//! - **Dataset links**: fields may take their value from a dataset record
//!   through a [`DatasetLoader`]
//!
//! # Quick Start
//!
//! ```rust
//! use property_model::builtin::{self, marker, DEFAULT_GROUP};
//! use property_model::decode::{create_property, GeometryKind};
//! use property_model::{merge, LatLng, Pointer, SceneId, Value};
//!
//! let scene = SceneId::new();
//! let parent = create_property(
//!     GeometryKind::Point,
//!     Value::LatLng(LatLng { lat: 35.0, lng: 139.0 }),
//!     scene,
//!     Some(&serde_json::json!({ "size": 8 })),
//!     "",
//! )
//! .unwrap();
//!
//! let mut child = create_property(
//!     GeometryKind::Point,
//!     Value::LatLng(LatLng { lat: 40.0, lng: -122.0 }),
//!     scene,
//!     None,
//!     "",
//! )
//! .unwrap();
//! let schema = builtin::schema(child.schema()).unwrap();
//! let color = Pointer::field_by_schema_group(DEFAULT_GROUP, marker::POINT_COLOR);
//! child.update_value(schema, &color, Some("#ff0000ff".into())).unwrap();
//!
//! let merged = merge(Some(&child), Some(&parent), None).unwrap();
//! let size = Pointer::field_by_schema_group(DEFAULT_GROUP, marker::POINT_SIZE);
//! assert_eq!(merged.field(&size).unwrap().value, Some(Value::Number(8.0)));
//! let location = Pointer::field_by_schema_group(DEFAULT_GROUP, marker::LOCATION);
//! assert!(merged.field(&location).unwrap().overridden);
//! ```
//!
//! # Modules
//!
//! - [`model`]: IDs, values, value types and casting
//! - [`schema`]: Schemas, schema groups and schema fields
//! - [`property`]: Property instances, pointers, links, merge and migration
//! - [`builtin`]: Built-in schemas for imported geometry
//! - [`decode`]: Property factory for format decoders
//! - [`validate`]: Whole-property validation
//! - [`error`]: Error types
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (migration steps and silent data loss
//! at `debug`, merge and decoder writes at `trace`) and never installs a
//! subscriber.

pub mod builtin;
pub mod decode;
pub mod error;
pub mod model;
pub mod property;
pub mod schema;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use decode::{create_property, GeometryKind};
pub use error::{BuildError, DecodeError, LoaderError, ValidationError, ValueViolation};
pub use model::{
    DatasetFieldId, DatasetId, DatasetSchemaId, ExtensionId, FieldId, ItemId, LatLng, LatLngHeight,
    OptionalValue, PluginId, PropertyId, SceneId, SchemaGroupId, SchemaId, Value, ValueType,
};
pub use property::{
    merge, DatasetField, DatasetLoader, Field, Group, GroupAndField, GroupList, Item, Link, Links,
    Merged, MergedField, MergedGroup, Pointer, Property, SchemaDiff,
};
pub use schema::{LinkableFields, Schema, SchemaField, SchemaGroup, SchemaGroupList};
pub use validate::{inactive_fields, validate_layer_property, validate_property};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
