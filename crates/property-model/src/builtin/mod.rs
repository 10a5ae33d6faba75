//! Built-in schemas for imported geometry features.
//!
//! Decoders create their properties against these schemas, all declared by
//! the `builtin` plugin. Each kind keeps its single group under
//! [`DEFAULT_GROUP`].

pub mod marker;
pub mod polygon;
pub mod polyline;

use lazy_static::lazy_static;
use tracing::error;

use crate::error::BuildError;
use crate::model::{ExtensionId, PluginId, SchemaId};
use crate::schema::Schema;

/// Name of the plugin declaring the built-in schemas.
pub const PLUGIN_NAME: &str = "builtin";

/// The schema group every built-in schema uses.
pub const DEFAULT_GROUP: &str = "default";

type SchemaFn = fn(SchemaId) -> Result<Schema, BuildError>;

const BUILDERS: [(&str, SchemaFn); 3] = [
    (marker::EXTENSION, marker::schema),
    (polygon::EXTENSION, polygon::schema),
    (polyline::EXTENSION, polyline::schema),
];

lazy_static! {
    static ref PLUGIN: PluginId = PluginId::from_static(PLUGIN_NAME);
    static ref SCHEMAS: Vec<Schema> = BUILDERS
        .iter()
        .filter_map(|(extension, build)| match build(schema_id(extension)) {
            Ok(schema) => Some(schema),
            Err(err) => {
                error!(extension, %err, "invalid built-in schema");
                None
            }
        })
        .collect();
}

pub fn plugin_id() -> PluginId {
    PLUGIN.clone()
}

/// The schema ID of a built-in extension.
pub fn schema_id(extension: &str) -> SchemaId {
    SchemaId::new(plugin_id(), ExtensionId::new(extension))
}

pub fn schemas() -> &'static [Schema] {
    &SCHEMAS
}

pub fn schema(id: &SchemaId) -> Option<&'static Schema> {
    SCHEMAS.iter().find(|s| s.id() == id)
}

pub fn schema_by_extension(extension: &str) -> Option<&'static Schema> {
    SCHEMAS
        .iter()
        .find(|s| s.id().extension().as_str() == extension)
}
