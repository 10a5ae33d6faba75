//! Polyline features.

use crate::builtin::DEFAULT_GROUP;
use crate::error::BuildError;
use crate::model::{SchemaId, ValueType};
use crate::schema::{LinkableFields, Schema, SchemaField, SchemaFieldUi, SchemaGroup, SchemaGroupList};

pub const EXTENSION: &str = "polyline";

pub const COORDINATES: &str = "coordinates";
pub const STROKE_COLOR: &str = "strokeColor";
pub const STROKE_WIDTH: &str = "strokeWidth";

pub(super) fn schema(id: SchemaId) -> Result<Schema, BuildError> {
    let group = SchemaGroup::new(
        DEFAULT_GROUP,
        [
            SchemaField::new(COORDINATES, ValueType::Coordinates).with_title("Coordinates"),
            SchemaField::new(STROKE_COLOR, ValueType::String)
                .with_title("Stroke color")
                .with_ui(SchemaFieldUi::Color),
            SchemaField::new(STROKE_WIDTH, ValueType::Number)
                .with_title("Stroke width")
                .with_min(0.0)
                .with_suffix("px"),
        ],
    )?
    .with_title("Polyline")
    .with_representative_field(COORDINATES)?;

    Schema::new(id, SchemaGroupList::new([group])?, LinkableFields::default())
}
