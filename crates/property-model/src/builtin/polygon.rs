//! Polygon features.

use crate::builtin::DEFAULT_GROUP;
use crate::error::BuildError;
use crate::model::{SchemaId, Value, ValueType};
use crate::schema::{Condition, LinkableFields, Schema, SchemaField, SchemaFieldUi, SchemaGroup, SchemaGroupList};

pub const EXTENSION: &str = "polygon";

pub const POLYGON: &str = "polygon";
pub const FILL: &str = "fill";
pub const FILL_COLOR: &str = "fillColor";
pub const STROKE: &str = "stroke";
pub const STROKE_COLOR: &str = "strokeColor";
pub const STROKE_WIDTH: &str = "strokeWidth";

pub(super) fn schema(id: SchemaId) -> Result<Schema, BuildError> {
    let group = SchemaGroup::new(
        DEFAULT_GROUP,
        [
            SchemaField::new(POLYGON, ValueType::Polygon).with_title("Polygon"),
            SchemaField::new(FILL, ValueType::Bool)
                .with_title("Fill")
                .with_default_value(Value::Bool(true)),
            SchemaField::new(FILL_COLOR, ValueType::String)
                .with_title("Fill color")
                .with_ui(SchemaFieldUi::Color)
                .with_condition(Condition::new(FILL, Value::Bool(true))),
            SchemaField::new(STROKE, ValueType::Bool).with_title("Stroke"),
            SchemaField::new(STROKE_COLOR, ValueType::String)
                .with_title("Stroke color")
                .with_ui(SchemaFieldUi::Color)
                .with_condition(Condition::new(STROKE, Value::Bool(true))),
            SchemaField::new(STROKE_WIDTH, ValueType::Number)
                .with_title("Stroke width")
                .with_min(0.0)
                .with_suffix("px")
                .with_condition(Condition::new(STROKE, Value::Bool(true))),
        ],
    )?
    .with_title("Polygon")
    .with_representative_field(POLYGON)?;

    Schema::new(id, SchemaGroupList::new([group])?, LinkableFields::default())
}
