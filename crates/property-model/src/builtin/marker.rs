//! Point features.

use crate::builtin::DEFAULT_GROUP;
use crate::error::BuildError;
use crate::model::{SchemaId, ValueType};
use crate::property::Pointer;
use crate::schema::{LinkableFields, Schema, SchemaField, SchemaFieldUi, SchemaGroup, SchemaGroupList};

pub const EXTENSION: &str = "marker";

pub const LOCATION: &str = "location";
pub const HEIGHT: &str = "height";
pub const POINT_COLOR: &str = "pointColor";
pub const POINT_SIZE: &str = "pointSize";
pub const IMAGE: &str = "image";

pub(super) fn schema(id: SchemaId) -> Result<Schema, BuildError> {
    let group = SchemaGroup::new(
        DEFAULT_GROUP,
        [
            SchemaField::new(LOCATION, ValueType::LatLng).with_title("Location"),
            SchemaField::new(HEIGHT, ValueType::Number)
                .with_title("Height")
                .with_suffix("m"),
            SchemaField::new(POINT_COLOR, ValueType::String)
                .with_title("Point color")
                .with_ui(SchemaFieldUi::Color),
            SchemaField::new(POINT_SIZE, ValueType::Number)
                .with_title("Point size")
                .with_min(0.0)
                .with_suffix("px"),
            SchemaField::new(IMAGE, ValueType::Url)
                .with_title("Image")
                .with_ui(SchemaFieldUi::Image),
        ],
    )?
    .with_title("Marker")
    .with_representative_field(LOCATION)?;

    Schema::new(
        id,
        SchemaGroupList::new([group])?,
        LinkableFields {
            lat_lng: Some(Pointer::field_by_schema_group(DEFAULT_GROUP, LOCATION)),
            url: Some(Pointer::field_by_schema_group(DEFAULT_GROUP, IMAGE)),
        },
    )
}
