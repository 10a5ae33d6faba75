//! Builds a marker property, overlays it on a parent and migrates it to a
//! newer schema, printing each stage as JSON.
//!
//! Run with `RUST_LOG=property_model=trace` to see the library's events.

use std::error::Error;

use property_model::builtin::{self, marker, DEFAULT_GROUP};
use property_model::{
    create_property, merge, validate_property, GeometryKind, LatLngHeight, LinkableFields, Pointer,
    SceneId, Schema, SchemaDiff, SchemaField, SchemaGroup, SchemaGroupList, SchemaId, Value,
    ValueType,
};
use tracing_subscriber::EnvFilter;

/// The marker schema as a later plugin release declares it: `height` moves
/// to its own group, `pointSize` becomes a string and `image` is gone.
fn marker_v2() -> Result<Schema, Box<dyn Error>> {
    let default = SchemaGroup::new(
        DEFAULT_GROUP,
        [
            SchemaField::new(marker::LOCATION, ValueType::LatLng),
            SchemaField::new(marker::POINT_COLOR, ValueType::String),
            SchemaField::new(marker::POINT_SIZE, ValueType::String),
        ],
    )?;
    let elevation = SchemaGroup::new("elevation", [SchemaField::new(marker::HEIGHT, ValueType::Number)])?;
    Ok(Schema::new(
        SchemaId::parse("builtin~2/marker")?,
        SchemaGroupList::new([default, elevation])?,
        LinkableFields::default(),
    )?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let scene = SceneId::new();
    let parent = create_property(
        GeometryKind::Point,
        Value::LatLng(property_model::LatLng { lat: 35.68, lng: 139.76 }),
        scene,
        Some(&serde_json::json!({ "color": [0, 128, 255, 255], "size": 12 })),
        "",
    )?;
    let mut child = create_property(
        GeometryKind::Point,
        Value::LatLngHeight(LatLngHeight { lat: 40.0, lng: -122.0, height: 120.0 }),
        scene,
        Some(&serde_json::json!({ "image": "https://example.com/pin.png" })),
        marker::EXTENSION,
    )?;

    let v1 = builtin::schema(child.schema()).ok_or("marker schema is not registered")?;
    validate_property(&child, v1)?;
    println!("child:\n{}", serde_json::to_string_pretty(&child)?);

    let merged = merge(Some(&child), Some(&parent), None).ok_or("schemas differ")?;
    println!("merged:\n{}", serde_json::to_string_pretty(&merged)?);
    let color = Pointer::field_by_schema_group(DEFAULT_GROUP, marker::POINT_COLOR);
    if let Some(field) = merged.field(&color) {
        println!("inherited color: {:?} (overridden: {})", field.value, field.overridden);
    }

    let v2 = marker_v2()?;
    let diff = SchemaDiff::from_schemas(v1, &v2);
    println!(
        "diff {} -> {}: {} deleted, {} moved, {} retyped",
        diff.from,
        diff.to,
        diff.deleted.len(),
        diff.moved.len(),
        diff.type_changed.len()
    );
    let changed = diff.migrate(&mut child);
    validate_property(&child, &v2)?;
    println!("migrated (changed: {changed}):\n{}", serde_json::to_string_pretty(&child)?);

    Ok(())
}
