//! Property factory for format decoders.
//!
//! Importers (KML, GeoJSON, CZML, shapefiles) parse their own formats and
//! hand each feature's geometry and style here. The factory writes them into
//! a fresh property of the matching built-in schema, going through the same
//! validated writes as any other caller.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};
use tracing::trace;

use crate::builtin::{self, marker, polygon, polyline, DEFAULT_GROUP};
use crate::error::DecodeError;
use crate::model::{looks_like_url, LatLng, PropertyId, SceneId, Value};
use crate::property::{Pointer, Property};
use crate::schema::Schema;
use crate::util::{rgba_float_to_hex, rgba_to_hex};

/// The geometry kinds decoders produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Polygon,
    Polyline,
}

impl GeometryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Polyline => "Polyline",
        }
    }

    /// The built-in extension used when the decoder names none.
    pub fn default_extension(self) -> &'static str {
        match self {
            GeometryKind::Point => marker::EXTENSION,
            GeometryKind::Polygon => polygon::EXTENSION,
            GeometryKind::Polyline => polyline::EXTENSION,
        }
    }

    /// The field receiving the geometry.
    pub fn geometry_field(self) -> &'static str {
        match self {
            GeometryKind::Point => marker::LOCATION,
            GeometryKind::Polygon => polygon::POLYGON,
            GeometryKind::Polyline => polyline::COORDINATES,
        }
    }

    fn style_keys(self) -> &'static [StyleKey] {
        match self {
            GeometryKind::Point => POINT_STYLE,
            GeometryKind::Polygon => POLYGON_STYLE,
            GeometryKind::Polyline => POLYLINE_STYLE,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [GeometryKind::Point, GeometryKind::Polygon, GeometryKind::Polyline]
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DecodeError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
enum StyleKind {
    Color,
    Number,
    Bool,
    Url,
}

/// Maps a style payload key to the schema field it fills.
struct StyleKey {
    key: &'static str,
    field: &'static str,
    kind: StyleKind,
}

const fn key(key: &'static str, field: &'static str, kind: StyleKind) -> StyleKey {
    StyleKey { key, field, kind }
}

const POINT_STYLE: &[StyleKey] = &[
    key("color", marker::POINT_COLOR, StyleKind::Color),
    key("size", marker::POINT_SIZE, StyleKind::Number),
    key("image", marker::IMAGE, StyleKind::Url),
];

const POLYGON_STYLE: &[StyleKey] = &[
    key("fill", polygon::FILL, StyleKind::Bool),
    key("fillColor", polygon::FILL_COLOR, StyleKind::Color),
    key("stroke", polygon::STROKE, StyleKind::Bool),
    key("strokeColor", polygon::STROKE_COLOR, StyleKind::Color),
    key("strokeWidth", polygon::STROKE_WIDTH, StyleKind::Number),
];

const POLYLINE_STYLE: &[StyleKey] = &[
    key("strokeColor", polyline::STROKE_COLOR, StyleKind::Color),
    key("strokeWidth", polyline::STROKE_WIDTH, StyleKind::Number),
];

/// Creates a property of `kind` from a decoded geometry and optional style.
///
/// An empty `extension` selects the kind's default built-in schema. Point
/// geometry is a `LatLng` or `LatLngHeight` (whose height fills the
/// `height` field), polygons are `Polygon` values and polylines
/// `Coordinates`. The style payload must be a JSON object; unknown keys are
/// ignored.
pub fn create_property(
    kind: GeometryKind,
    geometry: Value,
    scene: SceneId,
    style: Option<&JsonValue>,
    extension: &str,
) -> Result<Property, DecodeError> {
    let extension = if extension.is_empty() {
        kind.default_extension()
    } else {
        extension
    };
    let schema = builtin::schema_by_extension(extension)
        .ok_or_else(|| DecodeError::UnknownExtension(extension.to_string()))?;
    let mut writer = FeatureWriter {
        property: Property::new(PropertyId::new(), scene, schema.id().clone())?,
        schema,
    };

    match (kind, geometry) {
        (GeometryKind::Point, Value::LatLng(ll)) => {
            writer.set(marker::LOCATION, Value::LatLng(ll))?;
        }
        (GeometryKind::Point, Value::LatLngHeight(llh)) => {
            writer.set(marker::LOCATION, Value::LatLng(LatLng::from(llh)))?;
            writer.set(marker::HEIGHT, Value::Number(llh.height))?;
        }
        (GeometryKind::Polygon, v @ Value::Polygon(_)) => writer.set(polygon::POLYGON, v)?,
        (GeometryKind::Polyline, v @ Value::Coordinates(_)) => writer.set(polyline::COORDINATES, v)?,
        (kind, other) => {
            return Err(DecodeError::GeometryType {
                kind,
                found: other.value_type(),
            });
        }
    }

    if let Some(style) = style_object(style)? {
        for sk in kind.style_keys() {
            if let Some(raw) = style.get(sk.key) {
                let value = style_value(sk, raw)?;
                writer.set(sk.field, value)?;
            }
        }
    }

    Ok(writer.property)
}

struct FeatureWriter<'a> {
    property: Property,
    schema: &'a Schema,
}

impl FeatureWriter<'_> {
    fn set(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
        trace!(field, value = %value, "writing decoded field");
        let ptr = Pointer::field_by_schema_group(DEFAULT_GROUP, field);
        self.property.update_value(self.schema, &ptr, Some(value))?;
        Ok(())
    }
}

fn style_object(style: Option<&JsonValue>) -> Result<Option<&Map<String, JsonValue>>, DecodeError> {
    match style {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Object(map)) => Ok(Some(map)),
        Some(_) => Err(DecodeError::FieldType {
            field: "style".to_string(),
            expected: "object",
        }),
    }
}

fn style_value(sk: &StyleKey, raw: &JsonValue) -> Result<Value, DecodeError> {
    let wrong_type = |expected| DecodeError::FieldType {
        field: sk.key.to_string(),
        expected,
    };
    match sk.kind {
        StyleKind::Color => color(raw).ok_or_else(|| wrong_type("color"))?.map(Value::String),
        StyleKind::Number => raw.as_f64().map(Value::Number).ok_or_else(|| wrong_type("number")),
        StyleKind::Bool => raw.as_bool().map(Value::Bool).ok_or_else(|| wrong_type("bool")),
        StyleKind::Url => raw
            .as_str()
            .filter(|s| looks_like_url(s))
            .map(|s| Value::Url(s.to_string()))
            .ok_or_else(|| wrong_type("url")),
    }
}

/// Reads a colour from a hex string or an RGBA array.
///
/// Returns `None` for payloads of the wrong shape. Arrays of integers use
/// 8-bit channels, as do float arrays of whole numbers with a channel
/// above 1. Any other float array uses unit channels.
fn color(raw: &JsonValue) -> Option<Result<String, DecodeError>> {
    match raw {
        JsonValue::String(s) => Some(Ok(s.clone())),
        JsonValue::Array(items) => {
            if let Some(channels) = items.iter().map(JsonValue::as_i64).collect::<Option<Vec<_>>>() {
                return Some(rgba_to_hex(&channels).map(|hex| format!("#{hex}")));
            }
            let channels = items.iter().map(JsonValue::as_f64).collect::<Option<Vec<_>>>()?;
            let eight_bit =
                channels.iter().all(|c| c.fract() == 0.0) && channels.iter().any(|c| *c > 1.0);
            let hex = if eight_bit {
                let channels: Vec<i64> = channels.iter().map(|c| *c as i64).collect();
                rgba_to_hex(&channels)
            } else {
                rgba_float_to_hex(&channels)
            };
            Some(hex.map(|hex| format!("#{hex}")))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ValidationError;
    use crate::model::{LatLngHeight, ValueType};

    fn field_value(p: &Property, field: &str) -> Option<Value> {
        p.field(&Pointer::field_by_schema_group(DEFAULT_GROUP, field))
            .and_then(|gf| gf.field.value().cloned())
    }

    #[test]
    fn test_create_point() {
        let scene = SceneId::new();
        let p = create_property(
            GeometryKind::Point,
            Value::LatLng(LatLng { lat: 40.0, lng: -122.0 }),
            scene,
            None,
            "",
        )
        .unwrap();
        assert_eq!(p.scene(), scene);
        assert_eq!(p.schema(), &builtin::schema_id(marker::EXTENSION));
        assert_eq!(
            field_value(&p, marker::LOCATION),
            Some(Value::LatLng(LatLng { lat: 40.0, lng: -122.0 }))
        );
        assert_eq!(field_value(&p, marker::HEIGHT), None);
    }

    #[test]
    fn test_create_point_with_height_and_style() {
        let style = json!({
            "color": [255, 165, 0, 255],
            "size": 4,
            "image": "https://example.com/pin.png",
            "unrelated": true,
        });
        let p = create_property(
            GeometryKind::Point,
            Value::LatLngHeight(LatLngHeight { lat: 1.0, lng: 2.0, height: 30.0 }),
            SceneId::new(),
            Some(&style),
            marker::EXTENSION,
        )
        .unwrap();
        assert_eq!(field_value(&p, marker::LOCATION), Some(Value::LatLng(LatLng { lat: 1.0, lng: 2.0 })));
        assert_eq!(field_value(&p, marker::HEIGHT), Some(Value::Number(30.0)));
        assert_eq!(field_value(&p, marker::POINT_COLOR), Some(Value::from("#ffa500ff")));
        assert_eq!(field_value(&p, marker::POINT_SIZE), Some(Value::Number(4.0)));
        assert_eq!(
            field_value(&p, marker::IMAGE),
            Some(Value::Url("https://example.com/pin.png".into()))
        );
    }

    #[test]
    fn test_create_polygon_and_polyline() {
        let ring = vec![LatLngHeight::default(); 4];
        let style = json!({
            "fill": true,
            "fillColor": [1.0, 0.5, 0.0, 1.0],
            "strokeColor": "#000000ff",
            "strokeWidth": 2.5,
        });
        let p = create_property(
            GeometryKind::Polygon,
            Value::Polygon(vec![ring.clone()]),
            SceneId::new(),
            Some(&style),
            "",
        )
        .unwrap();
        assert_eq!(field_value(&p, polygon::POLYGON), Some(Value::Polygon(vec![ring.clone()])));
        assert_eq!(field_value(&p, polygon::FILL), Some(Value::Bool(true)));
        assert_eq!(field_value(&p, polygon::FILL_COLOR), Some(Value::from("#ff8000ff")));
        assert_eq!(field_value(&p, polygon::STROKE_COLOR), Some(Value::from("#000000ff")));
        assert_eq!(field_value(&p, polygon::STROKE_WIDTH), Some(Value::Number(2.5)));

        let p = create_property(GeometryKind::Polyline, Value::Coordinates(ring.clone()), SceneId::new(), None, "")
            .unwrap();
        assert_eq!(field_value(&p, polyline::COORDINATES), Some(Value::Coordinates(ring)));
    }

    #[test]
    fn test_whole_float_channels_are_eight_bit() {
        let color_of = |raw: JsonValue| {
            let style = json!({ "color": raw });
            let p = create_property(GeometryKind::Point, Value::LatLng(LatLng::default()), SceneId::new(), Some(&style), "")
                .unwrap();
            field_value(&p, marker::POINT_COLOR)
        };
        assert_eq!(color_of(json!([255.0, 165.0, 0.0, 255.0])), Some(Value::from("#ffa500ff")));
        assert_eq!(color_of(json!([0.0, 1.0, 0.0, 1.0])), Some(Value::from("#00ff00ff")));
        assert_eq!(color_of(json!([1, 1, 1, 1])), Some(Value::from("#01010101")));
    }

    #[test]
    fn test_geometry_type_errors() {
        let err = create_property(
            GeometryKind::Polygon,
            Value::LatLng(LatLng::default()),
            SceneId::new(),
            None,
            "",
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::GeometryType {
                kind: GeometryKind::Polygon,
                found: ValueType::LatLng,
            }
        );
    }

    #[test]
    fn test_style_errors() {
        let point = || Value::LatLng(LatLng::default());
        let create = |style: JsonValue| create_property(GeometryKind::Point, point(), SceneId::new(), Some(&style), "");

        assert_eq!(create(json!({"color": [400, 165, 0, 1]})).unwrap_err(), DecodeError::BadColor);
        assert_eq!(create(json!({"color": [255, 165, 0]})).unwrap_err(), DecodeError::BadColor);
        assert_eq!(create(json!({"color": [1.5, 0, 0, 1]})).unwrap_err(), DecodeError::BadColor);
        assert_eq!(create(json!({"color": [400.0, 0.0, 0.0, 1.0]})).unwrap_err(), DecodeError::BadColor);
        assert!(matches!(
            create(json!({"color": {"r": 1}})),
            Err(DecodeError::FieldType { expected: "color", .. })
        ));
        assert!(matches!(
            create(json!({"size": "big"})),
            Err(DecodeError::FieldType { expected: "number", .. })
        ));
        assert!(matches!(
            create(json!({"image": "not a url"})),
            Err(DecodeError::FieldType { expected: "url", .. })
        ));
        assert!(matches!(
            create(json!([1, 2])),
            Err(DecodeError::FieldType { expected: "object", .. })
        ));
        assert!(matches!(
            create(json!({"size": -1})),
            Err(DecodeError::Validation(ValidationError::InvalidValue { .. }))
        ));
        assert!(create(JsonValue::Null).is_ok());
    }

    #[test]
    fn test_unknown_extension() {
        let err = create_property(GeometryKind::Point, Value::LatLng(LatLng::default()), SceneId::new(), None, "circle")
            .unwrap_err();
        assert_eq!(err, DecodeError::UnknownExtension("circle".into()));
    }

    #[test]
    fn test_geometry_kind_from_str() {
        assert_eq!("Point".parse::<GeometryKind>(), Ok(GeometryKind::Point));
        assert_eq!("polyline".parse::<GeometryKind>(), Ok(GeometryKind::Polyline));
        assert_eq!(
            "Circle".parse::<GeometryKind>(),
            Err(DecodeError::UnknownKind("Circle".into()))
        );
        assert_eq!(GeometryKind::Polygon.geometry_field(), polygon::POLYGON);
    }
}
