//! Value types for property fields.
//!
//! A [`Value`] is an immutable, typed payload. Every value reports its
//! [`ValueType`]; field slots pair a declared type with a possibly absent
//! value (see [`OptionalValue`](crate::model::OptionalValue)).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Value kinds a schema field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Number,
    String,
    /// Reference to another object by ID.
    Ref,
    Url,
    LatLng,
    LatLngHeight,
    Coordinates,
    Polygon,
    Rect,
    Camera,
    Typography,
    Spacing,
}

impl ValueType {
    pub const ALL: [ValueType; 13] = [
        ValueType::Bool,
        ValueType::Number,
        ValueType::String,
        ValueType::Ref,
        ValueType::Url,
        ValueType::LatLng,
        ValueType::LatLngHeight,
        ValueType::Coordinates,
        ValueType::Polygon,
        ValueType::Rect,
        ValueType::Camera,
        ValueType::Typography,
        ValueType::Spacing,
    ];

    /// Returns the stable name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Ref => "ref",
            ValueType::Url => "url",
            ValueType::LatLng => "latlng",
            ValueType::LatLngHeight => "latlngheight",
            ValueType::Coordinates => "coordinates",
            ValueType::Polygon => "polygon",
            ValueType::Rect => "rect",
            ValueType::Camera => "camera",
            ValueType::Typography => "typography",
            ValueType::Spacing => "spacing",
        }
    }

    /// Looks up a type by its stable name.
    pub fn from_name(name: &str) -> Option<ValueType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Every constructed `ValueType` denotes a registered kind.
    pub fn valid(self) -> bool {
        true
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| BuildError::UnknownValueType { input: s.to_string() })
    }
}

/// WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// WGS84 coordinate with a height in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLngHeight {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub height: f64,
}

impl From<LatLng> for LatLngHeight {
    fn from(ll: LatLng) -> Self {
        Self {
            lat: ll.lat,
            lng: ll.lng,
            height: 0.0,
        }
    }
}

impl From<LatLngHeight> for LatLng {
    fn from(llh: LatLngHeight) -> Self {
        Self {
            lat: llh.lat,
            lng: llh.lng,
        }
    }
}

/// Axis-aligned bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Camera pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
    pub fov: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
    JustifyAll,
}

/// Text styling. Unset members fall back to the renderer defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_size: Option<i32>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

/// Box spacing (padding or margin) in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spacing {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// A typed value stored in a property field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    Ref(String),
    Url(String),
    LatLng(LatLng),
    LatLngHeight(LatLngHeight),
    /// A path of coordinates.
    Coordinates(Vec<LatLngHeight>),
    /// Rings of coordinates; the first ring is the outer boundary.
    Polygon(Vec<Vec<LatLngHeight>>),
    Rect(Rect),
    Camera(Camera),
    Typography(Typography),
    Spacing(Spacing),
}

impl Value {
    /// Returns the type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Ref(_) => ValueType::Ref,
            Value::Url(_) => ValueType::Url,
            Value::LatLng(_) => ValueType::LatLng,
            Value::LatLngHeight(_) => ValueType::LatLngHeight,
            Value::Coordinates(_) => ValueType::Coordinates,
            Value::Polygon(_) => ValueType::Polygon,
            Value::Rect(_) => ValueType::Rect,
            Value::Camera(_) => ValueType::Camera,
            Value::Typography(_) => ValueType::Typography,
            Value::Spacing(_) => ValueType::Spacing,
        }
    }

    /// Always false: an absent payload is modelled as `None` around the value.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text of string-like values (string, ref, url).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Ref(s) | Value::Url(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_lat_lng(&self) -> Option<LatLng> {
        match self {
            Value::LatLng(ll) => Some(*ll),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<LatLng> for Value {
    fn from(ll: LatLng) -> Self {
        Value::LatLng(ll)
    }
}

impl From<LatLngHeight> for Value {
    fn from(llh: LatLngHeight) -> Self {
        Value::LatLngHeight(llh)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Ref(s) => write!(f, "REF({s})"),
            Value::Url(s) => write!(f, "URL({s})"),
            Value::LatLng(ll) => write!(f, "LATLNG({}, {})", ll.lat, ll.lng),
            Value::LatLngHeight(llh) => {
                write!(f, "LATLNGHEIGHT({}, {}, {})", llh.lat, llh.lng, llh.height)
            }
            Value::Coordinates(c) => write!(f, "COORDINATES[{}]", c.len()),
            Value::Polygon(rings) => write!(f, "POLYGON[{}]", rings.len()),
            Value::Rect(r) => write!(f, "RECT({}, {}, {}, {})", r.west, r.south, r.east, r.north),
            Value::Camera(c) => write!(f, "CAMERA({}, {}, {})", c.lat, c.lng, c.altitude),
            Value::Typography(_) => f.write_str("TYPOGRAPHY"),
            Value::Spacing(s) => write!(f, "SPACING({}, {}, {}, {})", s.top, s.right, s.bottom, s.left),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_names_roundtrip() {
        for ty in ValueType::ALL {
            assert_eq!(ValueType::from_name(ty.as_str()), Some(ty));
            assert!(ty.valid());
        }
        assert_eq!(ValueType::from_name("unknown"), None);
        assert_eq!("latlng".parse::<ValueType>(), Ok(ValueType::LatLng));
        assert_eq!(
            "colour".parse::<ValueType>(),
            Err(BuildError::UnknownValueType { input: "colour".into() })
        );
    }

    #[test]
    fn test_value_reports_its_type() {
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
        assert_eq!(Value::Number(1.0).value_type(), ValueType::Number);
        assert_eq!(Value::Url("https://example.com".into()).value_type(), ValueType::Url);
        assert_eq!(
            Value::LatLng(LatLng { lat: 1.0, lng: 2.0 }).value_type(),
            ValueType::LatLng
        );
        assert_eq!(Value::Polygon(vec![]).value_type(), ValueType::Polygon);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::Url("u".into()).as_str(), Some("u"));
        assert_eq!(Value::Number(2.0).as_str(), None);
        assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert!(!Value::String(String::new()).is_empty());
    }

    #[test]
    fn test_value_serde_shape() {
        let v = Value::LatLng(LatLng { lat: 40.0, lng: -122.0 });
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "latlng", "value": {"lat": 40.0, "lng": -122.0}})
        );
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }
}
