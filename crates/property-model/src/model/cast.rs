//! Conversions between value types and from loose JSON payloads.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::model::{LatLng, LatLngHeight, Value, ValueType};

/// Loose URL check: non-empty and free of whitespace.
pub fn looks_like_url(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

impl Value {
    /// Converts this value to `target`.
    ///
    /// Casting to the value's own type returns an identical copy. Returns
    /// `None` when no conversion between the two types exists or the payload
    /// cannot be represented in the target type.
    pub fn cast(&self, target: ValueType) -> Option<Value> {
        if self.value_type() == target {
            return Some(self.clone());
        }
        match (self, target) {
            (Value::Bool(b), ValueType::String) => Some(Value::String(b.to_string())),
            (Value::Bool(b), ValueType::Number) => Some(Value::Number(if *b { 1.0 } else { 0.0 })),
            (Value::Number(n), ValueType::String) => Some(Value::String(n.to_string())),
            (Value::Number(n), ValueType::Bool) => Some(Value::Bool(*n != 0.0)),
            (Value::String(s), ValueType::Number) => s.trim().parse().ok().map(Value::Number),
            (Value::String(s), ValueType::Bool) => s.trim().parse().ok().map(Value::Bool),
            (Value::String(s), ValueType::Ref) => Some(Value::Ref(s.clone())),
            (Value::String(s), ValueType::Url) if looks_like_url(s) => Some(Value::Url(s.clone())),
            (Value::Ref(s) | Value::Url(s), ValueType::String) => Some(Value::String(s.clone())),
            (Value::LatLng(ll), ValueType::LatLngHeight) => Some(Value::LatLngHeight((*ll).into())),
            (Value::LatLng(ll), ValueType::Coordinates) => Some(Value::Coordinates(vec![(*ll).into()])),
            (Value::LatLngHeight(llh), ValueType::LatLng) => Some(Value::LatLng((*llh).into())),
            (Value::LatLngHeight(llh), ValueType::Coordinates) => Some(Value::Coordinates(vec![*llh])),
            (Value::Coordinates(c), ValueType::Polygon) => Some(Value::Polygon(vec![c.clone()])),
            (Value::Polygon(rings), ValueType::Coordinates) => {
                rings.first().cloned().map(Value::Coordinates)
            }
            (Value::Rect(r), ValueType::Polygon) => {
                let corner = |lat, lng| LatLngHeight { lat, lng, height: 0.0 };
                Some(Value::Polygon(vec![vec![
                    corner(r.south, r.west),
                    corner(r.south, r.east),
                    corner(r.north, r.east),
                    corner(r.north, r.west),
                    corner(r.south, r.west),
                ]]))
            }
            _ => None,
        }
    }
}

impl ValueType {
    /// Builds a value of this type from a loose JSON payload.
    ///
    /// Numbers and booleans are also accepted in their string form, and
    /// strings accept numbers and booleans. Composite types are read from
    /// objects using their field names (`lat`, `lng`, `height`, ...).
    pub fn value_from_json(self, json: &JsonValue) -> Option<Value> {
        match self {
            ValueType::Bool => match json {
                JsonValue::Bool(b) => Some(Value::Bool(*b)),
                JsonValue::String(s) => s.parse().ok().map(Value::Bool),
                _ => None,
            },
            ValueType::Number => match json {
                JsonValue::Number(n) => n.as_f64().map(Value::Number),
                JsonValue::String(s) => s.trim().parse().ok().map(Value::Number),
                _ => None,
            },
            ValueType::String => match json {
                JsonValue::String(s) => Some(Value::String(s.clone())),
                JsonValue::Number(n) => Some(Value::String(n.to_string())),
                JsonValue::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
            ValueType::Ref => json.as_str().map(|s| Value::Ref(s.to_string())),
            ValueType::Url => json
                .as_str()
                .filter(|s| looks_like_url(s))
                .map(|s| Value::Url(s.to_string())),
            ValueType::LatLng => from_json::<LatLng>(json).map(Value::LatLng),
            ValueType::LatLngHeight => from_json::<LatLngHeight>(json).map(Value::LatLngHeight),
            ValueType::Coordinates => from_json(json).map(Value::Coordinates),
            ValueType::Polygon => from_json(json).map(Value::Polygon),
            ValueType::Rect => from_json(json).map(Value::Rect),
            ValueType::Camera => from_json(json).map(Value::Camera),
            ValueType::Typography => from_json(json).map(Value::Typography),
            ValueType::Spacing => from_json(json).map(Value::Spacing),
        }
    }
}

fn from_json<T: DeserializeOwned>(json: &JsonValue) -> Option<T> {
    if !json.is_object() && !json.is_array() {
        return None;
    }
    serde_json::from_value(json.clone()).ok()
}
