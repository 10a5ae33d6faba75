//! A declared type paired with a possibly absent value.

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::model::{Value, ValueType};

/// A field slot: the declared type plus an optional value of that type.
///
/// Keeps "field exists but is empty" distinct from "field is absent".
/// When a value is present its type always equals the declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptionalValue")]
pub struct OptionalValue {
    #[serde(rename = "type")]
    ty: ValueType,
    value: Option<Value>,
}

#[derive(Deserialize)]
struct RawOptionalValue {
    #[serde(rename = "type")]
    ty: ValueType,
    #[serde(default)]
    value: Option<Value>,
}

impl TryFrom<RawOptionalValue> for OptionalValue {
    type Error = BuildError;

    fn try_from(raw: RawOptionalValue) -> Result<Self, Self::Error> {
        match &raw.value {
            Some(v) if v.value_type() != raw.ty => Err(BuildError::ValueTypeMismatch {
                expected: raw.ty,
                found: v.value_type(),
            }),
            _ => Ok(Self {
                ty: raw.ty,
                value: raw.value,
            }),
        }
    }
}

impl OptionalValue {
    /// Creates a slot, returning `None` if `value` is not of type `ty`.
    pub fn new(ty: ValueType, value: Option<Value>) -> Option<Self> {
        match &value {
            Some(v) if v.value_type() != ty => None,
            _ => Some(Self { ty, value }),
        }
    }

    /// An empty slot of the given type.
    pub fn empty(ty: ValueType) -> Self {
        Self { ty, value: None }
    }

    /// A filled slot typed after its value.
    pub fn some(value: Value) -> Self {
        Self {
            ty: value.value_type(),
            value: Some(value),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Replaces the value. Values of another type are refused and the slot
    /// is left unchanged.
    pub fn set_value(&mut self, value: Option<Value>) -> bool {
        match value {
            Some(v) if v.value_type() != self.ty => false,
            value => {
                self.value = value;
                true
            }
        }
    }

    /// Converts the slot to `ty`, leaving it empty when the value cannot be
    /// converted.
    pub fn cast(&self, ty: ValueType) -> OptionalValue {
        Self {
            ty,
            value: self.value.as_ref().and_then(|v| v.cast(ty)),
        }
    }
}
