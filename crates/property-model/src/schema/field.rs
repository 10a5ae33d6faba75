//! Schema field definitions.

use serde::{Deserialize, Serialize};

use crate::error::ValueViolation;
use crate::model::{FieldId, OptionalValue, Value, ValueType};
use crate::property::Group;

/// Editor hint for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaFieldUi {
    Layer,
    Multiline,
    Selection,
    Color,
    Range,
    Slider,
    Image,
    Video,
    File,
    CameraPose,
    Datetime,
    Padding,
    Margin,
}

/// One entry of a string field's enumerated choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFieldChoice {
    pub key: String,
    pub label: Option<String>,
    pub icon: Option<String>,
}

impl SchemaFieldChoice {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            icon: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Availability condition: the field (or group) is meaningful only while
/// another field of the same group holds `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: FieldId,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<FieldId>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    /// Tests the condition against a live group.
    pub fn test(&self, group: &Group) -> bool {
        group
            .field(&self.field)
            .and_then(|f| f.value())
            .is_some_and(|v| *v == self.value)
    }
}

/// Definition of one field of a schema group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    id: FieldId,
    #[serde(rename = "type")]
    ty: ValueType,
    title: Option<String>,
    description: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
    default_value: Option<Value>,
    ui: Option<SchemaFieldUi>,
    /// Only meaningful for number fields.
    min: Option<f64>,
    max: Option<f64>,
    /// Only meaningful for string fields.
    choices: Vec<SchemaFieldChoice>,
    condition: Option<Condition>,
}

impl SchemaField {
    pub fn new(id: impl Into<FieldId>, ty: ValueType) -> Self {
        Self {
            id: id.into(),
            ty,
            title: None,
            description: None,
            prefix: None,
            suffix: None,
            default_value: None,
            ui: None,
            min: None,
            max: None,
            choices: Vec::new(),
            condition: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Sets the default value. A value of another type is ignored.
    pub fn with_default_value(mut self, value: Value) -> Self {
        if value.value_type() == self.ty {
            self.default_value = Some(value);
        }
        self
    }

    pub fn with_ui(mut self, ui: SchemaFieldUi) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = SchemaFieldChoice>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn ui(&self) -> Option<SchemaFieldUi> {
        self.ui
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn choices(&self) -> &[SchemaFieldChoice] {
        &self.choices
    }

    pub fn choice(&self, key: &str) -> Option<&SchemaFieldChoice> {
        self.choices.iter().find(|c| c.key == key)
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Checks a value against this field.
    ///
    /// An absent value always passes. Otherwise the declared type must match
    /// and numbers must respect `min`/`max`, strings the choice keys (when
    /// choices are declared).
    pub fn validate(&self, value: &OptionalValue) -> Result<(), ValueViolation> {
        let Some(v) = value.value() else {
            return Ok(());
        };
        if value.value_type() != self.ty || v.value_type() != self.ty {
            return Err(ValueViolation::TypeMismatch {
                expected: self.ty,
                found: v.value_type(),
            });
        }
        match v {
            Value::Number(n) => {
                if let Some(min) = self.min {
                    if *n < min {
                        return Err(ValueViolation::BelowMin { value: *n, min });
                    }
                }
                if let Some(max) = self.max {
                    if *n > max {
                        return Err(ValueViolation::AboveMax { value: *n, max });
                    }
                }
            }
            Value::String(s) if !self.choices.is_empty() => {
                if self.choice(s).is_none() {
                    return Err(ValueViolation::NotAChoice { value: s.clone() });
                }
            }
            _ => {}
        }
        Ok(())
    }
}
