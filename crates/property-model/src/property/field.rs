//! Fields: typed value slots of a group.

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, ValidationError, ValueViolation};
use crate::model::{FieldId, OptionalValue, Value, ValueType};
use crate::property::{DatasetLoader, Links};
use crate::schema::SchemaField;

/// One named, typed, optionally dataset-linked value slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    id: FieldId,
    #[serde(flatten)]
    value: OptionalValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    links: Option<Links>,
}

impl Field {
    pub fn new(id: impl Into<FieldId>, value: OptionalValue) -> Self {
        Self {
            id: id.into(),
            value,
            links: None,
        }
    }

    /// An empty field of the schema field's declared type.
    pub fn from_schema_field(schema_field: &SchemaField) -> Self {
        Self::new(
            schema_field.id().clone(),
            OptionalValue::empty(schema_field.value_type()),
        )
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.value()
    }

    pub fn optional_value(&self) -> &OptionalValue {
        &self.value
    }

    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    pub fn is_linked(&self) -> bool {
        self.links.as_ref().is_some_and(Links::is_linked)
    }

    /// True when the field holds no value and no dataset links.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && !self.is_linked()
    }

    /// Writes `value` after checking it against `schema_field`.
    ///
    /// On error the field is left unchanged.
    pub fn update(
        &mut self,
        value: Option<Value>,
        schema_field: &SchemaField,
    ) -> Result<(), ValidationError> {
        if schema_field.id() != &self.id {
            return Err(ValidationError::FieldMismatch {
                expected: schema_field.id().clone(),
                found: self.id.clone(),
            });
        }
        let invalid = |source| ValidationError::InvalidValue {
            field: self.id.clone(),
            source,
        };
        let ty = self.value_type();
        if schema_field.value_type() != ty {
            return Err(invalid(ValueViolation::TypeMismatch {
                expected: schema_field.value_type(),
                found: ty,
            }));
        }
        let Some(candidate) = OptionalValue::new(ty, value.clone()) else {
            let found = value.as_ref().map_or(ty, Value::value_type);
            return Err(invalid(ValueViolation::TypeMismatch { expected: ty, found }));
        };
        schema_field.validate(&candidate).map_err(invalid)?;
        self.value = candidate;
        Ok(())
    }

    /// Writes `value` without a schema. Values of another type are refused.
    pub fn update_unchecked(&mut self, value: Option<Value>) -> bool {
        self.value.set_value(value)
    }

    /// Converts the field to `ty`.
    ///
    /// A value that cannot be converted leaves the field empty. Links point
    /// at dataset fields of the old type and are dropped. Casting to the
    /// current type is a no-op and returns `false`.
    pub fn cast(&mut self, ty: ValueType) -> bool {
        if self.value_type() == ty {
            return false;
        }
        self.value = self.value.cast(ty);
        self.links = None;
        true
    }

    pub fn link(&mut self, links: Links) {
        self.links = Some(links);
    }

    pub fn unlink(&mut self) {
        self.links = None;
    }

    /// Resolves the value supplied by the field's links, if any.
    pub fn dataset_value(&self, loader: &dyn DatasetLoader) -> Result<Option<Value>, LoaderError> {
        match &self.links {
            Some(links) => links.dataset_value(loader),
            None => Ok(None),
        }
    }

    /// A minimal schema field describing this field.
    pub fn guess_schema(&self) -> SchemaField {
        SchemaField::new(self.id.clone(), self.value_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatasetFieldId, DatasetSchemaId, LatLng};
    use crate::property::Link;

    fn size_field() -> SchemaField {
        SchemaField::new("size", ValueType::Number).with_min(0.0)
    }

    #[test]
    fn test_update_validates() {
        let mut field = Field::from_schema_field(&size_field());
        assert!(field.is_empty());

        field.update(Some(Value::Number(3.0)), &size_field()).unwrap();
        assert_eq!(field.value(), Some(&Value::Number(3.0)));

        let err = field.update(Some(Value::Number(-1.0)), &size_field()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { source: ValueViolation::BelowMin { .. }, .. }
        ));
        assert_eq!(field.value(), Some(&Value::Number(3.0)));

        let err = field.update(Some(Value::from("3")), &size_field()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { source: ValueViolation::TypeMismatch { .. }, .. }
        ));

        field.update(None, &size_field()).unwrap();
        assert!(field.is_empty());
    }

    #[test]
    fn test_update_rejects_other_schema_field() {
        let mut field = Field::from_schema_field(&size_field());
        let other = SchemaField::new("other", ValueType::Number);
        assert!(matches!(
            field.update(Some(Value::Number(1.0)), &other),
            Err(ValidationError::FieldMismatch { .. })
        ));
    }

    #[test]
    fn test_update_unchecked_keeps_type() {
        let mut field = Field::new("a", OptionalValue::empty(ValueType::Number));
        assert!(!field.update_unchecked(Some(Value::from("x"))));
        assert!(field.value().is_none());
        assert!(field.update_unchecked(Some(Value::Number(-100.0))));
        assert_eq!(field.value(), Some(&Value::Number(-100.0)));
        assert!(field.update_unchecked(None));
        assert!(field.is_empty());
    }

    #[test]
    fn test_linked_field_is_not_empty() {
        let mut field = Field::new("a", OptionalValue::empty(ValueType::LatLng))
            .with_links(Link::schema_field(DatasetSchemaId::new(), DatasetFieldId::new()).into());
        assert!(field.value().is_none());
        assert!(!field.is_empty());
        field.unlink();
        assert!(field.is_empty());

        let unlinked = Field::new("a", OptionalValue::empty(ValueType::LatLng)).with_links(Links::default());
        assert!(unlinked.is_empty());
    }

    #[test]
    fn test_cast_to_same_type_is_noop() {
        let mut field = Field::new("a", OptionalValue::some(Value::from("x")))
            .with_links(Link::schema_field(DatasetSchemaId::new(), DatasetFieldId::new()).into());
        let before = field.clone();
        assert!(!field.cast(ValueType::String));
        assert_eq!(field, before);
    }

    #[test]
    fn test_cast_converts_or_empties() {
        let mut field = Field::new("a", OptionalValue::some(Value::from("12")));
        assert!(field.cast(ValueType::Number));
        assert_eq!(field.value(), Some(&Value::Number(12.0)));

        let mut field = Field::new("a", OptionalValue::some(Value::LatLng(LatLng::default())))
            .with_links(Link::default().into());
        assert!(field.cast(ValueType::Bool));
        assert_eq!(field.value_type(), ValueType::Bool);
        assert!(field.is_empty());
        assert!(!field.is_linked());
    }

    #[test]
    fn test_guess_schema() {
        let field = Field::new("a", OptionalValue::some(Value::Bool(true)));
        let guessed = field.guess_schema();
        assert_eq!(guessed.id().as_str(), "a");
        assert_eq!(guessed.value_type(), ValueType::Bool);
    }
}
