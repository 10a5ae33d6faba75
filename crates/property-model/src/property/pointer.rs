//! Addresses into property instances and schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{FieldId, ItemId, SchemaGroupId};

/// A partial address made of optional (schema group, item, field)
/// coordinates.
///
/// An absent coordinate is a wildcard. Fully specified pointers address a
/// single location; partial ones match every location they do not exclude.
/// A pointer holding only a field ID is the "unqualified field" shape,
/// which schema lookups resolve through the group declaring that field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pointer {
    schema_group: Option<SchemaGroupId>,
    item: Option<ItemId>,
    field: Option<FieldId>,
}

impl Pointer {
    pub fn new(
        schema_group: Option<SchemaGroupId>,
        item: Option<ItemId>,
        field: Option<FieldId>,
    ) -> Self {
        Self {
            schema_group,
            item,
            field,
        }
    }

    /// Matches everything.
    pub fn everything() -> Self {
        Self::default()
    }

    /// A field anywhere.
    pub fn field_only(field: impl Into<FieldId>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::default()
        }
    }

    /// A field within any item of a schema group.
    pub fn field_by_schema_group(
        schema_group: impl Into<SchemaGroupId>,
        field: impl Into<FieldId>,
    ) -> Self {
        Self {
            schema_group: Some(schema_group.into()),
            item: None,
            field: Some(field.into()),
        }
    }

    /// A field within one exact item.
    pub fn field_by_item(item: ItemId, field: impl Into<FieldId>) -> Self {
        Self {
            schema_group: None,
            item: Some(item),
            field: Some(field.into()),
        }
    }

    /// A fully specified field location.
    pub fn field(schema_group: impl Into<SchemaGroupId>, item: ItemId, field: impl Into<FieldId>) -> Self {
        Self {
            schema_group: Some(schema_group.into()),
            item: Some(item),
            field: Some(field.into()),
        }
    }

    /// An exact item.
    pub fn item(item: ItemId) -> Self {
        Self {
            item: Some(item),
            ..Self::default()
        }
    }

    /// Every item of a schema group.
    pub fn item_by_schema_group(schema_group: impl Into<SchemaGroupId>) -> Self {
        Self {
            schema_group: Some(schema_group.into()),
            ..Self::default()
        }
    }

    /// An exact item of a schema group.
    pub fn item_in_schema_group(schema_group: impl Into<SchemaGroupId>, item: ItemId) -> Self {
        Self {
            schema_group: Some(schema_group.into()),
            item: Some(item),
            field: None,
        }
    }

    pub fn schema_group(&self) -> Option<&SchemaGroupId> {
        self.schema_group.as_ref()
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.item.as_ref()
    }

    pub fn field_id(&self) -> Option<&FieldId> {
        self.field.as_ref()
    }

    /// The field ID, only when it is the sole coordinate.
    pub fn field_only_id(&self) -> Option<&FieldId> {
        if self.schema_group.is_none() && self.item.is_none() {
            self.field.as_ref()
        } else {
            None
        }
    }

    pub fn is_field_only(&self) -> bool {
        self.field_only_id().is_some()
    }

    pub fn is_everything(&self) -> bool {
        self.schema_group.is_none() && self.item.is_none() && self.field.is_none()
    }

    /// Drops the schema-group and item coordinates, keeping the field.
    pub fn with_field_only(&self) -> Pointer {
        Pointer {
            schema_group: None,
            item: None,
            field: self.field.clone(),
        }
    }

    pub fn all(&self) -> (Option<&SchemaGroupId>, Option<&ItemId>, Option<&FieldId>) {
        (self.schema_group(), self.item_id(), self.field_id())
    }

    pub fn test(&self, schema_group: &SchemaGroupId, item: &ItemId, field: &FieldId) -> bool {
        self.test_item(schema_group, item) && self.test_field(field)
    }

    pub fn test_item(&self, schema_group: &SchemaGroupId, item: &ItemId) -> bool {
        self.test_schema_group(schema_group) && self.item.as_ref().is_none_or(|i| i == item)
    }

    pub fn test_schema_group(&self, schema_group: &SchemaGroupId) -> bool {
        self.schema_group.as_ref().is_none_or(|sg| sg == schema_group)
    }

    pub fn test_field(&self, field: &FieldId) -> bool {
        self.field.as_ref().is_none_or(|f| f == field)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |p: Option<String>| p.unwrap_or_else(|| "*".to_string());
        write!(
            f,
            "{}/{}/{}",
            part(self.schema_group.as_ref().map(ToString::to_string)),
            part(self.item.as_ref().map(ToString::to_string)),
            part(self.field.as_ref().map(ToString::to_string)),
        )
    }
}
