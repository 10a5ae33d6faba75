//! Property schemas.
//!
//! A [`Schema`] is the immutable, externally supplied definition of which
//! groups and fields a property of a given [`SchemaId`] may contain.

pub mod field;
pub mod group;

use serde::{Deserialize, Serialize};

pub use field::{Condition, SchemaField, SchemaFieldChoice, SchemaFieldUi};
pub use group::{SchemaGroup, SchemaGroupAndField, SchemaGroupList};

use crate::error::BuildError;
use crate::model::{SchemaGroupId, SchemaId, ValueType};
use crate::property::Pointer;

/// Fields used as targets when a dataset is linked automatically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkableFields {
    /// Receives a dataset's `LatLng` field.
    pub lat_lng: Option<Pointer>,
    /// Receives a dataset's `Url` field.
    pub url: Option<Pointer>,
}

impl LinkableFields {
    /// The linkable field for values of type `ty`, if one is declared.
    pub fn pointer_by_type(&self, ty: ValueType) -> Option<&Pointer> {
        match ty {
            ValueType::LatLng => self.lat_lng.as_ref(),
            ValueType::Url => self.url.as_ref(),
            _ => None,
        }
    }

    fn validate(&self, groups: &SchemaGroupList) -> Result<(), BuildError> {
        let checks = [
            (ValueType::LatLng, self.lat_lng.as_ref()),
            (ValueType::Url, self.url.as_ref()),
        ];
        for (expected, pointer) in checks {
            let Some(pointer) = pointer else { continue };
            let matches = groups
                .field_by_pointer(pointer)
                .is_some_and(|f| f.value_type() == expected);
            if !matches {
                return Err(BuildError::InvalidLinkableField {
                    expected,
                    pointer: pointer.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A property schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSchema")]
pub struct Schema {
    id: SchemaId,
    groups: SchemaGroupList,
    linkable_fields: LinkableFields,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    id: SchemaId,
    groups: SchemaGroupList,
    #[serde(default)]
    linkable_fields: LinkableFields,
}

impl TryFrom<RawSchema> for Schema {
    type Error = BuildError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        Schema::new(raw.id, raw.groups, raw.linkable_fields)
    }
}

impl Schema {
    /// Creates a schema. Linkable fields must resolve to fields of the
    /// matching type.
    pub fn new(
        id: SchemaId,
        groups: SchemaGroupList,
        linkable_fields: LinkableFields,
    ) -> Result<Self, BuildError> {
        linkable_fields.validate(&groups)?;
        Ok(Self {
            id,
            groups,
            linkable_fields,
        })
    }

    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    pub fn groups(&self) -> &SchemaGroupList {
        &self.groups
    }

    pub fn group(&self, id: &SchemaGroupId) -> Option<&SchemaGroup> {
        self.groups.group(id)
    }

    pub fn linkable_fields(&self) -> &LinkableFields {
        &self.linkable_fields
    }

    pub fn field_by_pointer(&self, ptr: &Pointer) -> Option<&SchemaField> {
        self.groups.field_by_pointer(ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> SchemaGroupList {
        SchemaGroupList::new([SchemaGroup::new(
            "default",
            [
                SchemaField::new("location", ValueType::LatLng),
                SchemaField::new("image", ValueType::Url),
                SchemaField::new("name", ValueType::String),
            ],
        )
        .unwrap()])
        .unwrap()
    }

    #[test]
    fn test_linkable_fields_are_validated() {
        let id = SchemaId::parse("test/marker").unwrap();
        let ok = LinkableFields {
            lat_lng: Some(Pointer::field_by_schema_group("default", "location")),
            url: Some(Pointer::field_only("image")),
        };
        let schema = Schema::new(id.clone(), groups(), ok).unwrap();
        assert_eq!(
            schema.linkable_fields().pointer_by_type(ValueType::Url),
            Some(&Pointer::field_only("image"))
        );
        assert_eq!(schema.linkable_fields().pointer_by_type(ValueType::String), None);

        let wrong_type = LinkableFields {
            lat_lng: Some(Pointer::field_only("name")),
            url: None,
        };
        assert!(matches!(
            Schema::new(id.clone(), groups(), wrong_type),
            Err(BuildError::InvalidLinkableField { expected: ValueType::LatLng, .. })
        ));

        let missing = LinkableFields {
            lat_lng: None,
            url: Some(Pointer::field_only("nope")),
        };
        assert!(Schema::new(id, groups(), missing).is_err());
    }

    #[test]
    fn test_deserialize_checks_linkable_fields() {
        let schema = Schema::new(
            SchemaId::parse("test/marker").unwrap(),
            groups(),
            LinkableFields {
                lat_lng: Some(Pointer::field_only("location")),
                url: None,
            },
        )
        .unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(serde_json::from_value::<Schema>(json.clone()).unwrap(), schema);

        let mut broken = json;
        broken["linkableFields"]["latLng"] = serde_json::to_value(Pointer::field_only("name")).unwrap();
        assert!(serde_json::from_value::<Schema>(broken).is_err());
    }
}
