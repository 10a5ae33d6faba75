//! Structural deltas between two versions of a schema, and their
//! application to stored properties.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{FieldId, SchemaGroupId, SchemaId, ValueType};
use crate::property::{Pointer, Property};
use crate::schema::{Schema, SchemaGroupAndField};

/// A field location in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFieldPointer {
    pub schema_group: SchemaGroupId,
    pub field: FieldId,
}

impl SchemaFieldPointer {
    pub fn new(schema_group: impl Into<SchemaGroupId>, field: impl Into<FieldId>) -> Self {
        Self {
            schema_group: schema_group.into(),
            field: field.into(),
        }
    }

    /// Pointer to the field in any item of its schema group.
    pub fn pointer(&self) -> Pointer {
        Pointer::field_by_schema_group(self.schema_group.clone(), self.field.clone())
    }
}

impl From<SchemaGroupAndField<'_>> for SchemaFieldPointer {
    fn from(gf: SchemaGroupAndField<'_>) -> Self {
        Self::new(gf.group.id().clone(), gf.field.id().clone())
    }
}

impl fmt::Display for SchemaFieldPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.schema_group, self.field)
    }
}

/// A field the new schema no longer declares.
pub type SchemaDiffDeleted = SchemaFieldPointer;

/// A field that now lives in another schema group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiffMoved {
    pub from: SchemaFieldPointer,
    pub to: SchemaFieldPointer,
    /// The destination schema group is a list.
    pub to_list: bool,
}

/// A field whose value type changed. `pointer` is its location in the new
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiffTypeChanged {
    pub pointer: SchemaFieldPointer,
    pub new_type: ValueType,
}

/// The delta from one schema to another.
///
/// Fields are matched by ID, so a rename shows up as a deletion and
/// fields that only exist in the new schema are not recorded at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff {
    pub from: SchemaId,
    pub to: SchemaId,
    pub deleted: Vec<SchemaDiffDeleted>,
    pub moved: Vec<SchemaDiffMoved>,
    pub type_changed: Vec<SchemaDiffTypeChanged>,
}

impl SchemaDiff {
    /// Computes the delta from `old` to `new`.
    ///
    /// A field still declared by its old schema group stays there;
    /// otherwise the first new group declaring it is its new home.
    pub fn from_schemas(old: &Schema, new: &Schema) -> Self {
        let mut diff = SchemaDiff {
            from: old.id().clone(),
            to: new.id().clone(),
            deleted: Vec::new(),
            moved: Vec::new(),
            type_changed: Vec::new(),
        };

        for before in old.groups().group_and_fields() {
            let field_id = before.field.id();
            let after = new
                .group(before.group.id())
                .and_then(|group| group.field(field_id).map(|field| SchemaGroupAndField { group, field }))
                .or_else(|| new.groups().group_and_field(field_id));
            let Some(after) = after else {
                diff.deleted.push(before.into());
                continue;
            };
            if after.group.id() != before.group.id() {
                diff.moved.push(SchemaDiffMoved {
                    from: before.into(),
                    to: after.into(),
                    to_list: after.group.is_list(),
                });
            }
            if after.field.value_type() != before.field.value_type() {
                diff.type_changed.push(SchemaDiffTypeChanged {
                    pointer: after.into(),
                    new_type: after.field.value_type(),
                });
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.moved.is_empty() && self.type_changed.is_empty()
    }

    pub fn is_id_changed(&self) -> bool {
        self.from != self.to
    }

    /// Applies the delta to `property` in place. Returns whether anything
    /// changed.
    ///
    /// The schema ID is updated first, then deleted fields are removed,
    /// moved fields relocated and finally retyped fields cast. Fields moved
    /// into a list, or out of one, are lost: there is no single group to
    /// carry them. Values that cannot be cast are cleared.
    pub fn migrate(&self, property: &mut Property) -> bool {
        if property.schema() != &self.from && property.schema() != &self.to {
            warn!(
                property = %property.id(),
                schema = %property.schema(),
                from = %self.from,
                to = %self.to,
                "applying schema diff to a property of another schema"
            );
        }

        let mut changed = false;
        if property.schema() != &self.to {
            property.set_schema(self.to.clone());
            changed = true;
        }

        for deleted in &self.deleted {
            changed |= property.remove_fields(&deleted.pointer());
        }

        for moved in &self.moved {
            if moved.to_list {
                if property.remove_fields(&moved.from.pointer()) {
                    debug!(from = %moved.from, to = %moved.to, "field moved into a list, value dropped");
                    changed = true;
                }
            } else {
                changed |= property.move_fields(&moved.from.pointer(), &moved.to.pointer());
            }
        }

        for retyped in &self.type_changed {
            changed |= property.cast(&retyped.pointer.pointer(), retyped.new_type);
        }

        debug!(property = %property.id(), to = %self.to, changed, "migrated property");
        changed
    }
}
