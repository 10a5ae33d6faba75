//! Groups: single instances of a schema group.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::model::{DatasetId, FieldId, ItemId, SchemaGroupId};
use crate::property::{Field, Pointer};
use crate::schema::{Schema, SchemaGroup};

/// A labeled bag of fields, unique by field ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGroup")]
pub struct Group {
    id: ItemId,
    schema_group: SchemaGroupId,
    fields: Vec<Field>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    id: ItemId,
    schema_group: SchemaGroupId,
    #[serde(default)]
    fields: Vec<Field>,
}

impl TryFrom<RawGroup> for Group {
    type Error = BuildError;

    fn try_from(raw: RawGroup) -> Result<Self, Self::Error> {
        Group::with_id(raw.id, raw.schema_group)?.with_fields(raw.fields)
    }
}

impl Group {
    /// Creates an empty group with a fresh ID.
    pub fn new(schema_group: impl Into<SchemaGroupId>) -> Self {
        Self {
            id: ItemId::new(),
            schema_group: schema_group.into(),
            fields: Vec::new(),
        }
    }

    /// Creates an empty group with an explicit ID.
    pub fn with_id(id: ItemId, schema_group: impl Into<SchemaGroupId>) -> Result<Self, BuildError> {
        Ok(Self {
            id: id.require_non_nil()?,
            schema_group: schema_group.into(),
            fields: Vec::new(),
        })
    }

    /// Replaces the fields. Field IDs must be unique.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Result<Self, BuildError> {
        let fields: Vec<Field> = fields.into_iter().collect();
        let mut seen = FxHashSet::default();
        for field in &fields {
            if !seen.insert(field.id()) {
                return Err(BuildError::DuplicateField {
                    item: self.id,
                    field: field.id().clone(),
                });
            }
        }
        self.fields = fields;
        Ok(self)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn schema_group(&self) -> &SchemaGroupId {
        &self.schema_group
    }

    pub fn all_fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.iter().map(Field::id)
    }

    /// Fields matched by `ptr`.
    ///
    /// Without a pointer every field is returned. A pointer that excludes
    /// this group yields nothing; one naming a field yields at most that
    /// field.
    pub fn fields(&self, ptr: Option<&Pointer>) -> Vec<&Field> {
        let Some(ptr) = ptr else {
            return self.fields.iter().collect();
        };
        if !ptr.test_item(&self.schema_group, &self.id) {
            return Vec::new();
        }
        match ptr.field_id() {
            Some(id) => self.field(id).into_iter().collect(),
            None => self.fields.iter().collect(),
        }
    }

    pub fn fields_mut(&mut self, ptr: Option<&Pointer>) -> Vec<&mut Field> {
        let Some(ptr) = ptr else {
            return self.fields.iter_mut().collect();
        };
        if !ptr.test_item(&self.schema_group, &self.id) {
            return Vec::new();
        }
        match ptr.field_id() {
            Some(id) => self.fields.iter_mut().filter(|f| f.id() == id).collect(),
            None => self.fields.iter_mut().collect(),
        }
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn field_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id() == id)
    }

    pub fn has_field(&self, id: &FieldId) -> bool {
        self.field(id).is_some()
    }

    /// Returns the field, creating an empty one from the schema when it does
    /// not exist yet. The flag reports whether it was created.
    ///
    /// Returns `None` when the schema does not declare the field for this
    /// group's schema group.
    pub fn get_or_create_field(&mut self, schema: &Schema, id: &FieldId) -> Option<(&mut Field, bool)> {
        let schema_field = schema.group(&self.schema_group)?.field(id)?;
        match self.fields.iter().position(|f| f.id() == id) {
            Some(index) => Some((&mut self.fields[index], false)),
            None => {
                self.fields.push(Field::from_schema_field(schema_field));
                let field = self.fields.last_mut()?;
                Some((field, true))
            }
        }
    }

    /// Adds a field, replacing one with the same ID in place.
    pub fn add_field(&mut self, field: Field) {
        match self.field_mut(field.id()) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn remove_field(&mut self, id: &FieldId) -> Option<Field> {
        let index = self.fields.iter().position(|f| f.id() == id)?;
        Some(self.fields.remove(index))
    }

    /// Removes every field matched by `ptr`. Returns whether anything was
    /// removed.
    pub fn remove_fields(&mut self, ptr: &Pointer) -> bool {
        if !ptr.test_item(&self.schema_group, &self.id) {
            return false;
        }
        let before = self.fields.len();
        self.fields.retain(|f| !ptr.test_field(f.id()));
        self.fields.len() != before
    }

    /// Removes every empty field.
    pub fn prune(&mut self) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| !f.is_empty());
        self.fields.len() != before
    }

    /// True when every field is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(Field::is_empty)
    }

    /// The field designated as representative by the schema group.
    pub fn representative_field(&self, schema: &Schema) -> Option<&Field> {
        let id = schema.group(&self.schema_group)?.representative_field_id()?;
        self.field(id)
    }

    pub fn datasets(&self) -> Vec<DatasetId> {
        self.fields
            .iter()
            .filter_map(Field::links)
            .flat_map(|l| l.dataset_ids())
            .collect()
    }

    pub fn is_dataset_linked(&self, dataset: DatasetId) -> bool {
        self.fields
            .iter()
            .filter_map(Field::links)
            .any(|l| l.has_dataset(dataset))
    }

    pub fn unlink_all(&mut self) {
        self.fields.iter_mut().for_each(Field::unlink);
    }

    /// A schema group describing the fields this group holds.
    pub fn guess_schema(&self) -> Option<SchemaGroup> {
        SchemaGroup::new(self.schema_group.clone(), self.fields.iter().map(Field::guess_schema)).ok()
    }
}
