//! Schema groups and the ordered set of groups a schema declares.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::model::{FieldId, SchemaGroupId};
use crate::property::Pointer;
use crate::schema::{Condition, SchemaField};

/// A group of field definitions, instantiated either once (a group) or
/// repeatedly (a list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSchemaGroup")]
pub struct SchemaGroup {
    id: SchemaGroupId,
    fields: Vec<SchemaField>,
    list: bool,
    representative_field: Option<FieldId>,
    title: Option<String>,
    condition: Option<Condition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchemaGroup {
    id: SchemaGroupId,
    #[serde(default)]
    fields: Vec<SchemaField>,
    #[serde(default)]
    list: bool,
    representative_field: Option<FieldId>,
    title: Option<String>,
    condition: Option<Condition>,
}

impl TryFrom<RawSchemaGroup> for SchemaGroup {
    type Error = BuildError;

    fn try_from(raw: RawSchemaGroup) -> Result<Self, Self::Error> {
        let mut group = SchemaGroup::new(raw.id, raw.fields)?.with_list(raw.list);
        if let Some(field) = raw.representative_field {
            group = group.with_representative_field(field)?;
        }
        group.title = raw.title;
        group.condition = raw.condition;
        Ok(group)
    }
}

impl SchemaGroup {
    /// Creates a singleton group. Field IDs must be unique.
    pub fn new(
        id: impl Into<SchemaGroupId>,
        fields: impl IntoIterator<Item = SchemaField>,
    ) -> Result<Self, BuildError> {
        let id = id.into();
        let fields: Vec<SchemaField> = fields.into_iter().collect();
        let mut seen = FxHashSet::default();
        for field in &fields {
            if !seen.insert(field.id()) {
                return Err(BuildError::DuplicateSchemaField {
                    group: id,
                    field: field.id().clone(),
                });
            }
        }
        Ok(Self {
            id,
            fields,
            list: false,
            representative_field: None,
            title: None,
            condition: None,
        })
    }

    /// Marks the group as repeatable.
    pub fn with_list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Selects the field shown when the group is summarized.
    pub fn with_representative_field(mut self, field: impl Into<FieldId>) -> Result<Self, BuildError> {
        let field = field.into();
        if !self.has_field(&field) {
            return Err(BuildError::UnknownRepresentativeField {
                group: self.id,
                field,
            });
        }
        self.representative_field = Some(field);
        Ok(self)
    }

    pub fn id(&self) -> &SchemaGroupId {
        &self.id
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.iter().map(SchemaField::id)
    }

    pub fn field(&self, id: &FieldId) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn has_field(&self, id: &FieldId) -> bool {
        self.field(id).is_some()
    }

    /// Looks up the field a pointer names, if the pointer does not exclude
    /// this group.
    pub fn field_by_pointer(&self, ptr: &Pointer) -> Option<&SchemaField> {
        if !ptr.test_schema_group(&self.id) {
            return None;
        }
        self.field(ptr.field_id()?)
    }

    pub fn is_list(&self) -> bool {
        self.list
    }

    pub fn representative_field_id(&self) -> Option<&FieldId> {
        self.representative_field.as_ref()
    }

    pub fn representative_field(&self) -> Option<&SchemaField> {
        self.field(self.representative_field.as_ref()?)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// A schema group together with one of its fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaGroupAndField<'a> {
    pub group: &'a SchemaGroup,
    pub field: &'a SchemaField,
}

impl SchemaGroupAndField<'_> {
    /// Pointer to this field within any item of the group.
    pub fn pointer(&self) -> Pointer {
        Pointer::field_by_schema_group(self.group.id().clone(), self.field.id().clone())
    }
}

/// The groups of a schema, unique by ID, in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<SchemaGroup>", into = "Vec<SchemaGroup>")]
pub struct SchemaGroupList {
    groups: Vec<SchemaGroup>,
}

impl SchemaGroupList {
    pub fn new(groups: impl IntoIterator<Item = SchemaGroup>) -> Result<Self, BuildError> {
        let groups: Vec<SchemaGroup> = groups.into_iter().collect();
        let mut seen = FxHashSet::default();
        for group in &groups {
            if !seen.insert(group.id()) {
                return Err(BuildError::DuplicateSchemaGroup {
                    group: group.id().clone(),
                });
            }
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[SchemaGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, id: &SchemaGroupId) -> Option<&SchemaGroup> {
        self.groups.iter().find(|g| g.id() == id)
    }

    /// First group declaring the field.
    pub fn group_by_field(&self, field: &FieldId) -> Option<&SchemaGroup> {
        self.groups.iter().find(|g| g.has_field(field))
    }

    /// Resolves the group a pointer addresses: its schema-group coordinate
    /// if present, otherwise the group declaring its field.
    pub fn group_by_pointer(&self, ptr: &Pointer) -> Option<&SchemaGroup> {
        if let Some(sg) = ptr.schema_group() {
            return self.group(sg);
        }
        self.group_by_field(ptr.field_id()?)
    }

    pub fn field(&self, field: &FieldId) -> Option<&SchemaField> {
        self.groups.iter().find_map(|g| g.field(field))
    }

    pub fn field_by_pointer(&self, ptr: &Pointer) -> Option<&SchemaField> {
        self.group_by_pointer(ptr)?.field_by_pointer(ptr)
    }

    pub fn group_and_field(&self, field: &FieldId) -> Option<SchemaGroupAndField<'_>> {
        self.groups.iter().find_map(|group| {
            group
                .field(field)
                .map(|field| SchemaGroupAndField { group, field })
        })
    }

    /// Every (group, field) pair in declaration order.
    pub fn group_and_fields(&self) -> Vec<SchemaGroupAndField<'_>> {
        self.groups
            .iter()
            .flat_map(|group| {
                group
                    .fields()
                    .iter()
                    .map(move |field| SchemaGroupAndField { group, field })
            })
            .collect()
    }
}

impl TryFrom<Vec<SchemaGroup>> for SchemaGroupList {
    type Error = BuildError;

    fn try_from(groups: Vec<SchemaGroup>) -> Result<Self, Self::Error> {
        Self::new(groups)
    }
}

impl From<SchemaGroupList> for Vec<SchemaGroup> {
    fn from(list: SchemaGroupList) -> Self {
        list.groups
    }
}
