//! Group lists: repeatable instances of a schema group.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::model::{DatasetId, ItemId, SchemaGroupId};
use crate::property::{Field, Group, GroupAndField, Pointer};
use crate::schema::{Schema, SchemaGroup};

/// An ordered sequence of groups sharing one schema group, unique by item
/// ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGroupList")]
pub struct GroupList {
    id: ItemId,
    schema_group: SchemaGroupId,
    groups: Vec<Group>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroupList {
    id: ItemId,
    schema_group: SchemaGroupId,
    #[serde(default)]
    groups: Vec<Group>,
}

impl TryFrom<RawGroupList> for GroupList {
    type Error = BuildError;

    fn try_from(raw: RawGroupList) -> Result<Self, Self::Error> {
        GroupList::with_id(raw.id, raw.schema_group)?.with_groups(raw.groups)
    }
}

impl GroupList {
    /// Creates an empty list with a fresh ID.
    pub fn new(schema_group: impl Into<SchemaGroupId>) -> Self {
        Self {
            id: ItemId::new(),
            schema_group: schema_group.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_id(id: ItemId, schema_group: impl Into<SchemaGroupId>) -> Result<Self, BuildError> {
        Ok(Self {
            id: id.require_non_nil()?,
            schema_group: schema_group.into(),
            groups: Vec::new(),
        })
    }

    /// Replaces the members. Item IDs must be unique and every member must
    /// instantiate the list's schema group.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = Group>) -> Result<Self, BuildError> {
        let groups: Vec<Group> = groups.into_iter().collect();
        let mut seen = FxHashSet::default();
        for group in &groups {
            if group.schema_group() != &self.schema_group {
                return Err(BuildError::SchemaGroupMismatch {
                    item: group.id(),
                    expected: self.schema_group,
                    found: group.schema_group().clone(),
                });
            }
            if !seen.insert(group.id()) {
                return Err(BuildError::DuplicateItem { item: group.id() });
            }
        }
        self.groups = groups;
        Ok(self)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn schema_group(&self) -> &SchemaGroupId {
        &self.schema_group
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when the list has no members.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, id: ItemId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn group_mut(&mut self, id: ItemId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    pub fn group_at(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.groups.iter().position(|g| g.id() == id)
    }

    pub fn has(&self, id: ItemId) -> bool {
        self.index_of(id).is_some()
    }

    /// Fields matched by `ptr`.
    ///
    /// A pointer naming a member's item ID is dispatched to that member.
    /// Otherwise matching fields of every member are collected, with the
    /// pointer narrowed to its field coordinate.
    pub fn fields(&self, ptr: Option<&Pointer>) -> Vec<&Field> {
        let Some(ptr) = ptr else {
            return self.groups.iter().flat_map(|g| g.fields(None)).collect();
        };
        if !ptr.test_schema_group(&self.schema_group) {
            return Vec::new();
        }
        match ptr.item_id() {
            Some(&item) if item != self.id => self
                .group(item)
                .map(|g| g.fields(Some(&ptr.with_field_only())))
                .unwrap_or_default(),
            _ => {
                let narrowed = ptr.with_field_only();
                self.groups
                    .iter()
                    .flat_map(|g| g.fields(Some(&narrowed)))
                    .collect()
            }
        }
    }

    pub fn fields_mut(&mut self, ptr: Option<&Pointer>) -> Vec<&mut Field> {
        let Some(ptr) = ptr else {
            return self.groups.iter_mut().flat_map(|g| g.fields_mut(None)).collect();
        };
        if !ptr.test_schema_group(&self.schema_group) {
            return Vec::new();
        }
        let narrowed = ptr.with_field_only();
        match ptr.item_id() {
            Some(&item) if item != self.id => self
                .group_mut(item)
                .map(|g| g.fields_mut(Some(&narrowed)))
                .unwrap_or_default(),
            _ => self
                .groups
                .iter_mut()
                .flat_map(|g| g.fields_mut(Some(&narrowed)))
                .collect(),
        }
    }

    /// Like [`GroupList::fields`], keeping the member each field belongs to.
    pub fn group_and_fields(&self, ptr: Option<&Pointer>) -> Vec<GroupAndField<'_>> {
        if ptr.is_some_and(|p| !p.test_schema_group(&self.schema_group)) {
            return Vec::new();
        }
        let narrowed = ptr.map(Pointer::with_field_only);
        let target = ptr.and_then(Pointer::item_id).copied().filter(|id| *id != self.id);
        self.groups
            .iter()
            .filter(|g| target.is_none_or(|t| t == g.id()))
            .flat_map(|group| {
                group
                    .fields(narrowed.as_ref())
                    .into_iter()
                    .map(move |field| GroupAndField {
                        parent_group: Some(self),
                        group,
                        field,
                    })
            })
            .collect()
    }

    /// Inserts `group` at `index`, appending when the index is absent or out
    /// of range. A member with the same ID or a group of another schema
    /// group is refused.
    pub fn add(&mut self, group: Group, index: Option<usize>) -> bool {
        if self.has(group.id()) || group.schema_group() != &self.schema_group {
            return false;
        }
        match index {
            Some(i) if i < self.groups.len() => self.groups.insert(i, group),
            _ => self.groups.push(group),
        }
        true
    }

    /// Adds `group`, or moves the existing member with its ID to `index`.
    pub fn add_or_move(&mut self, group: Group, index: Option<usize>) -> bool {
        if self.has(group.id()) {
            let id = group.id();
            return match index {
                Some(i) => self.move_to(id, i),
                None => false,
            };
        }
        self.add(group, index)
    }

    /// Moves a member to `index`, clamped to the last valid position.
    pub fn move_to(&mut self, id: ItemId, index: usize) -> bool {
        match self.index_of(id) {
            Some(from) => self.move_at(from, index),
            None => false,
        }
    }

    /// Moves the member at `from` to `to`, clamped to the last valid
    /// position.
    pub fn move_at(&mut self, from: usize, to: usize) -> bool {
        if from >= self.groups.len() {
            return false;
        }
        let to = to.min(self.groups.len() - 1);
        if from == to {
            return false;
        }
        let group = self.groups.remove(from);
        self.groups.insert(to, group);
        true
    }

    pub fn remove(&mut self, id: ItemId) -> Option<Group> {
        let index = self.index_of(id)?;
        Some(self.groups.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Group> {
        if index >= self.groups.len() {
            return None;
        }
        Some(self.groups.remove(index))
    }

    /// Creates an empty member for the list's schema group and inserts it.
    ///
    /// Returns `None` when the schema does not declare the list's schema
    /// group.
    pub fn create_and_add_list_item(&mut self, schema: &Schema, index: Option<usize>) -> Option<&mut Group> {
        schema.group(&self.schema_group)?;
        let group = Group::new(self.schema_group.clone());
        let id = group.id();
        if !self.add(group, index) {
            return None;
        }
        self.group_mut(id)
    }

    /// Removes matching fields from every member. Returns whether anything
    /// was removed.
    pub fn remove_fields(&mut self, ptr: &Pointer) -> bool {
        if !ptr.test_schema_group(&self.schema_group) {
            return false;
        }
        let narrowed = match ptr.item_id() {
            Some(&item) if item == self.id => Pointer::new(None, None, ptr.field_id().cloned()),
            _ => Pointer::new(None, ptr.item_id().copied(), ptr.field_id().cloned()),
        };
        let mut removed = false;
        for group in &mut self.groups {
            removed |= group.remove_fields(&narrowed);
        }
        removed
    }

    /// Prunes every member. Members are kept even when they become empty.
    pub fn prune(&mut self) -> bool {
        let mut pruned = false;
        for group in &mut self.groups {
            pruned |= group.prune();
        }
        pruned
    }

    pub fn datasets(&self) -> Vec<DatasetId> {
        self.groups.iter().flat_map(Group::datasets).collect()
    }

    pub fn is_dataset_linked(&self, dataset: DatasetId) -> bool {
        self.groups.iter().any(|g| g.is_dataset_linked(dataset))
    }

    pub fn unlink_all(&mut self) {
        self.groups.iter_mut().for_each(Group::unlink_all);
    }

    /// A list schema group holding the union of the members' fields. The
    /// first type seen for a field wins.
    pub fn guess_schema(&self) -> Option<SchemaGroup> {
        let mut seen = FxHashSet::default();
        let fields: Vec<_> = self
            .groups
            .iter()
            .flat_map(|g| g.all_fields())
            .filter(|f| seen.insert(f.id().clone()))
            .map(Field::guess_schema)
            .collect();
        SchemaGroup::new(self.schema_group.clone(), fields)
            .ok()
            .map(|g| g.with_list(true))
    }
}
