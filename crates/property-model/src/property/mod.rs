//! Property instances.
//!
//! A [`Property`] owns an ordered set of top-level [`Item`]s, at most one
//! per schema group. Items own their groups and groups own their fields;
//! nothing is shared between two properties.
//!
//! Reads take a [`Pointer`] and return `Option` or a possibly empty `Vec`.
//! Writes that need to know what a field may hold take the [`Schema`]
//! explicitly.

pub mod diff;
pub mod field;
pub mod group;
pub mod group_list;
pub mod item;
pub mod link;
pub mod merged;
pub mod pointer;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use diff::{SchemaDiff, SchemaDiffDeleted, SchemaDiffMoved, SchemaDiffTypeChanged, SchemaFieldPointer};
pub use field::Field;
pub use group::Group;
pub use group_list::GroupList;
pub use item::{GroupAndField, Item};
pub use link::{DatasetField, DatasetLoader, Link, Links};
pub use merged::{merge, Merged, MergedField, MergedGroup};
pub use pointer::Pointer;

use crate::error::{BuildError, ValidationError};
use crate::model::{
    DatasetFieldId, DatasetId, DatasetSchemaId, FieldId, ItemId, PropertyId, SceneId, SchemaGroupId,
    SchemaId, Value, ValueType,
};
use crate::schema::{LinkableFields, Schema, SchemaGroupList};

/// A schema-typed bag of configuration data attached to a domain object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawProperty")]
pub struct Property {
    id: PropertyId,
    scene: SceneId,
    schema: SchemaId,
    items: Vec<Item>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperty {
    id: PropertyId,
    scene: SceneId,
    schema: SchemaId,
    #[serde(default)]
    items: Vec<Item>,
}

impl TryFrom<RawProperty> for Property {
    type Error = BuildError;

    fn try_from(raw: RawProperty) -> Result<Self, Self::Error> {
        Property::new(raw.id, raw.scene, raw.schema)?.with_items(raw.items)
    }
}

impl Property {
    /// Creates an empty property. IDs must not be nil.
    pub fn new(id: PropertyId, scene: SceneId, schema: SchemaId) -> Result<Self, BuildError> {
        Ok(Self {
            id: id.require_non_nil()?,
            scene: scene.require_non_nil()?,
            schema,
            items: Vec::new(),
        })
    }

    /// Replaces the items. Each schema group and item ID may occur once.
    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Result<Self, BuildError> {
        self.items.clear();
        for item in items {
            if let Some(existing) = self.item_by_schema_group(item.schema_group()) {
                return Err(BuildError::SchemaGroupOccupied {
                    group: item.schema_group().clone(),
                    item: existing.id(),
                });
            }
            if self.item(item.id()).is_some() {
                return Err(BuildError::DuplicateItem { item: item.id() });
            }
            self.items.push(item);
        }
        Ok(self)
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    pub fn scene(&self) -> SceneId {
        self.scene
    }

    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    pub fn item_by_schema_group(&self, schema_group: &SchemaGroupId) -> Option<&Item> {
        self.items.iter().find(|i| i.schema_group() == schema_group)
    }

    pub fn item_by_schema_group_mut(&mut self, schema_group: &SchemaGroupId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.schema_group() == schema_group)
    }

    /// A group by item ID, either top-level or a list member.
    pub fn group(&self, id: ItemId) -> Option<&Group> {
        self.items.iter().find_map(|item| match item {
            Item::Group(g) => (g.id() == id).then_some(g),
            Item::GroupList(l) => l.group(id),
        })
    }

    pub fn group_mut(&mut self, id: ItemId) -> Option<&mut Group> {
        self.items.iter_mut().find_map(|item| match item {
            Item::Group(g) => (g.id() == id).then_some(g),
            Item::GroupList(l) => l.group_mut(id),
        })
    }

    /// The group a pointer addresses: its item coordinate if present,
    /// otherwise the top-level group of its schema group.
    pub fn group_by_pointer(&self, ptr: &Pointer) -> Option<&Group> {
        if let Some(&item) = ptr.item_id() {
            return self.group(item).filter(|g| ptr.test_schema_group(g.schema_group()));
        }
        self.item_by_schema_group(ptr.schema_group()?)?.as_group()
    }

    /// The list a pointer addresses, by the list's own ID, a member's ID or
    /// the schema group.
    pub fn group_list_by_pointer(&self, ptr: &Pointer) -> Option<&GroupList> {
        let mut lists = self.items.iter().filter_map(Item::as_group_list);
        if let Some(&item) = ptr.item_id() {
            return lists
                .find(|l| l.id() == item || l.has(item))
                .filter(|l| ptr.test_schema_group(l.schema_group()));
        }
        let schema_group = ptr.schema_group()?;
        lists.find(|l| l.schema_group() == schema_group)
    }

    fn group_list_by_pointer_mut(&mut self, ptr: &Pointer) -> Option<&mut GroupList> {
        let mut lists = self.items.iter_mut().filter_map(Item::as_group_list_mut);
        if let Some(&item) = ptr.item_id() {
            return lists
                .find(|l| l.id() == item || l.has(item))
                .filter(|l| ptr.test_schema_group(l.schema_group()));
        }
        let schema_group = ptr.schema_group()?;
        lists.find(|l| l.schema_group() == schema_group)
    }

    /// Every field matched by `ptr`, in item order.
    pub fn fields(&self, ptr: Option<&Pointer>) -> Vec<&Field> {
        self.items.iter().flat_map(|i| i.fields(ptr)).collect()
    }

    pub fn fields_mut(&mut self, ptr: Option<&Pointer>) -> Vec<&mut Field> {
        self.items.iter_mut().flat_map(|i| i.fields_mut(ptr)).collect()
    }

    pub fn group_and_fields(&self, ptr: Option<&Pointer>) -> Vec<GroupAndField<'_>> {
        self.items.iter().flat_map(|i| i.group_and_fields(ptr)).collect()
    }

    /// The first field matched by `ptr`, with its group and list.
    pub fn field(&self, ptr: &Pointer) -> Option<GroupAndField<'_>> {
        self.items
            .iter()
            .find_map(|i| i.group_and_fields(Some(ptr)).into_iter().next())
    }

    pub fn field_mut(&mut self, ptr: &Pointer) -> Option<&mut Field> {
        self.items
            .iter_mut()
            .find_map(|i| i.fields_mut(Some(ptr)).into_iter().next())
    }

    /// Adds a top-level item. Refused when its schema group is already
    /// instantiated or its ID is taken.
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.item_by_schema_group(item.schema_group()).is_some() || self.item(item.id()).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Removes the first field matched by `ptr`.
    pub fn remove_field(&mut self, ptr: &Pointer) -> bool {
        let Some(exact) = self.field(ptr).map(|gf| gf.pointer()) else {
            return false;
        };
        self.remove_fields(&exact)
    }

    /// Removes every field matched by `ptr`.
    pub fn remove_fields(&mut self, ptr: &Pointer) -> bool {
        let mut removed = false;
        for item in &mut self.items {
            removed |= item.remove_fields(ptr);
        }
        removed
    }

    /// Removes empty fields, then empty top-level items. List members are
    /// pruned but kept.
    pub fn prune(&mut self) -> bool {
        let mut pruned = false;
        for item in &mut self.items {
            pruned |= item.prune();
        }
        let before = self.items.len();
        self.items.retain(|i| !i.is_empty());
        pruned || self.items.len() != before
    }

    /// Returns the item for the schema group a pointer resolves to in
    /// `schema`, creating an empty one of the declared kind if needed.
    ///
    /// Returns `None` when `schema` is not this property's schema or the
    /// pointer does not resolve to a schema group.
    pub fn get_or_create_item(&mut self, schema: &Schema, ptr: &Pointer) -> Option<&mut Item> {
        if schema.id() != &self.schema {
            return None;
        }
        let schema_group = schema.groups().group_by_pointer(ptr)?;
        let index = match self.items.iter().position(|i| i.schema_group() == schema_group.id()) {
            Some(index) => index,
            None => {
                self.items.push(Item::from_schema_group(schema_group));
                self.items.len() - 1
            }
        };
        self.items.get_mut(index)
    }

    pub fn get_or_create_group(&mut self, schema: &Schema, ptr: &Pointer) -> Option<&mut Group> {
        self.get_or_create_item(schema, ptr)?.as_group_mut()
    }

    pub fn get_or_create_group_list(&mut self, schema: &Schema, ptr: &Pointer) -> Option<&mut GroupList> {
        self.get_or_create_item(schema, ptr)?.as_group_list_mut()
    }

    /// Returns the top-level group for the pointer's schema group, creating
    /// it without consulting a schema. The flag reports whether it was
    /// created.
    pub fn get_or_create_root_group(&mut self, ptr: &Pointer) -> Option<(&mut Group, bool)> {
        let schema_group = ptr.schema_group()?;
        match self.items.iter().position(|i| i.schema_group() == schema_group) {
            Some(index) => self.items[index].as_group_mut().map(|g| (g, false)),
            None => {
                self.items.push(Item::Group(Group::new(schema_group.clone())));
                self.items.last_mut()?.as_group_mut().map(|g| (g, true))
            }
        }
    }

    /// The group that holds (or will hold) the field a pointer addresses.
    ///
    /// Without an item coordinate only singleton groups are reached: a
    /// pointer resolving to a list schema group yields `None`, since it
    /// names no particular member. `update_value` reports that case as
    /// [`ValidationError::FieldNotFound`].
    fn get_or_create_field_group(&mut self, schema: &Schema, ptr: &Pointer) -> Option<&mut Group> {
        if let Some(&item) = ptr.item_id() {
            let group = self.group_mut(item)?;
            return ptr.test_schema_group(group.schema_group()).then_some(group);
        }
        let schema_group = schema.groups().group_by_pointer(ptr)?;
        if schema_group.is_list() || schema_group.field_by_pointer(ptr).is_none() {
            return None;
        }
        self.get_or_create_group(schema, ptr)
    }

    /// Returns the field a pointer addresses, creating it (and its group)
    /// from the schema when missing. The flag reports whether the field was
    /// created.
    ///
    /// A pointer with an item coordinate only reaches existing groups, so
    /// list members must be created first. Fields of a list cannot be
    /// reached through its schema group alone.
    pub fn get_or_create_field(&mut self, schema: &Schema, ptr: &Pointer) -> Option<(&mut Field, bool)> {
        if schema.id() != &self.schema {
            return None;
        }
        let field_id = ptr.field_id()?.clone();
        self.get_or_create_field_group(schema, ptr)?
            .get_or_create_field(schema, &field_id)
    }

    /// Writes a value after validating it against the schema.
    ///
    /// Fields of a list are only reachable through a pointer naming the
    /// member's item ID; a field-only or schema-group pointer into a list
    /// fails with [`ValidationError::FieldNotFound`].
    ///
    /// Writing `None` prunes the property and returns `Ok(None)`. A
    /// rejected write leaves the property as it was: a field (or group)
    /// created while resolving the pointer is removed again.
    pub fn update_value(
        &mut self,
        schema: &Schema,
        ptr: &Pointer,
        value: Option<Value>,
    ) -> Result<Option<&Field>, ValidationError> {
        if schema.id() != &self.schema {
            return Err(ValidationError::SchemaMismatch {
                expected: schema.id().clone(),
                actual: self.schema.clone(),
            });
        }
        let not_found = || ValidationError::FieldNotFound { pointer: ptr.clone() };
        let field_id = ptr.field_id().cloned().ok_or_else(not_found)?;
        let items_before = self.items.len();

        let group = self.get_or_create_field_group(schema, ptr).ok_or_else(not_found)?;
        let group_id = group.id();
        let schema_field = schema
            .group(group.schema_group())
            .and_then(|g| g.field(&field_id))
            .ok_or_else(not_found)?;
        let Some((field, created)) = group.get_or_create_field(schema, &field_id) else {
            return Err(not_found());
        };
        if let Err(err) = field.update(value.clone(), schema_field) {
            if created {
                group.remove_field(&field_id);
            }
            self.items.truncate(items_before);
            return Err(err);
        }

        if value.is_none() {
            self.prune();
            return Ok(None);
        }
        Ok(self.group(group_id).and_then(|g| g.field(&field_id)))
    }

    /// Appends (or inserts at `index`) a new member to the list a pointer
    /// resolves to, creating the list if needed.
    pub fn add_list_item(&mut self, schema: &Schema, ptr: &Pointer, index: Option<usize>) -> Option<&mut Group> {
        self.get_or_create_group_list(schema, ptr)?
            .create_and_add_list_item(schema, index)
    }

    /// Moves the list member a pointer's item coordinate names.
    pub fn move_list_item(&mut self, ptr: &Pointer, index: usize) -> bool {
        let Some(&item) = ptr.item_id() else {
            return false;
        };
        self.group_list_by_pointer_mut(ptr)
            .is_some_and(|l| l.move_to(item, index))
    }

    /// Removes the list member a pointer's item coordinate names.
    pub fn remove_list_item(&mut self, ptr: &Pointer) -> Option<Group> {
        let item = *ptr.item_id()?;
        self.group_list_by_pointer_mut(ptr)?.remove(item)
    }

    /// Moves every field matched by `from` into the top-level group of
    /// `to`'s schema group, creating that group if needed.
    ///
    /// Fields of list members have no single destination and are dropped
    /// instead. Nothing happens when the destination schema group is held
    /// by a list.
    pub fn move_fields(&mut self, from: &Pointer, to: &Pointer) -> bool {
        let Some(destination) = to.schema_group().cloned() else {
            return false;
        };
        if self
            .item_by_schema_group(&destination)
            .is_some_and(Item::is_list)
        {
            debug!(to = %to, "cannot move fields into a list");
            return false;
        }

        let mut moved = Vec::new();
        let mut dropped = 0;
        for item in &mut self.items {
            match item {
                Item::Group(group) if group.schema_group() == &destination => {}
                Item::Group(group) => {
                    let ids: Vec<FieldId> = group
                        .fields(Some(from))
                        .into_iter()
                        .map(|f| f.id().clone())
                        .collect();
                    moved.extend(ids.iter().filter_map(|id| group.remove_field(id)));
                }
                Item::GroupList(list) => {
                    let matched = list.fields(Some(from)).len();
                    if matched > 0 {
                        list.remove_fields(from);
                        dropped += matched;
                    }
                }
            }
        }
        if dropped > 0 {
            debug!(from = %from, dropped, "dropped fields of list members");
        }
        if moved.is_empty() {
            return dropped > 0;
        }

        let Some((group, _)) = self.get_or_create_root_group(to) else {
            return false;
        };
        for field in moved {
            group.add_field(field);
        }
        true
    }

    /// Casts every field matched by `ptr` to `ty`. Values that cannot be
    /// converted are cleared.
    pub fn cast(&mut self, ptr: &Pointer, ty: ValueType) -> bool {
        let mut changed = false;
        for field in self.fields_mut(Some(ptr)) {
            let had_value = field.value().is_some();
            if field.cast(ty) {
                changed = true;
                if had_value && field.value().is_none() {
                    debug!(field = %field.id(), to = %ty, "cast failed, value cleared");
                }
            }
        }
        changed
    }

    pub fn set_schema(&mut self, schema: SchemaId) {
        self.schema = schema;
    }

    /// A minimal schema inferred from the data. For inspection only.
    pub fn guess_schema(&self) -> Option<Schema> {
        let groups = self.items.iter().filter_map(Item::guess_schema);
        let groups = SchemaGroupList::new(groups).ok()?;
        Schema::new(self.schema.clone(), groups, LinkableFields::default()).ok()
    }

    /// Every dataset linked from any field, first occurrence order.
    pub fn datasets(&self) -> Vec<DatasetId> {
        let mut seen = FxHashSet::default();
        self.items
            .iter()
            .flat_map(Item::datasets)
            .filter(|d| seen.insert(*d))
            .collect()
    }

    /// True when some field links to `dataset` through `dataset_schema`.
    pub fn is_dataset_linked(&self, dataset_schema: DatasetSchemaId, dataset: DatasetId) -> bool {
        self.fields(None)
            .into_iter()
            .filter_map(Field::links)
            .any(|l| l.has_dataset_schema_and_dataset(dataset_schema, dataset))
    }

    pub fn unlink_all(&mut self) {
        self.items.iter_mut().for_each(Item::unlink_all);
    }

    /// Links the schema's linkable field of type `ty` to a dataset field.
    pub fn auto_link_field(
        &mut self,
        schema: &Schema,
        ty: ValueType,
        dataset_schema: DatasetSchemaId,
        dataset_field: DatasetFieldId,
        dataset: Option<DatasetId>,
    ) -> bool {
        let Some(ptr) = schema.linkable_fields().pointer_by_type(ty).cloned() else {
            return false;
        };
        let Some((field, _)) = self.get_or_create_field(schema, &ptr) else {
            return false;
        };
        field.link(Links::from(Link::new(dataset, Some(dataset_schema), Some(dataset_field))));
        true
    }

    /// Writes `value` into the schema's linkable field of the same type.
    /// Returns `Ok(false)` when the schema declares no such field.
    pub fn update_linkable_value(&mut self, schema: &Schema, value: Value) -> Result<bool, ValidationError> {
        let Some(ptr) = schema.linkable_fields().pointer_by_type(value.value_type()).cloned() else {
            return Ok(false);
        };
        self.update_value(schema, &ptr, Some(value)).map(|f| f.is_some())
    }
}
