//! Top-level items of a property.

use serde::{Deserialize, Serialize};

use crate::model::{DatasetId, ItemId, SchemaGroupId};
use crate::property::{Field, Group, GroupList, Pointer};
use crate::schema::SchemaGroup;

/// A top-level instance of a schema group: a single group or a list of
/// groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Item {
    Group(Group),
    GroupList(GroupList),
}

impl Item {
    /// An empty item of the right kind for `schema_group`.
    pub fn from_schema_group(schema_group: &SchemaGroup) -> Self {
        if schema_group.is_list() {
            Item::GroupList(GroupList::new(schema_group.id().clone()))
        } else {
            Item::Group(Group::new(schema_group.id().clone()))
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            Item::Group(g) => g.id(),
            Item::GroupList(l) => l.id(),
        }
    }

    pub fn schema_group(&self) -> &SchemaGroupId {
        match self {
            Item::Group(g) => g.schema_group(),
            Item::GroupList(l) => l.schema_group(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Item::GroupList(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Item::Group(g) => Some(g),
            Item::GroupList(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Item::Group(g) => Some(g),
            Item::GroupList(_) => None,
        }
    }

    pub fn as_group_list(&self) -> Option<&GroupList> {
        match self {
            Item::GroupList(l) => Some(l),
            Item::Group(_) => None,
        }
    }

    pub fn as_group_list_mut(&mut self) -> Option<&mut GroupList> {
        match self {
            Item::GroupList(l) => Some(l),
            Item::Group(_) => None,
        }
    }

    pub fn fields(&self, ptr: Option<&Pointer>) -> Vec<&Field> {
        match self {
            Item::Group(g) => g.fields(ptr),
            Item::GroupList(l) => l.fields(ptr),
        }
    }

    pub fn fields_mut(&mut self, ptr: Option<&Pointer>) -> Vec<&mut Field> {
        match self {
            Item::Group(g) => g.fields_mut(ptr),
            Item::GroupList(l) => l.fields_mut(ptr),
        }
    }

    pub fn group_and_fields(&self, ptr: Option<&Pointer>) -> Vec<GroupAndField<'_>> {
        match self {
            Item::Group(group) => group
                .fields(ptr)
                .into_iter()
                .map(|field| GroupAndField {
                    parent_group: None,
                    group,
                    field,
                })
                .collect(),
            Item::GroupList(l) => l.group_and_fields(ptr),
        }
    }

    pub fn remove_fields(&mut self, ptr: &Pointer) -> bool {
        match self {
            Item::Group(g) => g.remove_fields(ptr),
            Item::GroupList(l) => l.remove_fields(ptr),
        }
    }

    pub fn prune(&mut self) -> bool {
        match self {
            Item::Group(g) => g.prune(),
            Item::GroupList(l) => l.prune(),
        }
    }

    /// A group is empty when all its fields are; a list when it has no
    /// members.
    pub fn is_empty(&self) -> bool {
        match self {
            Item::Group(g) => g.is_empty(),
            Item::GroupList(l) => l.is_empty(),
        }
    }

    pub fn datasets(&self) -> Vec<DatasetId> {
        match self {
            Item::Group(g) => g.datasets(),
            Item::GroupList(l) => l.datasets(),
        }
    }

    pub fn is_dataset_linked(&self, dataset: DatasetId) -> bool {
        match self {
            Item::Group(g) => g.is_dataset_linked(dataset),
            Item::GroupList(l) => l.is_dataset_linked(dataset),
        }
    }

    pub fn unlink_all(&mut self) {
        match self {
            Item::Group(g) => g.unlink_all(),
            Item::GroupList(l) => l.unlink_all(),
        }
    }

    pub fn guess_schema(&self) -> Option<SchemaGroup> {
        match self {
            Item::Group(g) => g.guess_schema(),
            Item::GroupList(l) => l.guess_schema(),
        }
    }
}

impl From<Group> for Item {
    fn from(group: Group) -> Self {
        Item::Group(group)
    }
}

impl From<GroupList> for Item {
    fn from(list: GroupList) -> Self {
        Item::GroupList(list)
    }
}

/// A field found by a property lookup, with the group holding it and the
/// list that group belongs to, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupAndField<'a> {
    pub parent_group: Option<&'a GroupList>,
    pub group: &'a Group,
    pub field: &'a Field,
}

impl GroupAndField<'_> {
    /// Fully specified pointer to the field.
    pub fn pointer(&self) -> Pointer {
        Pointer::field(self.group.schema_group().clone(), self.group.id(), self.field.id().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatasetFieldId, OptionalValue, Value, ValueType};
    use crate::property::Link;
    use crate::schema::SchemaField;

    #[test]
    fn test_from_schema_group_picks_kind() {
        let single = SchemaGroup::new("default", [SchemaField::new("a", ValueType::String)]).unwrap();
        let list = single.clone().with_list(true);
        assert!(!Item::from_schema_group(&single).is_list());
        assert!(Item::from_schema_group(&list).is_list());
        assert_eq!(Item::from_schema_group(&list).schema_group().as_str(), "default");
    }

    #[test]
    fn test_empty_list_vs_empty_group() {
        let list: Item = GroupList::new("items").into();
        assert!(list.is_empty());

        let member = Group::new("items")
            .with_fields([Field::new("a", OptionalValue::empty(ValueType::String))])
            .unwrap();
        let list: Item = GroupList::new("items").with_groups([member]).unwrap().into();
        assert!(!list.is_empty());

        let group: Item = Group::new("default")
            .with_fields([Field::new("a", OptionalValue::some(Value::from("x")))])
            .unwrap()
            .into();
        assert!(!group.is_empty());
    }

    #[test]
    fn test_is_dataset_linked_dispatch() {
        let ds = DatasetId::new();
        let linked = || {
            Field::new("a", OptionalValue::empty(ValueType::String))
                .with_links(Link::new(Some(ds), None, Some(DatasetFieldId::new())).into())
        };
        let group: Item = Group::new("default").with_fields([linked()]).unwrap().into();
        assert!(group.is_dataset_linked(ds));
        assert!(!group.is_dataset_linked(DatasetId::new()));

        let member = Group::new("items").with_fields([linked()]).unwrap();
        let mut list: Item = GroupList::new("items").with_groups([member]).unwrap().into();
        assert!(list.is_dataset_linked(ds));
        assert_eq!(list.datasets(), vec![ds]);
        list.unlink_all();
        assert!(!list.is_dataset_linked(ds));
    }

    #[test]
    fn test_deserialize_dispatches_on_kind() {
        let list: Item = GroupList::new("items").into();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["kind"], "groupList");
        assert_eq!(serde_json::from_value::<Item>(json).unwrap(), list);

        let mut group = serde_json::to_value(Item::from(Group::new("default"))).unwrap();
        group["id"] = serde_json::json!(ItemId::nil());
        assert!(serde_json::from_value::<Item>(group).is_err());
    }

    #[test]
    fn test_group_and_field_pointer() {
        let group = Group::new("default")
            .with_fields([Field::new("a", OptionalValue::some(Value::from("x")))])
            .unwrap();
        let gf = GroupAndField {
            parent_group: None,
            group: &group,
            field: &group.all_fields()[0],
        };
        let ptr = gf.pointer();
        assert!(ptr.test(&"default".into(), &group.id(), &"a".into()));
        assert_eq!(ptr.item_id(), Some(&group.id()));
    }
}
