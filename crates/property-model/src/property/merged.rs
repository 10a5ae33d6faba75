//! Effective read-only views of a property overlaid on its parent.
//!
//! Merging is single-level: an original property's values override those
//! of one parent property with the same schema. The result borrows nothing
//! and is never written back.

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::trace;

use crate::error::LoaderError;
use crate::model::{DatasetId, FieldId, ItemId, PropertyId, SchemaGroupId, SchemaId, Value, ValueType};
use crate::property::{DatasetLoader, Field, Group, Item, Links, Pointer, Property};

/// The merged view of a whole property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Merged {
    pub original: Option<PropertyId>,
    pub parent: Option<PropertyId>,
    pub schema: SchemaId,
    pub linked_dataset: Option<DatasetId>,
    pub groups: Vec<MergedGroup>,
}

/// The merged view of one item. A list carries its members in `groups`;
/// a group carries its `fields`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedGroup {
    pub original: Option<ItemId>,
    pub parent: Option<ItemId>,
    pub schema_group: SchemaGroupId,
    pub linked_dataset: Option<DatasetId>,
    pub groups: Vec<MergedGroup>,
    pub fields: Vec<MergedField>,
}

/// The effective state of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub value: Option<Value>,
    pub links: Option<Links>,
    /// The original defines the field and so does the parent.
    pub overridden: bool,
}

impl Merged {
    pub fn group(&self, schema_group: &SchemaGroupId) -> Option<&MergedGroup> {
        self.groups.iter().find(|g| &g.schema_group == schema_group)
    }

    /// The first merged field matched by `ptr`. Item coordinates are matched
    /// against both the original and the parent item IDs.
    pub fn field(&self, ptr: &Pointer) -> Option<&MergedField> {
        self.groups
            .iter()
            .filter(|g| ptr.test_schema_group(&g.schema_group))
            .find_map(|g| g.field_by_pointer(ptr))
    }

    /// Every dataset the merged fields link to, first occurrence order.
    pub fn datasets(&self) -> Vec<DatasetId> {
        let mut seen = FxHashSet::default();
        let mut datasets = Vec::new();
        for group in &self.groups {
            group.collect_datasets(&mut seen, &mut datasets);
        }
        datasets
    }
}

impl MergedGroup {
    pub fn is_list(&self) -> bool {
        !self.groups.is_empty() && self.fields.is_empty()
    }

    pub fn field(&self, id: &FieldId) -> Option<&MergedField> {
        self.fields.iter().find(|f| &f.id == id)
    }

    fn matches_item(&self, item: &ItemId) -> bool {
        self.original.as_ref() == Some(item) || self.parent.as_ref() == Some(item)
    }

    fn field_by_pointer(&self, ptr: &Pointer) -> Option<&MergedField> {
        let field = ptr.field_id()?;
        match ptr.item_id() {
            Some(item) if self.matches_item(item) => self
                .field(field)
                .or_else(|| self.groups.iter().find_map(|g| g.field(field))),
            Some(item) => self
                .groups
                .iter()
                .find(|g| g.matches_item(item))
                .and_then(|g| g.field(field)),
            None => self
                .field(field)
                .or_else(|| self.groups.iter().find_map(|g| g.field(field))),
        }
    }

    fn collect_datasets(&self, seen: &mut FxHashSet<DatasetId>, out: &mut Vec<DatasetId>) {
        for field in &self.fields {
            for id in field.links.iter().flat_map(Links::dataset_ids) {
                if seen.insert(id) {
                    out.push(id);
                }
            }
        }
        for group in &self.groups {
            group.collect_datasets(seen, out);
        }
    }
}

impl MergedField {
    /// Resolves the value supplied by the field's links.
    pub fn dataset_value(&self, loader: &dyn DatasetLoader) -> Result<Option<Value>, LoaderError> {
        match &self.links {
            Some(links) => links.dataset_value(loader),
            None => Ok(None),
        }
    }

    /// The linked dataset value when there is one, otherwise the literal
    /// value.
    pub fn effective_value(&self, loader: &dyn DatasetLoader) -> Result<Option<Value>, LoaderError> {
        Ok(self.dataset_value(loader)?.or_else(|| self.value.clone()))
    }
}

/// Overlays `original` on `parent`.
///
/// Returns `None` when both are absent or their schemas differ. Dataset
/// links on either side get `linked` as their dataset when they have none.
pub fn merge(
    original: Option<&Property>,
    parent: Option<&Property>,
    linked: Option<DatasetId>,
) -> Option<Merged> {
    let schema = match (original, parent) {
        (None, None) => return None,
        (Some(o), Some(p)) if o.schema() != p.schema() => return None,
        (Some(o), _) => o.schema().clone(),
        (None, Some(p)) => p.schema().clone(),
    };
    trace!(
        original = ?original.map(Property::id),
        parent = ?parent.map(Property::id),
        schema = %schema,
        "merging properties"
    );

    let mut consumed = FxHashSet::default();
    let mut groups = Vec::new();
    for item in original.map(Property::items).unwrap_or_default() {
        let parent_item = parent.and_then(|p| p.item_by_schema_group(item.schema_group()));
        if let Some(p) = parent_item {
            consumed.insert(p.id());
        }
        groups.push(merge_item(Some(item), parent_item, linked));
    }
    for item in parent.map(Property::items).unwrap_or_default() {
        if !consumed.contains(&item.id()) {
            groups.push(merge_item(None, Some(item), linked));
        }
    }

    Some(Merged {
        original: original.map(Property::id),
        parent: parent.map(Property::id),
        schema,
        linked_dataset: linked,
        groups,
    })
}

fn merge_item(original: Option<&Item>, parent: Option<&Item>, linked: Option<DatasetId>) -> MergedGroup {
    let original_list = original.and_then(Item::as_group_list);
    let parent_list = parent.and_then(Item::as_group_list);

    // A list on either side means lists are compared as a whole: the
    // original list replaces the parent list, members are never paired.
    if let Some(list) = original_list.or(parent_list) {
        let from_original = original_list.is_some();
        let groups = list
            .groups()
            .iter()
            .map(|g| {
                if from_original {
                    merge_group(Some(g), None, linked)
                } else {
                    merge_group(None, Some(g), linked)
                }
            })
            .collect();
        return MergedGroup {
            original: original_list.map(|l| l.id()),
            parent: parent_list.map(|l| l.id()),
            schema_group: list.schema_group().clone(),
            linked_dataset: linked,
            groups,
            fields: Vec::new(),
        };
    }

    let original_group = original.and_then(Item::as_group);
    let parent_group = parent.and_then(Item::as_group);
    merge_group(original_group, parent_group, linked)
}

fn merge_group(original: Option<&Group>, parent: Option<&Group>, linked: Option<DatasetId>) -> MergedGroup {
    let schema_group = original
        .or(parent)
        .map(|g| g.schema_group().clone())
        .unwrap_or_else(|| SchemaGroupId::new(""));

    let mut seen = FxHashSet::default();
    let ids: Vec<&FieldId> = original
        .into_iter()
        .chain(parent)
        .flat_map(Group::field_ids)
        .filter(|id| seen.insert(*id))
        .collect();

    let fields = ids
        .into_iter()
        .filter_map(|id| {
            merge_field(
                original.and_then(|g| g.field(id)),
                parent.and_then(|g| g.field(id)),
                linked,
            )
        })
        .collect();

    MergedGroup {
        original: original.map(Group::id),
        parent: parent.map(Group::id),
        schema_group,
        linked_dataset: linked,
        groups: Vec::new(),
        fields,
    }
}

fn merge_field(original: Option<&Field>, parent: Option<&Field>, linked: Option<DatasetId>) -> Option<MergedField> {
    // Fields whose types disagree cannot be overlaid.
    if let (Some(o), Some(p)) = (original, parent) {
        if o.value_type() != p.value_type() {
            trace!(field = %o.id(), "field types differ, dropped from merge");
            return None;
        }
    }
    // An empty, unlinked original field does not shadow the parent.
    let defined = original.filter(|f| !f.is_empty());
    let (source, overridden) = match (defined, parent) {
        (Some(o), p) => (o, p.is_some()),
        (None, Some(p)) => (p, false),
        (None, None) => (original?, false),
    };
    Some(MergedField {
        id: source.id().clone(),
        ty: source.value_type(),
        value: source.value().cloned(),
        links: source.links().map(|l| l.apply_dataset(linked)),
        overridden,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::model::{DatasetFieldId, DatasetSchemaId, OptionalValue, SceneId};
    use crate::property::{GroupList, Link};

    fn schema_id() -> SchemaId {
        SchemaId::parse("test/marker").unwrap()
    }

    fn string_field(id: &str, v: &str) -> Field {
        Field::new(id, OptionalValue::some(Value::from(v)))
    }

    fn property(items: impl IntoIterator<Item = Item>) -> Property {
        Property::new(PropertyId::new(), SceneId::new(), schema_id())
            .unwrap()
            .with_items(items)
            .unwrap()
    }

    fn default_group(fields: impl IntoIterator<Item = Field>) -> Item {
        Item::from(Group::new("default").with_fields(fields).unwrap())
    }

    #[test]
    fn test_field_override() {
        let original = property([default_group([string_field("a", "1")])]);
        let parent = property([default_group([string_field("a", "2"), string_field("b", "3")])]);

        let merged = merge(Some(&original), Some(&parent), None).unwrap();
        assert_eq!(merged.original, Some(original.id()));
        assert_eq!(merged.parent, Some(parent.id()));
        assert_eq!(merged.groups.len(), 1);

        let fields: Vec<(&str, Option<&Value>, bool)> = merged.groups[0]
            .fields
            .iter()
            .map(|f| (f.id.as_str(), f.value.as_ref(), f.overridden))
            .collect();
        let (one, three) = (Value::from("1"), Value::from("3"));
        assert_eq!(fields, vec![("a", Some(&one), true), ("b", Some(&three), false)]);
    }

    #[test]
    fn test_merge_requires_a_side_and_same_schema() {
        assert!(merge(None, None, None).is_none());

        let original = property([]);
        let mut parent = property([]);
        parent.set_schema(SchemaId::parse("test/other").unwrap());
        assert!(merge(Some(&original), Some(&parent), None).is_none());

        let merged = merge(None, Some(&parent), None).unwrap();
        assert_eq!(merged.schema, *parent.schema());
        assert_eq!(merged.original, None);
    }

    #[test]
    fn test_empty_original_field_falls_back() {
        let original = property([default_group([Field::new("a", OptionalValue::empty(ValueType::String))])]);
        let parent = property([default_group([string_field("a", "2")])]);
        let merged = merge(Some(&original), Some(&parent), None).unwrap();
        let a = merged.field(&Pointer::field_only("a")).unwrap();
        assert_eq!(a.value, Some(Value::from("2")));
        assert!(!a.overridden);
    }

    #[test]
    fn test_fields_of_different_types_are_dropped() {
        let original = property([default_group([
            string_field("a", "1"),
            Field::new("b", OptionalValue::some(Value::Number(1.0))),
        ])]);
        let parent = property([default_group([string_field("a", "2"), string_field("b", "2")])]);
        let merged = merge(Some(&original), Some(&parent), None).unwrap();
        let ids: Vec<&str> = merged.groups[0].fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert!(merged.field(&Pointer::field_only("b")).is_none());
    }

    #[test]
    fn test_linked_empty_original_field_overrides() {
        let link = Link::schema_field(DatasetSchemaId::new(), DatasetFieldId::new());
        let original = property([default_group([
            Field::new("a", OptionalValue::empty(ValueType::String)).with_links(link.into()),
        ])]);
        let parent = property([default_group([string_field("a", "2")])]);
        let merged = merge(Some(&original), Some(&parent), None).unwrap();
        let a = merged.field(&Pointer::field_only("a")).unwrap();
        assert_eq!(a.value, None);
        assert!(a.overridden);
        assert!(a.links.is_some());
    }

    #[test]
    fn test_one_sided_groups_are_projected() {
        let original = property([default_group([string_field("a", "1")])]);
        let parent = property([Item::from(
            Group::new("extra").with_fields([string_field("x", "9")]).unwrap(),
        )]);
        let merged = merge(Some(&original), Some(&parent), None).unwrap();
        let schema_groups: Vec<&str> = merged.groups.iter().map(|g| g.schema_group.as_str()).collect();
        assert_eq!(schema_groups, vec!["default", "extra"]);
        let extra = merged.group(&"extra".into()).unwrap();
        assert_eq!(extra.original, None);
        assert!(extra.parent.is_some());
        assert!(!extra.fields[0].overridden);
    }

    #[test]
    fn test_original_list_replaces_parent_list() {
        let member = |v: &str| Group::new("items").with_fields([string_field("title", v)]).unwrap();
        let original = property([Item::from(GroupList::new("items").with_groups([member("o")]).unwrap())]);
        let parent = property([Item::from(
            GroupList::new("items").with_groups([member("p1"), member("p2")]).unwrap(),
        )]);

        let merged = merge(Some(&original), Some(&parent), None).unwrap();
        let list = merged.group(&"items".into()).unwrap();
        assert!(list.is_list());
        assert_eq!(list.groups.len(), 1);
        assert_eq!(list.groups[0].fields[0].value, Some(Value::from("o")));
        assert!(!list.groups[0].fields[0].overridden);

        let empty = property([]);
        let merged = merge(Some(&empty), Some(&parent), None).unwrap();
        let list = merged.group(&"items".into()).unwrap();
        assert_eq!(list.groups.len(), 2);
        assert_eq!(list.original, None);
    }

    #[test]
    fn test_linked_dataset_is_applied_when_absent() {
        let linked = DatasetId::new();
        let concrete = DatasetId::new();
        let open = Link::schema_field(DatasetSchemaId::new(), DatasetFieldId::new());
        let fixed = Link::new(Some(concrete), None, Some(DatasetFieldId::new()));
        let original = property([default_group([
            string_field("a", "1").with_links(open.into()),
            string_field("b", "2").with_links(fixed.into()),
        ])]);
        let parent = property([default_group([string_field("c", "3").with_links(open.into())])]);

        let merged = merge(Some(&original), Some(&parent), Some(linked)).unwrap();
        let dataset_of = |f: &str| {
            merged
                .field(&Pointer::field_only(f))
                .and_then(|f| f.links.as_ref())
                .and_then(|l| l.first())
                .and_then(Link::dataset)
        };
        assert_eq!(dataset_of("a"), Some(linked));
        assert_eq!(dataset_of("b"), Some(concrete));
        assert_eq!(dataset_of("c"), Some(linked));
        assert_eq!(merged.datasets(), vec![linked, concrete]);

        assert!(original.datasets().contains(&concrete));
        assert!(!original.datasets().contains(&linked));
    }

    #[test]
    fn test_effective_value() {
        let ds = DatasetId::new();
        let field = MergedField {
            id: "a".into(),
            ty: ValueType::String,
            value: Some(Value::from("literal")),
            links: Some(Link::new(Some(ds), None, Some(DatasetFieldId::new())).into()),
            overridden: false,
        };
        let loader = |_: DatasetId, fields: &[DatasetFieldId]| -> Result<Option<crate::property::DatasetField>, LoaderError> {
            Ok(fields
                .first()
                .map(|f| crate::property::DatasetField::new(*f, Some(Value::from("linked")))))
        };
        assert_eq!(field.effective_value(&loader).unwrap(), Some(Value::from("linked")));

        let unlinked = MergedField { links: None, ..field };
        assert_eq!(unlinked.effective_value(&loader).unwrap(), Some(Value::from("literal")));
    }

    fn fields() -> impl Strategy<Value = BTreeMap<&'static str, String>> {
        prop::collection::btree_map(prop_oneof![Just("a"), Just("b"), Just("c")], "[a-z]{1,3}", 0..4)
    }

    fn build(fields: &BTreeMap<&'static str, String>) -> Property {
        property([default_group(fields.iter().map(|(k, v)| string_field(k, v)))])
    }

    proptest! {
        #[test]
        fn prop_merge_is_deterministic(o in fields(), p in fields()) {
            let (original, parent) = (build(&o), build(&p));
            let ds = Some(DatasetId::new());
            prop_assert_eq!(
                merge(Some(&original), Some(&parent), ds),
                merge(Some(&original), Some(&parent), ds)
            );
        }

        #[test]
        fn prop_merge_without_parent_never_overrides(o in fields()) {
            let original = build(&o);
            let merged = merge(Some(&original), None, None).unwrap();
            for group in &merged.groups {
                prop_assert!(group.fields.iter().all(|f| !f.overridden));
            }
        }

        #[test]
        fn prop_merge_covers_union_of_fields(o in fields(), p in fields()) {
            let merged = merge(Some(&build(&o)), Some(&build(&p)), None).unwrap();
            let count = merged.groups[0].fields.len();
            let union: FxHashSet<&str> = o.keys().chain(p.keys()).copied().collect();
            prop_assert_eq!(count, union.len());
        }
    }
}
