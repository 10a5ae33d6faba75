//! Dataset links attached to fields.
//!
//! A linked field takes its effective value from an external dataset record
//! instead of (or on top of) its literal value. Datasets are never read
//! directly; callers supply a [`DatasetLoader`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::LoaderError;
use crate::model::{DatasetFieldId, DatasetId, DatasetSchemaId, Value};

/// A field of a dataset record as returned by a loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetField {
    pub id: DatasetFieldId,
    pub value: Option<Value>,
}

impl DatasetField {
    pub fn new(id: DatasetFieldId, value: Option<Value>) -> Self {
        Self { id, value }
    }
}

/// Resolves dataset field values.
///
/// `fields` is the path of dataset field IDs collected from a [`Links`]
/// sequence; the loader returns the field it ends at, if any.
pub trait DatasetLoader {
    fn load(
        &self,
        dataset: DatasetId,
        fields: &[DatasetFieldId],
    ) -> Result<Option<DatasetField>, LoaderError>;
}

impl<F> DatasetLoader for F
where
    F: Fn(DatasetId, &[DatasetFieldId]) -> Result<Option<DatasetField>, LoaderError>,
{
    fn load(
        &self,
        dataset: DatasetId,
        fields: &[DatasetFieldId],
    ) -> Result<Option<DatasetField>, LoaderError> {
        self(dataset, fields)
    }
}

/// One reference to a dataset field. Every coordinate may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Link {
    dataset: Option<DatasetId>,
    schema: Option<DatasetSchemaId>,
    field: Option<DatasetFieldId>,
}

impl Link {
    pub fn new(
        dataset: Option<DatasetId>,
        schema: Option<DatasetSchemaId>,
        field: Option<DatasetFieldId>,
    ) -> Self {
        Self {
            dataset,
            schema,
            field,
        }
    }

    /// A link to a schema field that any dataset of that schema can fill.
    pub fn schema_field(schema: DatasetSchemaId, field: DatasetFieldId) -> Self {
        Self::new(None, Some(schema), Some(field))
    }

    pub fn dataset(&self) -> Option<DatasetId> {
        self.dataset
    }

    pub fn dataset_schema(&self) -> Option<DatasetSchemaId> {
        self.schema
    }

    pub fn dataset_field(&self) -> Option<DatasetFieldId> {
        self.field
    }

    /// Fills in the dataset coordinate when it is absent. A concrete dataset
    /// is never replaced.
    pub fn apply_dataset(&self, dataset: Option<DatasetId>) -> Link {
        Link {
            dataset: self.dataset.or(dataset),
            ..*self
        }
    }
}

/// An ordered sequence of dataset links.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn new(links: impl IntoIterator<Item = Link>) -> Self {
        Self(links.into_iter().collect())
    }

    pub fn links(&self) -> &[Link] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_linked(&self) -> bool {
        !self.0.is_empty()
    }

    /// True when non-empty and every link names a concrete dataset.
    pub fn is_linked_fully(&self) -> bool {
        self.is_linked() && self.0.iter().all(|l| l.dataset.is_some())
    }

    pub fn first(&self) -> Option<&Link> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Link> {
        self.0.last()
    }

    /// Applies `dataset` to the first link only, leaving the rest as they
    /// are.
    pub fn apply_dataset(&self, dataset: Option<DatasetId>) -> Links {
        let mut links = self.0.clone();
        if let Some(first) = links.first_mut() {
            *first = first.apply_dataset(dataset);
        }
        Links(links)
    }

    pub fn dataset_ids(&self) -> Vec<DatasetId> {
        self.0.iter().filter_map(|l| l.dataset).collect()
    }

    pub fn dataset_schema_ids(&self) -> Vec<DatasetSchemaId> {
        self.0.iter().filter_map(|l| l.schema).collect()
    }

    /// Field IDs of every link, or `None` if any link lacks one.
    pub fn dataset_schema_field_ids(&self) -> Option<Vec<DatasetFieldId>> {
        self.0.iter().map(|l| l.field).collect()
    }

    pub fn has_dataset(&self, id: DatasetId) -> bool {
        self.0.iter().any(|l| l.dataset == Some(id))
    }

    pub fn has_dataset_schema(&self, id: DatasetSchemaId) -> bool {
        self.0.iter().any(|l| l.schema == Some(id))
    }

    pub fn has_dataset_schema_and_dataset(&self, schema: DatasetSchemaId, dataset: DatasetId) -> bool {
        self.0
            .iter()
            .any(|l| l.schema == Some(schema) && l.dataset == Some(dataset))
    }

    /// Rewrites every ID through the given maps.
    ///
    /// Used when datasets are re-imported under new IDs. If any coordinate
    /// has no mapping the links can no longer be resolved and are all
    /// dropped.
    pub fn replace(
        &self,
        schemas: &FxHashMap<DatasetSchemaId, DatasetSchemaId>,
        datasets: &FxHashMap<DatasetId, DatasetId>,
        fields: &FxHashMap<DatasetFieldId, DatasetFieldId>,
    ) -> Links {
        fn map<K: Copy + Eq + std::hash::Hash>(id: Option<K>, m: &FxHashMap<K, K>) -> Option<Option<K>> {
            match id {
                None => Some(None),
                Some(id) => m.get(&id).copied().map(Some),
            }
        }

        let replaced: Option<Vec<Link>> = self
            .0
            .iter()
            .map(|l| {
                Some(Link {
                    dataset: map(l.dataset, datasets)?,
                    schema: map(l.schema, schemas)?,
                    field: map(l.field, fields)?,
                })
            })
            .collect();
        Links(replaced.unwrap_or_default())
    }

    /// Resolves the linked value through `loader`.
    ///
    /// The first link's dataset is loaded along the path of every link's
    /// field. Returns `Ok(None)` when there is nothing to resolve; loader
    /// errors are returned unchanged.
    pub fn dataset_value(&self, loader: &dyn DatasetLoader) -> Result<Option<Value>, LoaderError> {
        let Some(dataset) = self.first().and_then(Link::dataset) else {
            return Ok(None);
        };
        let Some(fields) = self.dataset_schema_field_ids() else {
            return Ok(None);
        };
        Ok(loader.load(dataset, &fields)?.and_then(|f| f.value))
    }
}

impl From<Link> for Links {
    fn from(link: Link) -> Self {
        Links(vec![link])
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Links::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLoader {
        dataset: DatasetId,
        value: Value,
    }

    impl DatasetLoader for FixedLoader {
        fn load(
            &self,
            dataset: DatasetId,
            fields: &[DatasetFieldId],
        ) -> Result<Option<DatasetField>, LoaderError> {
            if dataset != self.dataset {
                return Ok(None);
            }
            Ok(fields
                .last()
                .map(|f| DatasetField::new(*f, Some(self.value.clone()))))
        }
    }

    #[test]
    fn test_linked_states() {
        assert!(!Links::default().is_linked());
        assert!(!Links::default().is_linked_fully());

        let partial = Links::from(Link::schema_field(DatasetSchemaId::new(), DatasetFieldId::new()));
        assert!(partial.is_linked());
        assert!(!partial.is_linked_fully());

        let full = partial.apply_dataset(Some(DatasetId::new()));
        assert!(full.is_linked_fully());
    }

    #[test]
    fn test_apply_dataset_never_overwrites() {
        let concrete = DatasetId::new();
        let other = DatasetId::new();
        let link = Link::new(Some(concrete), None, None);
        assert_eq!(link.apply_dataset(Some(other)).dataset(), Some(concrete));
        assert_eq!(Link::default().apply_dataset(Some(other)).dataset(), Some(other));
        assert_eq!(Link::default().apply_dataset(None).dataset(), None);
    }

    #[test]
    fn test_apply_dataset_fills_first_link_only() {
        let ds = DatasetId::new();
        let links = Links::new([Link::default(), Link::default()]).apply_dataset(Some(ds));
        assert_eq!(links.links()[0].dataset(), Some(ds));
        assert_eq!(links.links()[1].dataset(), None);
    }

    #[test]
    fn test_collected_ids() {
        let (s1, s2) = (DatasetSchemaId::new(), DatasetSchemaId::new());
        let (d1, f1) = (DatasetId::new(), DatasetFieldId::new());
        let links = Links::new([
            Link::new(Some(d1), Some(s1), Some(f1)),
            Link::new(None, None, Some(f1)),
            Link::schema_field(s2, f1),
        ]);
        assert_eq!(links.dataset_schema_ids(), vec![s1, s2]);
        assert_eq!(links.dataset_ids(), vec![d1]);
        assert_eq!(links.dataset_schema_field_ids(), Some(vec![f1, f1, f1]));
        assert!(links.has_dataset_schema(s2));
        assert!(links.has_dataset_schema_and_dataset(s1, d1));
        assert!(!links.has_dataset_schema_and_dataset(s2, d1));

        let gap = Links::new([Link::new(Some(d1), None, None)]);
        assert_eq!(gap.dataset_schema_field_ids(), None);
        assert!(gap.dataset_schema_ids().is_empty());
    }

    #[test]
    fn test_replace() {
        let (s1, s2) = (DatasetSchemaId::new(), DatasetSchemaId::new());
        let (d1, d2) = (DatasetId::new(), DatasetId::new());
        let (f1, f2) = (DatasetFieldId::new(), DatasetFieldId::new());
        let links = Links::from(Link::new(Some(d1), Some(s1), Some(f1)));

        let schemas = FxHashMap::from_iter([(s1, s2)]);
        let datasets = FxHashMap::from_iter([(d1, d2)]);
        let fields = FxHashMap::from_iter([(f1, f2)]);
        let replaced = links.replace(&schemas, &datasets, &fields);
        assert_eq!(replaced, Links::from(Link::new(Some(d2), Some(s2), Some(f2))));

        let replaced = links.replace(&schemas, &FxHashMap::default(), &fields);
        assert!(replaced.is_empty());
    }

    #[test]
    fn test_dataset_value() {
        let ds = DatasetId::new();
        let loader = FixedLoader {
            dataset: ds,
            value: Value::from("hello"),
        };
        let unresolved = Links::from(Link::schema_field(DatasetSchemaId::new(), DatasetFieldId::new()));
        assert_eq!(unresolved.dataset_value(&loader).unwrap(), None);

        let resolved = unresolved.apply_dataset(Some(ds));
        assert_eq!(resolved.dataset_value(&loader).unwrap(), Some(Value::from("hello")));
        assert_eq!(Links::default().dataset_value(&loader).unwrap(), None);
    }

    #[test]
    fn test_dataset_value_propagates_errors() {
        let failing = |_: DatasetId, _: &[DatasetFieldId]| -> Result<Option<DatasetField>, LoaderError> {
            Err(LoaderError::new("offline"))
        };
        let links = Links::from(Link::new(Some(DatasetId::new()), None, Some(DatasetFieldId::new())));
        let err = links.dataset_value(&failing).unwrap_err();
        assert_eq!(err.into_inner().to_string(), "offline");
    }
}
