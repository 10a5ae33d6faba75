//! Error types for property construction, validation and decoding.
//!
//! Lookups never fail with an error: a missing schema group, item or field is
//! reported as `None` or an empty result. The enums below cover the operations
//! that can be rejected outright.

use thiserror::Error;

use crate::decode::GeometryKind;
use crate::model::{FieldId, ItemId, SchemaGroupId, SchemaId, ValueType};
use crate::property::Pointer;

/// Error while constructing a model value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{kind} ID must not be nil")]
    NilId { kind: &'static str },

    #[error("invalid {kind} ID: {input:?}")]
    InvalidId { kind: &'static str, input: String },

    #[error("unknown value type: {input:?}")]
    UnknownValueType { input: String },

    #[error("a {expected} slot cannot hold a {found} value")]
    ValueTypeMismatch { expected: ValueType, found: ValueType },

    #[error("duplicate field {field} in schema group {group}")]
    DuplicateSchemaField { group: SchemaGroupId, field: FieldId },

    #[error("duplicate schema group {group}")]
    DuplicateSchemaGroup { group: SchemaGroupId },

    #[error("representative field {field} is not part of schema group {group}")]
    UnknownRepresentativeField { group: SchemaGroupId, field: FieldId },

    #[error("linkable {expected} field {pointer} does not resolve to a {expected} field")]
    InvalidLinkableField { expected: ValueType, pointer: Pointer },

    #[error("duplicate field {field} in group {item}")]
    DuplicateField { item: ItemId, field: FieldId },

    #[error("duplicate item {item}")]
    DuplicateItem { item: ItemId },

    #[error("schema group {group} is already instantiated by item {item}")]
    SchemaGroupOccupied { group: SchemaGroupId, item: ItemId },

    #[error("group {item} instantiates schema group {found}, expected {expected}")]
    SchemaGroupMismatch {
        item: ItemId,
        expected: SchemaGroupId,
        found: SchemaGroupId,
    },
}

/// A value rejected by a schema field's constraints.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueViolation {
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch { expected: ValueType, found: ValueType },

    #[error("{value} is below the minimum {min}")]
    BelowMin { value: f64, min: f64 },

    #[error("{value} is above the maximum {max}")]
    AboveMax { value: f64, max: f64 },

    #[error("{value:?} is not one of the field choices")]
    NotAChoice { value: String },
}

/// Error during a write or a semantic validation pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("schema mismatch: expected {expected}, property uses {actual}")]
    SchemaMismatch { expected: SchemaId, actual: SchemaId },

    #[error("no field can be resolved at {pointer}")]
    FieldNotFound { pointer: Pointer },

    #[error("schema field {expected} cannot update field {found}")]
    FieldMismatch { expected: FieldId, found: FieldId },

    #[error("invalid value for field {field}: {source}")]
    InvalidValue {
        field: FieldId,
        #[source]
        source: ValueViolation,
    },

    #[error("schema group {group} is not defined by the schema")]
    SchemaGroupNotFound { group: SchemaGroupId },

    #[error("item {item} of schema group {group} must be a {expected}")]
    ItemKindMismatch {
        item: ItemId,
        group: SchemaGroupId,
        expected: &'static str,
    },
}

/// Error raised while building a property from decoded feature data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("bad color")]
    BadColor,

    #[error("style field {field} has the wrong type: expected {expected}")]
    FieldType { field: String, expected: &'static str },

    #[error("{kind} geometry cannot be built from a {found} value")]
    GeometryType { kind: GeometryKind, found: ValueType },

    #[error("unknown geometry kind {0:?}")]
    UnknownKind(String),

    #[error("unknown built-in extension {0:?}")]
    UnknownExtension(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Error reported by a dataset loader, passed through untouched.
#[derive(Debug, Error)]
#[error("dataset loader failed: {source}")]
pub struct LoaderError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl LoaderError {
    /// Wraps an arbitrary loader error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { source: source.into() }
    }

    /// Returns the wrapped error.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.source
    }
}
