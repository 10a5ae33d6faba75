//! Semantic validation of stored properties.
//!
//! Writes through [`Property::update_value`] already check each value. This
//! module checks a whole property after the fact, e.g. one deserialized from
//! storage or produced by a migration, against the schema it claims to use.
//! [`inactive_fields`] reports which stored fields their schema conditions
//! currently hide.

use crate::error::ValidationError;
use crate::model::{ExtensionId, PluginId, SchemaId};
use crate::property::{GroupAndField, Item, Property};
use crate::schema::{Schema, SchemaField};

/// Validates a property against its schema.
///
/// Checks, in order:
/// - the property uses `schema`
/// - every item instantiates a schema group the schema defines
/// - list items instantiate list groups and plain groups the others
/// - every field is declared by its group and its value passes the field's
///   constraints
pub fn validate_property(property: &Property, schema: &Schema) -> Result<(), ValidationError> {
    if property.schema() != schema.id() {
        return Err(ValidationError::SchemaMismatch {
            expected: schema.id().clone(),
            actual: property.schema().clone(),
        });
    }

    for item in property.items() {
        validate_item(item, schema)?;
    }

    Ok(())
}

fn validate_item(item: &Item, schema: &Schema) -> Result<(), ValidationError> {
    let schema_group = schema
        .group(item.schema_group())
        .ok_or_else(|| ValidationError::SchemaGroupNotFound {
            group: item.schema_group().clone(),
        })?;

    if item.is_list() != schema_group.is_list() {
        return Err(ValidationError::ItemKindMismatch {
            item: item.id(),
            group: schema_group.id().clone(),
            expected: if schema_group.is_list() { "group list" } else { "group" },
        });
    }

    for gf in item.group_and_fields(None) {
        let schema_field = schema_group
            .field(gf.field.id())
            .ok_or_else(|| ValidationError::FieldNotFound { pointer: gf.pointer() })?;
        schema_field
            .validate(gf.field.optional_value())
            .map_err(|source| ValidationError::InvalidValue {
                field: gf.field.id().clone(),
                source,
            })?;
    }

    Ok(())
}

/// Fields whose schema group or schema field condition does not hold.
///
/// Conditions are tested against the group holding the field. Inactive
/// fields keep their values; editors hide them. Items of schema groups the
/// schema does not define are skipped.
pub fn inactive_fields<'a>(property: &'a Property, schema: &Schema) -> Vec<GroupAndField<'a>> {
    property
        .items()
        .iter()
        .flat_map(|item| item.group_and_fields(None))
        .filter(|gf| {
            let Some(schema_group) = schema.group(gf.group.schema_group()) else {
                return false;
            };
            let group_active = schema_group.condition().is_none_or(|c| c.test(gf.group));
            let field_active = schema_group
                .field(gf.field.id())
                .and_then(SchemaField::condition)
                .is_none_or(|c| c.test(gf.group));
            !(group_active && field_active)
        })
        .collect()
}

/// Checks that a layer's property uses the schema its plugin extension declares.
pub fn validate_layer_property(
    plugin: &PluginId,
    extension: &ExtensionId,
    property: &Property,
) -> Result<(), ValidationError> {
    let expected = SchemaId::new(plugin.clone(), extension.clone());
    if property.schema() != &expected {
        return Err(ValidationError::SchemaMismatch {
            expected,
            actual: property.schema().clone(),
        });
    }
    Ok(())
}
