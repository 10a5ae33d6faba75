//! Identifiers for properties, items, schemas and datasets.
//!
//! Entity identifiers are UUIDs displayed as non-hyphenated lowercase hex.
//! Schema-side identifiers (schema groups, fields, extensions) are plain
//! strings chosen by the plugin author.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BuildError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Human readable name of this ID kind, used in error messages.
            pub const KIND: &'static str = $kind;

            /// Generates a fresh, time-ordered ID.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Builds an ID from 16 raw bytes.
            pub const fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            /// The zero ID. Constructors reject it.
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parses an ID from hex, with or without hyphens.
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }

            pub(crate) fn require_non_nil(self) -> Result<Self, BuildError> {
                if self.is_nil() {
                    Err(BuildError::NilId { kind: Self::KIND })
                } else {
                    Ok(self)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.simple())
            }
        }

        impl FromStr for $name {
            type Err = BuildError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| BuildError::InvalidId {
                    kind: Self::KIND,
                    input: s.to_string(),
                })
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

uuid_id!(
    /// Identifies a property instance.
    PropertyId,
    "property"
);
uuid_id!(
    /// Identifies the scene that owns a property.
    SceneId,
    "scene"
);
uuid_id!(
    /// Identifies an item (group or group list) inside a property.
    ItemId,
    "item"
);
uuid_id!(
    /// Identifies a dataset record.
    DatasetId,
    "dataset"
);
uuid_id!(
    /// Identifies a dataset schema.
    DatasetSchemaId,
    "dataset schema"
);
uuid_id!(
    /// Identifies a field of a dataset schema.
    DatasetFieldId,
    "dataset field"
);

string_id!(
    /// Identifies a schema group, unique within its schema.
    SchemaGroupId
);
string_id!(
    /// Identifies a field, unique within its schema group.
    FieldId
);
string_id!(
    /// Identifies a plugin extension.
    ExtensionId
);

/// Plugin identity: a name plus an optional version, written `name~version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId {
    name: String,
    version: Option<String>,
}

impl PluginId {
    /// Creates a plugin ID. The name must be non-empty and free of `~` and `/`.
    pub fn new(name: impl Into<String>, version: Option<String>) -> Result<Self, BuildError> {
        let name = name.into();
        let valid_name = !name.is_empty() && !name.contains(['~', '/']);
        let valid_version = version
            .as_deref()
            .is_none_or(|v| !v.is_empty() && !v.contains(['~', '/']));
        if !valid_name || !valid_version {
            let input = match &version {
                Some(v) => format!("{name}~{v}"),
                None => name,
            };
            return Err(BuildError::InvalidId { kind: "plugin", input });
        }
        Ok(Self { name, version })
    }

    /// Unversioned ID for a name known to be valid.
    pub(crate) fn from_static(name: &'static str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
        }
    }

    /// Parses `name` or `name~version`.
    pub fn parse(s: &str) -> Result<Self, BuildError> {
        match s.split_once('~') {
            Some((name, version)) => Self::new(name, Some(version.to_string())),
            None => Self::new(s, None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}~{}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

impl TryFrom<String> for PluginId {
    type Error = BuildError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.to_string()
    }
}

/// Identifies a property schema: the plugin that declares it plus one of
/// the plugin's extensions. Written `plugin/extension`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaId {
    plugin: PluginId,
    extension: ExtensionId,
}

impl SchemaId {
    pub fn new(plugin: PluginId, extension: ExtensionId) -> Self {
        Self { plugin, extension }
    }

    /// Parses `plugin/extension` or `plugin~version/extension`.
    pub fn parse(s: &str) -> Result<Self, BuildError> {
        let invalid = || BuildError::InvalidId {
            kind: "schema",
            input: s.to_string(),
        };
        let (plugin, extension) = s.rsplit_once('/').ok_or_else(invalid)?;
        if extension.is_empty() {
            return Err(invalid());
        }
        let plugin = PluginId::parse(plugin).map_err(|_| invalid())?;
        Ok(Self::new(plugin, ExtensionId::new(extension)))
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn extension(&self) -> &ExtensionId {
        &self.extension
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.plugin, self.extension)
    }
}

impl FromStr for SchemaId {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaId {
    type Error = BuildError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SchemaId> for String {
    fn from(id: SchemaId) -> Self {
        id.to_string()
    }
}
