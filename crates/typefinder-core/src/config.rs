//! Generator configuration.
//!
//! Configuration is the only state that outlives a generation pass. Every
//! field has a default, so a partial JSON object (or none at all) is valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default loop-variable pool: `a` through `z` without `u`.
pub const DEFAULT_VARIABLE_NAMES: [&str; 25] = [
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "v", "w", "x", "y", "z",
];

/// Type names recognized as leaves when not declared explicitly.
pub const DEFAULT_LEAF_TYPE_NAMES: &[&str] = &[
    "bool",
    "byte",
    "sbyte",
    "char",
    "short",
    "ushort",
    "int",
    "uint",
    "long",
    "ulong",
    "float",
    "double",
    "decimal",
    "string",
    "String",
    "DateTime",
    "DateTimeOffset",
    "TimeSpan",
    "Guid",
    "System.Boolean",
    "System.Byte",
    "System.SByte",
    "System.Char",
    "System.Int16",
    "System.UInt16",
    "System.Int32",
    "System.UInt32",
    "System.Int64",
    "System.UInt64",
    "System.Single",
    "System.Double",
    "System.Decimal",
    "System.String",
    "System.DateTime",
    "System.DateTimeOffset",
    "System.TimeSpan",
    "System.Guid",
];

/// Generic type names recognized as single-element collections.
pub const DEFAULT_COLLECTION_TYPE_NAMES: &[&str] = &[
    "IEnumerable",
    "ICollection",
    "IList",
    "IReadOnlyCollection",
    "IReadOnlyList",
    "List",
    "HashSet",
    "ISet",
    "Collection",
    "System.Collections.Generic.IEnumerable",
    "System.Collections.Generic.ICollection",
    "System.Collections.Generic.IList",
    "System.Collections.Generic.IReadOnlyCollection",
    "System.Collections.Generic.IReadOnlyList",
    "System.Collections.Generic.List",
    "System.Collections.Generic.HashSet",
    "System.Collections.Generic.ISet",
];

/// What the planner does when a type reappears on the active traversal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Abort the finder with a `CycleDetected` diagnostic.
    #[default]
    Reject,
    /// Plan nothing for the re-entering branch.
    Prune,
}

/// Configuration for a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Ordered pool of loop-variable identifiers.
    pub variable_names: Vec<String>,
    pub cycle_policy: CyclePolicy,
    /// Surface shape mismatches as warnings instead of dropping them silently.
    pub report_shape_mismatch: bool,
    pub leaf_type_names: Vec<String>,
    pub collection_type_names: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            variable_names: DEFAULT_VARIABLE_NAMES.iter().map(|s| s.to_string()).collect(),
            cycle_policy: CyclePolicy::default(),
            report_shape_mismatch: false,
            leaf_type_names: DEFAULT_LEAF_TYPE_NAMES.iter().map(|s| s.to_string()).collect(),
            collection_type_names: DEFAULT_COLLECTION_TYPE_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A configuration value that cannot be used for generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid loop variable name '{name}': expected an identifier")]
    InvalidVariableName { name: String },
}

impl GeneratorConfig {
    /// Check values that deserialization alone cannot rule out.
    ///
    /// Every loop-variable name must be an identifier. Repeated names are
    /// accepted; the allocator issues each name once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.variable_names.iter().find(|name| !is_identifier(name)) {
            Some(name) => Err(ConfigError::InvalidVariableName { name: name.clone() }),
            None => Ok(()),
        }
    }

    pub fn is_leaf_name(&self, name: &str) -> bool {
        self.leaf_type_names.iter().any(|n| n == name)
    }

    pub fn is_collection_name(&self, name: &str) -> bool {
        self.collection_type_names.iter().any(|n| n == name)
    }

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn with_variable_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variable_names = names.into_iter().map(Into::into).collect();
        self
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
