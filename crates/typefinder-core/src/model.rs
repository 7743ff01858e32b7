//! Type model: structural type descriptors consumed by the planner.
//!
//! This module provides the metadata vocabulary shared by every stage:
//! - [`TypeName`]: qualified type identity
//! - [`TypeKind`]: leaf / value / collection / complex / interface classification
//! - [`TypeDescriptor`]: properties, element type, implemented interfaces, modifiers
//! - [`PropertyDescriptor`]: one declared property
//!
//! Descriptors are immutable once handed out by a
//! [`TypeMetadataProvider`](crate::provider::TypeMetadataProvider). Identity is
//! the qualified name: two descriptors with the same [`TypeName`] are the same
//! type.
//!
//! # Accessibility Model
//!
//! | Variant | C# keyword(s) |
//! |---------|---------------|
//! | `Public` | `public` |
//! | `Internal` | `internal` |
//! | `Protected` | `protected` |
//! | `ProtectedInternal` | `protected internal` |
//! | `PrivateProtected` | `private protected` |
//! | `Private` | `private` |
//! | `NotApplicable` | (nothing rendered) |

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Identity
// ============================================================================

/// Qualified name of a type; the type's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    /// Create a new type name.
    pub fn new(name: impl Into<String>) -> Self {
        TypeName(name.into())
    }

    /// The qualified name as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace portion (everything before the last top-level `.`).
    ///
    /// Dots inside generic brackets do not split: `List<A.B>` has no namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.split_index().map(|idx| &self.0[..idx])
    }

    /// Simple name (everything after the last top-level `.`).
    pub fn simple_name(&self) -> &str {
        match self.split_index() {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    fn split_index(&self) -> Option<usize> {
        let mut depth = 0usize;
        let mut last = None;
        for (idx, ch) in self.0.char_indices() {
            match ch {
                '<' | '[' => depth += 1,
                '>' | ']' => depth = depth.saturating_sub(1),
                '.' if depth == 0 => last = Some(idx),
                _ => {}
            }
        }
        last
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Structural classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Primitive, string, date/time: no explorable structure.
    Leaf,
    /// User-defined value type; treated as a leaf.
    Value,
    /// Enumerable of a single element type.
    Collection,
    /// Reference type with properties.
    Complex,
    /// Interface type; may be a match target via implementation.
    Interface,
}

impl TypeKind {
    /// Leaf types are never descended into and never iterated.
    pub fn is_leaf(self) -> bool {
        matches!(self, TypeKind::Leaf | TypeKind::Value)
    }
}

/// Declared accessibility of a type or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
    /// No accessibility keyword is rendered.
    NotApplicable,
}

/// Declaration modifier on a type or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Static,
    Sealed,
    Abstract,
    Partial,
}

// ============================================================================
// Descriptors
// ============================================================================

/// One declared property of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name, used verbatim in access paths.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeName,
    /// Type that declares the property.
    pub declaring_type: TypeName,
}

impl PropertyDescriptor {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<TypeName>,
        declaring_type: impl Into<TypeName>,
    ) -> Self {
        PropertyDescriptor {
            name: name.into(),
            ty: ty.into(),
            declaring_type: declaring_type.into(),
        }
    }
}

/// Structural metadata for a single type.
///
/// Properties keep declaration order; the planner walks them in that order
/// so generated code is stable for the same metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: TypeName,
    pub kind: TypeKind,
    /// Element type when `kind == Collection`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<TypeName>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Directly implemented interfaces.
    #[serde(default)]
    pub interfaces: Vec<TypeName>,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl TypeDescriptor {
    /// Create a descriptor with no properties, interfaces or modifiers.
    pub fn new(name: impl Into<TypeName>, kind: TypeKind) -> Self {
        TypeDescriptor {
            name: name.into(),
            kind,
            element: None,
            properties: Vec::new(),
            interfaces: Vec::new(),
            accessibility: Accessibility::Public,
            modifiers: Vec::new(),
        }
    }

    pub fn leaf(name: impl Into<TypeName>) -> Self {
        TypeDescriptor::new(name, TypeKind::Leaf)
    }

    pub fn complex(name: impl Into<TypeName>) -> Self {
        TypeDescriptor::new(name, TypeKind::Complex)
    }

    pub fn interface(name: impl Into<TypeName>) -> Self {
        TypeDescriptor::new(name, TypeKind::Interface)
    }

    pub fn collection(name: impl Into<TypeName>, element: impl Into<TypeName>) -> Self {
        let mut descriptor = TypeDescriptor::new(name, TypeKind::Collection);
        descriptor.element = Some(element.into());
        descriptor
    }

    /// Append a property declared on this type.
    pub fn with_property(mut self, name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        let property = PropertyDescriptor::new(name, ty, self.name.clone());
        self.properties.push(property);
        self
    }

    pub fn with_interface(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// Element type if this is a collection.
    pub fn element_type(&self) -> Option<&TypeName> {
        match self.kind {
            TypeKind::Collection => self.element.as_ref(),
            _ => None,
        }
    }
}
