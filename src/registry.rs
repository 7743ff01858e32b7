//! Declarative finder registry.
//!
//! A registry file enumerates type metadata and the finders to generate,
//! so no attribute scanning is needed. Format (JSON):
//!
//! ```json
//! {
//!   "config": { "cycle_policy": "reject" },
//!   "csharp": { "indent": "\t" },
//!   "types": [
//!     { "name": "Acme.Child", "properties": [{ "name": "Date", "type": "DateTime" }] },
//!     { "name": "Acme.Parent", "properties": [
//!         { "name": "Date", "type": "DateTime" },
//!         { "name": "Children", "type": "IEnumerable<Acme.Child>" }
//!     ] },
//!     { "name": "Acme.DateTimeFinder", "modifiers": ["static"] }
//!   ],
//!   "finders": [
//!     { "container": "Acme.DateTimeFinder", "name": "Find",
//!       "modifiers": ["static", "partial"],
//!       "parameters": [{ "name": "parent", "type": "Acme.Parent" }],
//!       "return_type": "IEnumerable<DateTime>" }
//!   ]
//! }
//! ```
//!
//! Declared types may reference each other in any order. Leaf and collection
//! types are synthesized from their names and need no declaration.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use typefinder_core::config::{ConfigError, GeneratorConfig};
use typefinder_core::error::FinderError;
use typefinder_core::finder::MarkedMethod;
use typefinder_core::model::{Accessibility, Modifier, TypeDescriptor, TypeKind, TypeName};
use typefinder_core::provider::TypeRegistry;
use typefinder_core::typeref::canonicalize;
use typefinder_csharp::CSharpConfig;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading a registry file.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed registry: {0}")]
    Json(#[from] serde_json::Error),

    /// A declaration references a type that is neither declared nor synthesizable.
    #[error("type '{ty}' referenced by '{referenced_by}' is not declared")]
    UnknownType { ty: TypeName, referenced_by: String },

    #[error("type '{ty}' is declared more than once")]
    DuplicateType { ty: TypeName },

    #[error("invalid declaration of '{ty}': {message}")]
    InvalidDeclaration { ty: TypeName, message: String },

    #[error("invalid registry config: {0}")]
    Config(#[from] ConfigError),
}

// ============================================================================
// File Format
// ============================================================================

/// Property declaration; the declaring type is implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Type declaration as written in the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: TypeKind,
    /// Element type reference, for `collection` declarations.
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

fn default_kind() -> TypeKind {
    TypeKind::Complex
}

/// Raw registry file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub config: GeneratorConfig,
    #[serde(default)]
    pub csharp: CSharpConfig,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub finders: Vec<MarkedMethod>,
}

// ============================================================================
// Loaded Registry
// ============================================================================

/// A registry with every type reference resolved.
#[derive(Debug, Clone)]
pub struct Registry {
    pub config: GeneratorConfig,
    pub csharp: CSharpConfig,
    pub types: TypeRegistry,
    pub finders: Vec<MarkedMethod>,
}

impl Registry {
    /// Load and resolve a registry file.
    pub fn load(path: &Path) -> Result<Registry, RegistryError> {
        let text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            types = registry.types.len(),
            finders = registry.finders.len(),
            "loaded registry"
        );
        Ok(registry)
    }

    pub fn from_json_str(text: &str) -> Result<Registry, RegistryError> {
        let file: RegistryFile = serde_json::from_str(text)?;
        Self::from_file(file)
    }

    /// Resolve a parsed registry file.
    ///
    /// Declared names are registered first so declarations can reference each
    /// other in any order. Finder signatures are resolved best-effort; a
    /// finder naming an unknown type is reported when it is generated.
    pub fn from_file(file: RegistryFile) -> Result<Registry, RegistryError> {
        let RegistryFile {
            config,
            csharp,
            types: decls,
            finders,
        } = file;
        config.validate()?;

        let mut types = TypeRegistry::new();
        let mut seen = HashSet::new();
        for decl in &decls {
            let name = declared_name(decl)?;
            if !seen.insert(name.clone()) {
                return Err(RegistryError::DuplicateType { ty: name });
            }
            types.insert(TypeDescriptor::new(name, decl.kind));
        }

        for decl in &decls {
            let descriptor = resolve_decl(&mut types, decl, &config)?;
            types.insert(descriptor);
        }

        for finder in &finders {
            let references = finder
                .parameters
                .iter()
                .map(|p| p.ty.as_str())
                .chain(std::iter::once(finder.return_type.as_str()));
            for reference in references {
                if let Err(err) = types.resolve_ref(reference, &config) {
                    tracing::debug!(finder = %finder.label(), %err, "unresolved finder reference");
                }
            }
        }

        Ok(Registry {
            config,
            csharp,
            types,
            finders,
        })
    }

    /// Finder named `label` (`Container.Method`, qualified or simple container).
    pub fn finder(&self, label: &str) -> Option<&MarkedMethod> {
        self.finders.iter().find(|m| m.matches_label(label))
    }
}

fn resolve_decl(
    types: &mut TypeRegistry,
    decl: &TypeDecl,
    config: &GeneratorConfig,
) -> Result<TypeDescriptor, RegistryError> {
    let name = declared_name(decl)?;
    let mut descriptor = TypeDescriptor::new(name.clone(), decl.kind)
        .with_accessibility(decl.accessibility);
    for modifier in &decl.modifiers {
        descriptor = descriptor.with_modifier(*modifier);
    }

    match (decl.kind, &decl.element) {
        (TypeKind::Collection, Some(element)) => {
            descriptor.element = Some(resolve(types, element, &name, config)?);
        }
        (TypeKind::Collection, None) => {
            return Err(RegistryError::InvalidDeclaration {
                ty: name,
                message: "collection declared without an element type".to_string(),
            });
        }
        (_, Some(_)) => {
            return Err(RegistryError::InvalidDeclaration {
                ty: name,
                message: "only collections have an element type".to_string(),
            });
        }
        (_, None) => {}
    }

    for property in &decl.properties {
        let ty = resolve(types, &property.ty, &name, config)?;
        descriptor = descriptor.with_property(property.name.as_str(), ty);
    }
    for interface in &decl.interfaces {
        let interface = resolve(types, interface, &name, config)?;
        descriptor = descriptor.with_interface(interface);
    }
    Ok(descriptor)
}

/// Canonical spelling of a declared name, matching what references resolve to.
fn declared_name(decl: &TypeDecl) -> Result<TypeName, RegistryError> {
    canonicalize(&decl.name)
        .map(TypeName::new)
        .map_err(|err| RegistryError::InvalidDeclaration {
            ty: TypeName::new(decl.name.trim()),
            message: err.to_string(),
        })
}

fn resolve(
    types: &mut TypeRegistry,
    reference: &str,
    referenced_by: &TypeName,
    config: &GeneratorConfig,
) -> Result<TypeName, RegistryError> {
    types
        .resolve_ref(reference, config)
        .map_err(|err| match err {
            FinderError::UnknownType { ty } => RegistryError::UnknownType {
                ty,
                referenced_by: referenced_by.to_string(),
            },
            other => RegistryError::InvalidDeclaration {
                ty: referenced_by.clone(),
                message: other.to_string(),
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use typefinder_core::provider::TypeMetadataProvider;

    const FAMILY: &str = r#"{
        "types": [
            { "name": "Acme.Parent", "properties": [
                { "name": "Date", "type": "DateTime" },
                { "name": "Children", "type": "IEnumerable<Acme.Child>" }
            ] },
            { "name": "Acme.Child", "properties": [{ "name": "Date", "type": "DateTime" }] },
            { "name": "Acme.DateTimeFinder", "modifiers": ["static"] }
        ],
        "finders": [
            { "container": "Acme.DateTimeFinder", "name": "Find",
              "parameters": [{ "name": "parent", "type": "Acme.Parent" }],
              "return_type": "IEnumerable<DateTime>" }
        ]
    }"#;

    mod loading_tests {
        use super::*;

        #[test]
        fn forward_references_resolve() {
            let registry = Registry::from_json_str(FAMILY).unwrap();
            let parent = registry
                .types
                .descriptor(&TypeName::new("Acme.Parent"))
                .unwrap();
            assert_eq!(parent.properties[1].ty, TypeName::new("IEnumerable<Acme.Child>"));
            let children = registry
                .types
                .descriptor(&TypeName::new("IEnumerable<Acme.Child>"))
                .unwrap();
            assert_eq!(children.element_type(), Some(&TypeName::new("Acme.Child")));
        }

        #[test]
        fn declarations_keep_modifiers_and_defaults() {
            let registry = Registry::from_json_str(FAMILY).unwrap();
            let finder = registry
                .types
                .descriptor(&TypeName::new("Acme.DateTimeFinder"))
                .unwrap();
            assert!(finder.has_modifier(Modifier::Static));
            assert_eq!(finder.kind, TypeKind::Complex);
            assert_eq!(registry.config, GeneratorConfig::default());
            assert_eq!(registry.csharp, CSharpConfig::default());
        }

        #[test]
        fn finder_result_element_is_registered() {
            let registry = Registry::from_json_str(FAMILY).unwrap();
            assert!(registry.types.contains(&TypeName::new("DateTime")));
        }

        #[test]
        fn finder_lookup_accepts_simple_container() {
            let registry = Registry::from_json_str(FAMILY).unwrap();
            assert!(registry.finder("DateTimeFinder.Find").is_some());
            assert!(registry.finder("Acme.DateTimeFinder.Find").is_some());
            assert!(registry.finder("Acme.DateTimeFinder.Missing").is_none());
        }

        #[test]
        fn declared_names_are_canonicalized() {
            let text = r#"{
                "types": [
                    { "name": "Box< int >", "properties": [{ "name": "Value", "type": "int" }] },
                    { "name": "Crate", "properties": [{ "name": "Box", "type": "Box<int>" }] }
                ]
            }"#;
            let registry = Registry::from_json_str(text).unwrap();
            let boxed = registry.types.descriptor(&TypeName::new("Box<int>")).unwrap();
            assert_eq!(boxed.properties[0].name, "Value");
            assert!(registry.types.descriptor(&TypeName::new("Box< int >")).is_none());
        }

        #[test]
        fn empty_object_is_an_empty_registry() {
            let registry = Registry::from_json_str("{}").unwrap();
            assert!(registry.types.is_empty());
            assert!(registry.finders.is_empty());
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn undeclared_property_type_is_rejected() {
            let text = r#"{ "types": [ { "name": "A", "properties": [{ "name": "B", "type": "Ghost" }] } ] }"#;
            match Registry::from_json_str(text).unwrap_err() {
                RegistryError::UnknownType { ty, referenced_by } => {
                    assert_eq!(ty, TypeName::new("Ghost"));
                    assert_eq!(referenced_by, "A");
                }
                other => panic!("unexpected error: {}", other),
            }
        }

        #[test]
        fn duplicate_declaration_is_rejected() {
            let text = r#"{ "types": [ { "name": "A" }, { "name": "A" } ] }"#;
            assert!(matches!(
                Registry::from_json_str(text).unwrap_err(),
                RegistryError::DuplicateType { .. }
            ));
        }

        #[test]
        fn collection_without_element_is_rejected() {
            let text = r#"{ "types": [ { "name": "Bag", "kind": "collection" } ] }"#;
            assert!(matches!(
                Registry::from_json_str(text).unwrap_err(),
                RegistryError::InvalidDeclaration { .. }
            ));
        }

        #[test]
        fn differently_spaced_duplicate_is_rejected() {
            let text = r#"{ "types": [ { "name": "Box<int>" }, { "name": "Box< int >" } ] }"#;
            match Registry::from_json_str(text).unwrap_err() {
                RegistryError::DuplicateType { ty } => assert_eq!(ty, TypeName::new("Box<int>")),
                other => panic!("unexpected error: {}", other),
            }
        }

        #[test]
        fn unparseable_declared_name_is_invalid_declaration() {
            let text = r#"{ "types": [ { "name": "Box<" } ] }"#;
            assert!(matches!(
                Registry::from_json_str(text).unwrap_err(),
                RegistryError::InvalidDeclaration { .. }
            ));
        }

        #[test]
        fn non_identifier_variable_name_is_rejected() {
            let text = r#"{ "config": { "variable_names": ["a", ""] } }"#;
            assert!(matches!(
                Registry::from_json_str(text).unwrap_err(),
                RegistryError::Config(ConfigError::InvalidVariableName { .. })
            ));
        }

        #[test]
        fn malformed_json_is_rejected() {
            assert!(matches!(
                Registry::from_json_str("{ \"types\": 3 }").unwrap_err(),
                RegistryError::Json(_)
            ));
        }

        #[test]
        fn unparseable_reference_is_invalid_declaration() {
            let text = r#"{ "types": [ { "name": "A", "properties": [{ "name": "B", "type": "List<" }] } ] }"#;
            assert!(matches!(
                Registry::from_json_str(text).unwrap_err(),
                RegistryError::InvalidDeclaration { .. }
            ));
        }
    }
}
