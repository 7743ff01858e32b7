//! Type metadata provider trait and the in-memory registry.
//!
//! The planner never owns type metadata; it asks a [`TypeMetadataProvider`]
//! for descriptors on demand. [`TypeRegistry`] is the in-memory provider used
//! by the declarative registry loader and by tests.
//!
//! # Synthesized Descriptors
//!
//! [`TypeRegistry::resolve_ref`] accepts type reference text and registers
//! descriptors for shapes that do not need an explicit declaration:
//!
//! | Text | Synthesized kind |
//! |------|------------------|
//! | `T[]` | `Collection` of `T` |
//! | `IEnumerable<T>` (any configured collection name) | `Collection` of `T` |
//! | `int`, `string`, `DateTime`, ... (configured leaf names) | `Leaf` |
//!
//! Anything else must be declared before it is referenced.

use std::collections::{HashMap, HashSet};

use crate::config::GeneratorConfig;
use crate::error::{FinderError, FinderResult};
use crate::model::{TypeDescriptor, TypeKind, TypeName};
use crate::typeref::{parse_type_ref, TypeRef};

/// Supplies type descriptors on demand.
pub trait TypeMetadataProvider {
    /// Descriptor for `name`, or `None` if the type is unknown.
    fn descriptor(&self, name: &TypeName) -> Option<&TypeDescriptor>;

    /// Descriptor for `name`, or [`FinderError::UnknownType`].
    fn require(&self, name: &TypeName) -> FinderResult<&TypeDescriptor> {
        self.descriptor(name)
            .ok_or_else(|| FinderError::UnknownType { ty: name.clone() })
    }
}

/// Whether `ty` implements `interface`, directly or through interface inheritance.
///
/// Unknown interfaces are treated as having no further bases. Interface
/// inheritance cycles terminate.
pub fn implements<P>(provider: &P, ty: &TypeDescriptor, interface: &TypeName) -> bool
where
    P: TypeMetadataProvider + ?Sized,
{
    let mut visited: HashSet<&TypeName> = HashSet::new();
    let mut stack: Vec<&TypeName> = ty.interfaces.iter().collect();

    while let Some(current) = stack.pop() {
        if current == interface {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(descriptor) = provider.descriptor(current) {
            stack.extend(descriptor.interfaces.iter());
        }
    }
    false
}

/// In-memory provider keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeDescriptor>,
    /// Insertion order, for deterministic iteration.
    order: Vec<TypeName>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor, replacing any previous one with the same name.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        let name = descriptor.name.clone();
        if self.types.insert(name.clone(), descriptor).is_none() {
            self.order.push(name);
        }
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// Resolve type reference text to a registered type name.
    ///
    /// Returns the canonical name. Collection and leaf shapes are registered
    /// on first use; other names must already be registered.
    pub fn resolve_ref(&mut self, text: &str, config: &GeneratorConfig) -> FinderResult<TypeName> {
        let parsed = parse_type_ref(text)?;
        self.resolve_parsed(&parsed, config)
    }

    fn resolve_parsed(&mut self, parsed: &TypeRef, config: &GeneratorConfig) -> FinderResult<TypeName> {
        let name = TypeName::new(parsed.to_string());
        if self.contains(&name) {
            return Ok(name);
        }

        if let Some(element) = parsed.collection_element(config) {
            let element = self.resolve_parsed(element, config)?;
            self.insert(TypeDescriptor::collection(name.clone(), element));
            return Ok(name);
        }

        match parsed {
            TypeRef::Named { name: simple, args } if args.is_empty() && config.is_leaf_name(simple) => {
                self.insert(TypeDescriptor::new(name.clone(), TypeKind::Leaf));
                Ok(name)
            }
            _ => Err(FinderError::UnknownType { ty: name }),
        }
    }
}

impl TypeMetadataProvider for TypeRegistry {
    fn descriptor(&self, name: &TypeName) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDescriptor::interface("IEntity"));
        registry.insert(TypeDescriptor::interface("IContract").with_interface("IEntity"));
        registry.insert(TypeDescriptor::complex("Contract").with_interface("IContract"));
        registry.insert(TypeDescriptor::complex("Plain"));
        registry
    }

    mod implements_tests {
        use super::*;

        #[test]
        fn direct_implementation() {
            let registry = contract_registry();
            let contract = registry.descriptor(&TypeName::new("Contract")).unwrap();
            assert!(implements(&registry, contract, &TypeName::new("IContract")));
        }

        #[test]
        fn transitive_implementation() {
            let registry = contract_registry();
            let contract = registry.descriptor(&TypeName::new("Contract")).unwrap();
            assert!(implements(&registry, contract, &TypeName::new("IEntity")));
        }

        #[test]
        fn unrelated_type_does_not_implement() {
            let registry = contract_registry();
            let plain = registry.descriptor(&TypeName::new("Plain")).unwrap();
            assert!(!implements(&registry, plain, &TypeName::new("IContract")));
        }

        #[test]
        fn interface_cycles_terminate() {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::interface("IA").with_interface("IB"));
            registry.insert(TypeDescriptor::interface("IB").with_interface("IA"));
            registry.insert(TypeDescriptor::complex("Thing").with_interface("IA"));
            let thing = registry.descriptor(&TypeName::new("Thing")).unwrap();
            assert!(!implements(&registry, thing, &TypeName::new("IC")));
            assert!(implements(&registry, thing, &TypeName::new("IB")));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn declared_types_resolve_to_themselves() {
            let mut registry = contract_registry();
            let config = GeneratorConfig::default();
            let name = registry.resolve_ref("Contract", &config).unwrap();
            assert_eq!(name, TypeName::new("Contract"));
        }

        #[test]
        fn leaf_names_are_synthesized() {
            let mut registry = TypeRegistry::new();
            let config = GeneratorConfig::default();
            let name = registry.resolve_ref("DateTime", &config).unwrap();
            let descriptor = registry.descriptor(&name).unwrap();
            assert_eq!(descriptor.kind, TypeKind::Leaf);
        }

        #[test]
        fn collections_are_synthesized_with_element() {
            let mut registry = contract_registry();
            let config = GeneratorConfig::default();
            let name = registry.resolve_ref("List< Contract >", &config).unwrap();
            assert_eq!(name, TypeName::new("List<Contract>"));
            let descriptor = registry.descriptor(&name).unwrap();
            assert_eq!(descriptor.kind, TypeKind::Collection);
            assert_eq!(descriptor.element_type(), Some(&TypeName::new("Contract")));
        }

        #[test]
        fn nested_arrays_register_every_level() {
            let mut registry = TypeRegistry::new();
            let config = GeneratorConfig::default();
            registry.resolve_ref("int[][]", &config).unwrap();
            assert!(registry.contains(&TypeName::new("int[][]")));
            assert!(registry.contains(&TypeName::new("int[]")));
            assert!(registry.contains(&TypeName::new("int")));
        }

        #[test]
        fn unknown_names_are_rejected() {
            let mut registry = TypeRegistry::new();
            let config = GeneratorConfig::default();
            let err = registry.resolve_ref("List<Missing>", &config).unwrap_err();
            assert_eq!(
                err,
                FinderError::UnknownType {
                    ty: TypeName::new("Missing")
                }
            );
        }

        #[test]
        fn require_reports_unknown_type() {
            let registry = TypeRegistry::new();
            let err = registry.require(&TypeName::new("Ghost")).unwrap_err();
            assert_eq!(err.code(), "unknown_type");
        }

        #[test]
        fn iteration_follows_insertion_order() {
            let registry = contract_registry();
            let names: Vec<_> = registry.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["IEntity", "IContract", "Contract", "Plain"]);
        }
    }
}
