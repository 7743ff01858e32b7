//! Grouping of rendered finders into one output unit per container.
//!
//! Containers are keyed by qualified identity, so two containers with the
//! same simple name in different namespaces get separate units. Units are
//! emitted in the order their container first appears; methods keep their
//! input order within a unit.

use serde::{Deserialize, Serialize};

use crate::backend::SourceBackend;
use crate::finder::FinderSpec;
use crate::model::{TypeDescriptor, TypeName};
use crate::provider::TypeMetadataProvider;

/// One finder method rendered by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFinder {
    pub spec: FinderSpec,
    pub source: String,
}

/// Generated source for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    pub container: TypeName,
    /// Output name, derived from the container identity.
    pub name: String,
    /// Labels of the finders in this unit, in order.
    pub finders: Vec<String>,
    pub source: String,
}

/// Batches rendered finders by declaring container.
pub struct GroupingAssembler<'a, P: ?Sized, B: ?Sized> {
    provider: &'a P,
    backend: &'a B,
}

impl<'a, P, B> GroupingAssembler<'a, P, B>
where
    P: TypeMetadataProvider + ?Sized,
    B: SourceBackend + ?Sized,
{
    pub fn new(provider: &'a P, backend: &'a B) -> Self {
        GroupingAssembler { provider, backend }
    }

    /// Group `finders` and render one unit per distinct container.
    pub fn assemble(&self, finders: Vec<RenderedFinder>) -> Vec<GeneratedUnit> {
        let mut groups: Vec<(TypeName, Vec<RenderedFinder>)> = Vec::new();
        for finder in finders {
            match groups
                .iter_mut()
                .find(|(container, _)| *container == finder.spec.container)
            {
                Some((_, members)) => members.push(finder),
                None => groups.push((finder.spec.container.clone(), vec![finder])),
            }
        }

        groups
            .into_iter()
            .map(|(container, members)| self.render_group(container, members))
            .collect()
    }

    fn render_group(&self, container: TypeName, members: Vec<RenderedFinder>) -> GeneratedUnit {
        let fallback;
        let descriptor = match self.provider.descriptor(&container) {
            Some(descriptor) => descriptor,
            None => {
                tracing::warn!(container = %container, "container metadata missing, using defaults");
                fallback = TypeDescriptor::complex(container.clone());
                &fallback
            }
        };

        let finders = members.iter().map(|m| m.spec.label()).collect();
        let methods: Vec<String> = members.into_iter().map(|m| m.source).collect();
        GeneratedUnit {
            name: self.backend.unit_name(&container),
            source: self.backend.render_unit(descriptor, &methods),
            finders,
            container,
        }
    }
}
