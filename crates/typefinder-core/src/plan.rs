//! Traversal planner: which property paths can reach the target type.
//!
//! [`PathPlanner::plan`] walks the type graph from a root type and produces a
//! [`TraversalPlan`]: a tree of [`TraversalStep`]s describing where to collect
//! values, where to loop over collections and where to descend into
//! properties. Branches that cannot reach the target are dropped entirely.
//!
//! # Rules
//!
//! - **Collection**: take a loop variable, plan the element type from that
//!   variable, release the variable. A non-empty child plan becomes one
//!   [`TraversalStep::Iterate`].
//! - **Match**: the current type is the target, or the target is an
//!   interface the current type implements (transitively).
//! - **Descend**: for non-leaf types, plan every property whose type differs
//!   from the current type, in declaration order. Non-empty results are
//!   wrapped in a single [`TraversalStep::Descend`].
//!
//! # Cycles
//!
//! A property typed as its own declaring type is skipped silently. Longer
//! cycles are caught by a stack of the types on the active path and handled
//! per [`CyclePolicy`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::allocator::VariableAllocator;
use crate::config::{CyclePolicy, GeneratorConfig};
use crate::error::{FinderError, FinderResult};
use crate::finder::FinderSpec;
use crate::model::{TypeDescriptor, TypeKind, TypeName};
use crate::provider::{implements, TypeMetadataProvider};

// ============================================================================
// Access Paths
// ============================================================================

/// A member-access path from a bound name (`parent.Child.Dates`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessPath {
    /// Parameter or loop variable the path starts from.
    pub root: String,
    /// Property names, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl AccessPath {
    pub fn root(name: impl Into<String>) -> Self {
        AccessPath {
            root: name.into(),
            members: Vec::new(),
        }
    }

    /// Path extended by one property access.
    pub fn child(&self, member: impl Into<String>) -> Self {
        let mut members = self.members.clone();
        members.push(member.into());
        AccessPath {
            root: self.root.clone(),
            members,
        }
    }

    pub fn is_root(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for member in &self.members {
            write!(f, ".{}", member)?;
        }
        Ok(())
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// One node of a traversal plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraversalStep {
    /// Collect the value at `path`.
    Match { path: AccessPath },
    /// If `path` is present, bind `var` to each element and run `body`.
    Iterate {
        path: AccessPath,
        var: String,
        body: Vec<TraversalStep>,
    },
    /// If `path` is present, run `children`.
    Descend {
        path: AccessPath,
        children: Vec<TraversalStep>,
    },
}

impl TraversalStep {
    pub fn path(&self) -> &AccessPath {
        match self {
            TraversalStep::Match { path }
            | TraversalStep::Iterate { path, .. }
            | TraversalStep::Descend { path, .. } => path,
        }
    }

    /// Number of `Match` steps in this subtree.
    pub fn match_count(&self) -> usize {
        match self {
            TraversalStep::Match { .. } => 1,
            TraversalStep::Iterate { body, .. } => body.iter().map(Self::match_count).sum(),
            TraversalStep::Descend { children, .. } => {
                children.iter().map(Self::match_count).sum()
            }
        }
    }
}

/// Ordered sibling steps rooted at the finder's parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPlan {
    /// Parameter the plan is rooted at.
    pub parameter: String,
    pub root: TypeName,
    pub target: TypeName,
    pub steps: Vec<TraversalStep>,
}

impl TraversalPlan {
    /// True when the target is unreachable from the root.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn match_count(&self) -> usize {
        self.steps.iter().map(TraversalStep::match_count).sum()
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Recursive planner over a metadata provider.
///
/// Holds the target and the stack of types on the active path. The loop
/// variable pool is passed into each call rather than owned.
pub struct PathPlanner<'a, P: TypeMetadataProvider + ?Sized> {
    provider: &'a P,
    target: &'a TypeDescriptor,
    cycle_policy: CyclePolicy,
    active: Vec<TypeName>,
}

impl<'a, P: TypeMetadataProvider + ?Sized> PathPlanner<'a, P> {
    pub fn new(provider: &'a P, target: &'a TypeDescriptor, cycle_policy: CyclePolicy) -> Self {
        PathPlanner {
            provider,
            target,
            cycle_policy,
            active: Vec::new(),
        }
    }

    /// Plan from `path`, typed `current`, toward the target.
    ///
    /// # Errors
    ///
    /// - [`FinderError::AllocatorExhausted`] if collections nest deeper than the pool
    /// - [`FinderError::CycleDetected`] under [`CyclePolicy::Reject`]
    /// - [`FinderError::UnknownType`] if a reachable type is missing from the provider
    pub fn plan(
        &mut self,
        path: &AccessPath,
        current: &TypeName,
        alloc: &mut VariableAllocator,
    ) -> FinderResult<Vec<TraversalStep>> {
        let provider: &'a P = self.provider;
        let descriptor = provider.require(current)?;

        if !descriptor.is_leaf() && self.active.contains(current) {
            return match self.cycle_policy {
                CyclePolicy::Reject => Err(FinderError::CycleDetected {
                    ty: current.clone(),
                    path: path.to_string(),
                }),
                CyclePolicy::Prune => {
                    tracing::debug!(ty = %current, path = %path, "pruned cyclic branch");
                    Ok(Vec::new())
                }
            };
        }

        if descriptor.is_leaf() {
            return Ok(self.match_step(path, descriptor).into_iter().collect());
        }

        self.active.push(current.clone());
        let steps = match descriptor.element_type() {
            Some(element) => self.plan_collection(path, element, alloc),
            None => self.plan_members(path, descriptor, alloc),
        };
        self.active.pop();
        steps
    }

    fn plan_collection(
        &mut self,
        path: &AccessPath,
        element: &TypeName,
        alloc: &mut VariableAllocator,
    ) -> FinderResult<Vec<TraversalStep>> {
        let var = alloc.take()?;
        let body = self.plan(&AccessPath::root(var.clone()), element, alloc)?;
        alloc.release(var.clone());

        if body.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![TraversalStep::Iterate {
            path: path.clone(),
            var,
            body,
        }])
    }

    fn plan_members(
        &mut self,
        path: &AccessPath,
        descriptor: &TypeDescriptor,
        alloc: &mut VariableAllocator,
    ) -> FinderResult<Vec<TraversalStep>> {
        let mut steps: Vec<TraversalStep> = self.match_step(path, descriptor).into_iter().collect();

        let mut children = Vec::new();
        for property in &descriptor.properties {
            if property.ty == descriptor.name {
                continue;
            }
            let child = self.plan(&path.child(property.name.as_str()), &property.ty, alloc)?;
            children.extend(child);
        }

        if !children.is_empty() {
            steps.push(TraversalStep::Descend {
                path: path.clone(),
                children,
            });
        }
        Ok(steps)
    }

    fn match_step(&self, path: &AccessPath, current: &TypeDescriptor) -> Option<TraversalStep> {
        self.is_match(current).then(|| TraversalStep::Match { path: path.clone() })
    }

    fn is_match(&self, current: &TypeDescriptor) -> bool {
        if current.name == self.target.name {
            return true;
        }
        self.target.kind == TypeKind::Interface
            && implements(self.provider, current, &self.target.name)
    }
}

/// Plan a validated finder with a fresh allocator from `config`.
///
/// The finder's parameter name is reserved so no loop variable shadows it.
pub fn plan_finder<P>(
    spec: &FinderSpec,
    provider: &P,
    config: &GeneratorConfig,
) -> FinderResult<TraversalPlan>
where
    P: TypeMetadataProvider + ?Sized,
{
    let target = provider.require(&spec.target)?;
    let mut alloc = VariableAllocator::new(config.variable_names.iter().cloned());
    alloc.reserve(&spec.parameter_name);

    let mut planner = PathPlanner::new(provider, target, config.cycle_policy);
    let steps = planner.plan(&AccessPath::root(spec.parameter_name.as_str()), &spec.root, &mut alloc)?;
    debug_assert_eq!(alloc.live(), 0, "loop variables leaked from planning");

    Ok(TraversalPlan {
        parameter: spec.parameter_name.clone(),
        root: spec.root.clone(),
        target: spec.target.clone(),
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TypeRegistry;

    fn family_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDescriptor::leaf("int"));
        registry.insert(TypeDescriptor::leaf("string"));
        registry.insert(TypeDescriptor::leaf("DateTime"));
        registry.insert(
            TypeDescriptor::complex("Child")
                .with_property("Id", "int")
                .with_property("Name", "string")
                .with_property("Date", "DateTime"),
        );
        registry.insert(TypeDescriptor::collection("IEnumerable<Child>", "Child"));
        registry.insert(
            TypeDescriptor::complex("Parent")
                .with_property("Id", "int")
                .with_property("Name", "string")
                .with_property("Date", "DateTime")
                .with_property("Children", "IEnumerable<Child>"),
        );
        registry
    }

    fn plan_in(
        registry: &TypeRegistry,
        root: &str,
        target: &str,
        policy: CyclePolicy,
    ) -> FinderResult<Vec<TraversalStep>> {
        let target = registry.descriptor(&TypeName::new(target)).unwrap();
        let mut alloc = VariableAllocator::new(["a", "b", "c"]);
        let mut planner = PathPlanner::new(registry, target, policy);
        let steps = planner.plan(&AccessPath::root("root"), &TypeName::new(root), &mut alloc)?;
        assert_eq!(alloc.live(), 0);
        Ok(steps)
    }

    fn matched(path: &str) -> TraversalStep {
        let mut parts = path.split('.');
        let mut access = AccessPath::root(parts.next().unwrap());
        for part in parts {
            access = access.child(part);
        }
        TraversalStep::Match { path: access }
    }

    mod access_path_tests {
        use super::*;

        #[test]
        fn displays_dotted() {
            let path = AccessPath::root("parent").child("Child").child("Date");
            assert_eq!(path.to_string(), "parent.Child.Date");
            assert!(!path.is_root());
            assert!(AccessPath::root("a").is_root());
        }
    }

    mod planning_tests {
        use super::*;

        #[test]
        fn parent_children_dates() {
            let registry = family_registry();
            let steps = plan_in(&registry, "Parent", "DateTime", CyclePolicy::Reject).unwrap();

            let expected = vec![TraversalStep::Descend {
                path: AccessPath::root("root"),
                children: vec![
                    matched("root.Date"),
                    TraversalStep::Iterate {
                        path: AccessPath::root("root").child("Children"),
                        var: "a".to_string(),
                        body: vec![TraversalStep::Descend {
                            path: AccessPath::root("a"),
                            children: vec![matched("a.Date")],
                        }],
                    },
                ],
            }];
            assert_eq!(steps, expected);
        }

        #[test]
        fn root_matching_target_precedes_descend() {
            let registry = family_registry();
            let steps = plan_in(&registry, "Child", "Child", CyclePolicy::Reject).unwrap();
            assert_eq!(steps, vec![matched("root")]);
        }

        #[test]
        fn unreachable_target_plans_nothing() {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::complex("Unrelated"));
            let steps = plan_in(&registry, "Parent", "Unrelated", CyclePolicy::Reject).unwrap();
            assert!(steps.is_empty());
        }

        #[test]
        fn leaf_root_matches_itself_only() {
            let registry = family_registry();
            let steps = plan_in(&registry, "int", "int", CyclePolicy::Reject).unwrap();
            assert_eq!(steps, vec![matched("root")]);
            let steps = plan_in(&registry, "int", "DateTime", CyclePolicy::Reject).unwrap();
            assert!(steps.is_empty());
        }

        #[test]
        fn sibling_collections_get_distinct_names() {
            let mut registry = family_registry();
            registry.insert(
                TypeDescriptor::complex("Family")
                    .with_property("Older", "IEnumerable<Child>")
                    .with_property("Younger", "IEnumerable<Child>"),
            );
            let steps = plan_in(&registry, "Family", "DateTime", CyclePolicy::Reject).unwrap();
            let TraversalStep::Descend { children, .. } = &steps[0] else {
                panic!("Expected Descend variant");
            };
            let vars: Vec<_> = children
                .iter()
                .map(|step| match step {
                    TraversalStep::Iterate { var, .. } => var.as_str(),
                    _ => panic!("Expected Iterate variant"),
                })
                .collect();
            assert_eq!(vars, vec!["a", "b"]);
        }

        #[test]
        fn nested_collections_use_nested_names() {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::collection("List<IEnumerable<Child>>", "IEnumerable<Child>"));
            let steps =
                plan_in(&registry, "List<IEnumerable<Child>>", "DateTime", CyclePolicy::Reject)
                    .unwrap();
            let TraversalStep::Iterate { var, body, .. } = &steps[0] else {
                panic!("Expected Iterate variant");
            };
            assert_eq!(var, "a");
            let TraversalStep::Iterate { var, path, .. } = &body[0] else {
                panic!("Expected Iterate variant");
            };
            assert_eq!(var, "b");
            assert_eq!(path, &AccessPath::root("a"));
        }

        #[test]
        fn deep_nesting_exhausts_pool() {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::collection("L1", "IEnumerable<Child>"));
            registry.insert(TypeDescriptor::collection("L2", "L1"));
            registry.insert(TypeDescriptor::collection("L3", "L2"));
            let err = plan_in(&registry, "L3", "DateTime", CyclePolicy::Reject).unwrap_err();
            assert_eq!(err, FinderError::AllocatorExhausted { capacity: 3 });
        }

        #[test]
        fn empty_collection_branch_is_dropped() {
            let registry = family_registry();
            let steps = plan_in(&registry, "IEnumerable<Child>", "Parent", CyclePolicy::Reject).unwrap();
            assert!(steps.is_empty());
        }

        #[test]
        fn interface_target_matches_implementors() {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::interface("IContract"));
            registry.insert(TypeDescriptor::complex("Contract").with_interface("IContract"));
            registry.insert(TypeDescriptor::collection("List<Contract>", "Contract"));
            registry.insert(
                TypeDescriptor::complex("Deal")
                    .with_property("Main", "Contract")
                    .with_property("Others", "List<Contract>"),
            );
            let steps = plan_in(&registry, "Deal", "IContract", CyclePolicy::Reject).unwrap();
            assert_eq!(
                steps,
                vec![TraversalStep::Descend {
                    path: AccessPath::root("root"),
                    children: vec![
                        matched("root.Main"),
                        TraversalStep::Iterate {
                            path: AccessPath::root("root").child("Others"),
                            var: "a".to_string(),
                            body: vec![matched("a")],
                        },
                    ],
                }]
            );
        }

        #[test]
        fn non_interface_target_ignores_implementations() {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::complex("Base"));
            registry.insert(TypeDescriptor::complex("Derived").with_interface("Base"));
            let steps = plan_in(&registry, "Derived", "Base", CyclePolicy::Reject).unwrap();
            assert!(steps.is_empty());
        }
    }

    mod cycle_tests {
        use super::*;

        fn cyclic_registry() -> TypeRegistry {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::leaf("int"));
            registry.insert(
                TypeDescriptor::complex("A")
                    .with_property("Id", "int")
                    .with_property("B", "B"),
            );
            registry.insert(
                TypeDescriptor::complex("B")
                    .with_property("Id", "int")
                    .with_property("A", "A"),
            );
            registry
        }

        #[test]
        fn direct_self_reference_is_skipped() {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::leaf("int"));
            registry.insert(
                TypeDescriptor::complex("Node")
                    .with_property("Id", "int")
                    .with_property("Parent", "Node"),
            );
            let steps = plan_in(&registry, "Node", "int", CyclePolicy::Reject).unwrap();
            assert_eq!(
                steps,
                vec![TraversalStep::Descend {
                    path: AccessPath::root("root"),
                    children: vec![matched("root.Id")],
                }]
            );
        }

        #[test]
        fn indirect_cycle_is_rejected() {
            let registry = cyclic_registry();
            let err = plan_in(&registry, "A", "int", CyclePolicy::Reject).unwrap_err();
            assert_eq!(
                err,
                FinderError::CycleDetected {
                    ty: TypeName::new("A"),
                    path: "root.B.A".to_string(),
                }
            );
        }

        #[test]
        fn indirect_cycle_is_pruned() {
            let registry = cyclic_registry();
            let steps = plan_in(&registry, "A", "int", CyclePolicy::Prune).unwrap();
            assert_eq!(
                steps,
                vec![TraversalStep::Descend {
                    path: AccessPath::root("root"),
                    children: vec![
                        matched("root.Id"),
                        TraversalStep::Descend {
                            path: AccessPath::root("root").child("B"),
                            children: vec![matched("root.B.Id")],
                        },
                    ],
                }]
            );
        }

        #[test]
        fn recursive_collection_is_a_cycle() {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::leaf("int"));
            registry.insert(TypeDescriptor::collection("List<Node>", "Node"));
            registry.insert(
                TypeDescriptor::complex("Node")
                    .with_property("Id", "int")
                    .with_property("Children", "List<Node>"),
            );
            let err = plan_in(&registry, "Node", "int", CyclePolicy::Reject).unwrap_err();
            assert_eq!(err.code(), "cycle_detected");
        }

        #[test]
        fn repeated_type_on_sibling_branches_is_not_a_cycle() {
            let mut registry = TypeRegistry::new();
            registry.insert(TypeDescriptor::leaf("int"));
            registry.insert(TypeDescriptor::complex("Money").with_property("Cents", "int"));
            registry.insert(
                TypeDescriptor::complex("Invoice")
                    .with_property("Net", "Money")
                    .with_property("Gross", "Money"),
            );
            let steps = plan_in(&registry, "Invoice", "int", CyclePolicy::Reject).unwrap();
            assert_eq!(steps[0].match_count(), 2);
        }
    }

    mod plan_finder_tests {
        use super::*;
        use crate::finder::MarkedMethod;
        use crate::model::Modifier;

        #[test]
        fn parameter_name_is_reserved() {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::complex("Finder").with_modifier(Modifier::Static));
            let method = MarkedMethod::new("Finder", "Find", "IEnumerable<DateTime>")
                .with_parameter("a", "IEnumerable<Child>");
            let config = GeneratorConfig::default();
            let spec = FinderSpec::from_marked(&method, &registry, &config).unwrap();
            let plan = plan_finder(&spec, &registry, &config).unwrap();

            let TraversalStep::Iterate { path, var, .. } = &plan.steps[0] else {
                panic!("Expected Iterate variant");
            };
            assert_eq!(path, &AccessPath::root("a"));
            assert_eq!(var, "b");
            assert_eq!(plan.match_count(), 1);
        }

        fn nested_int_lists() -> (TypeRegistry, FinderSpec) {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::collection("List<int>", "int"));
            registry.insert(TypeDescriptor::collection("List<List<int>>", "List<int>"));
            registry.insert(TypeDescriptor::complex("Finder"));
            let method = MarkedMethod::new("Finder", "Find", "IEnumerable<int>")
                .with_parameter("root", "List<List<int>>");
            let spec =
                FinderSpec::from_marked(&method, &registry, &GeneratorConfig::default()).unwrap();
            (registry, spec)
        }

        #[test]
        fn repeated_pool_names_never_nest_under_one_name() {
            let (registry, spec) = nested_int_lists();
            let config = GeneratorConfig::default().with_variable_names(["a", "a", "b"]);
            let plan = plan_finder(&spec, &registry, &config).unwrap();

            let TraversalStep::Iterate { var: outer, body, .. } = &plan.steps[0] else {
                panic!("Expected Iterate variant");
            };
            let TraversalStep::Iterate { var: inner, .. } = &body[0] else {
                panic!("Expected Iterate variant");
            };
            assert_eq!(outer, "a");
            assert_eq!(inner, "b");
        }

        #[test]
        fn repeated_pool_names_count_once_toward_capacity() {
            let (registry, spec) = nested_int_lists();
            let config = GeneratorConfig::default().with_variable_names(["a", "a"]);
            assert_eq!(
                plan_finder(&spec, &registry, &config).unwrap_err(),
                FinderError::AllocatorExhausted { capacity: 1 }
            );
        }

        #[test]
        fn planning_is_idempotent() {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::complex("Finder"));
            let method = MarkedMethod::new("Finder", "Find", "IEnumerable<DateTime>")
                .with_parameter("parent", "Parent");
            let config = GeneratorConfig::default();
            let spec = FinderSpec::from_marked(&method, &registry, &config).unwrap();
            let first = plan_finder(&spec, &registry, &config).unwrap();
            let second = plan_finder(&spec, &registry, &config).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn plan_serializes_with_step_tags() {
            let mut registry = family_registry();
            registry.insert(TypeDescriptor::complex("Finder"));
            let method = MarkedMethod::new("Finder", "Find", "IEnumerable<Child>")
                .with_parameter("child", "Child");
            let config = GeneratorConfig::default();
            let spec = FinderSpec::from_marked(&method, &registry, &config).unwrap();
            let plan = plan_finder(&spec, &registry, &config).unwrap();
            let json = serde_json::to_value(&plan).unwrap();
            assert_eq!(json["steps"][0]["step"], "match");
            assert_eq!(json["steps"][0]["path"]["root"], "child");
        }
    }
}
