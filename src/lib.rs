//! Typefinder: generates deep object-graph finder procedures.
//!
//! Given structural type metadata and a set of finder declarations, typefinder
//! plans how to reach every value of a target type from a root type and emits
//! one source unit per declaring container.

// Core infrastructure - re-exported from typefinder-core
pub use typefinder_core::allocator;
pub use typefinder_core::backend;
pub use typefinder_core::config;
pub use typefinder_core::emit;
pub use typefinder_core::exec;
pub use typefinder_core::finder;
pub use typefinder_core::generate;
pub use typefinder_core::group;
pub use typefinder_core::model;
pub use typefinder_core::plan;
pub use typefinder_core::provider;
pub use typefinder_core::typeref;

// Backends
pub use typefinder_csharp as csharp;

// Front door
pub mod error;
pub mod output;
pub mod registry;
