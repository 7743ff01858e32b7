//! Core infrastructure for typefinder.
//!
//! This crate provides the language-agnostic pipeline:
//! - Type model and metadata provider trait
//! - Type reference parsing
//! - Marked method validation into finder specs
//! - Loop-variable allocation
//! - Traversal planning over the type graph
//! - Lowering plans to a statement tree
//! - A runtime interpreter for lowered bodies
//! - Source backend trait and per-container grouping
//! - The generation pipeline with cooperative cancellation

pub mod allocator;
pub mod backend;
pub mod config;
pub mod emit;
pub mod error;
pub mod exec;
pub mod finder;
pub mod generate;
pub mod group;
pub mod model;
pub mod plan;
pub mod provider;
pub mod typeref;
