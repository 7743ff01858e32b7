//! C# source backend for typefinder.
//!
//! Renders lowered finder bodies as C# methods and wraps them in `partial`
//! container declarations, one compilation unit per container.

pub mod backend;
pub mod config;
pub mod marker;
pub mod render;
pub mod signature;
pub mod source;

pub use backend::CSharpBackend;
pub use config::CSharpConfig;
pub use marker::marker_unit;
