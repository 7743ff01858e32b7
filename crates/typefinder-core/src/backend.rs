//! Source backend trait for pluggable output languages.
//!
//! A backend turns lowered finder bodies into source text. The core decides
//! *what* each finder does; the backend decides how it is spelled. Backends
//! must be deterministic: the same inputs always render the same bytes.

use crate::emit::ProcedureBody;
use crate::finder::FinderSpec;
use crate::model::{TypeDescriptor, TypeName};

/// Renders finder methods and their containers as source text.
pub trait SourceBackend {
    /// Render one complete method: declaration plus body.
    fn render_method(&self, spec: &FinderSpec, body: &ProcedureBody) -> String;

    /// Render a complete output unit wrapping `methods` in the container
    /// declaration.
    fn render_unit(&self, container: &TypeDescriptor, methods: &[String]) -> String;

    /// Deterministic output unit name for a container.
    fn unit_name(&self, container: &TypeName) -> String;
}
