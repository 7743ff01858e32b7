use typefinder_core::backend::SourceBackend;
use typefinder_core::emit::ProcedureBody;
use typefinder_core::finder::FinderSpec;
use typefinder_core::model::{TypeDescriptor, TypeName};

use crate::config::CSharpConfig;
use crate::render::{render_method, render_unit};

/// [`SourceBackend`] producing C# partial classes.
#[derive(Debug, Clone, Default)]
pub struct CSharpBackend {
    config: CSharpConfig,
}

impl CSharpBackend {
    pub fn new(config: CSharpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CSharpConfig {
        &self.config
    }
}

impl SourceBackend for CSharpBackend {
    fn render_method(&self, spec: &FinderSpec, body: &ProcedureBody) -> String {
        render_method(&self.config, spec, body)
    }

    fn render_unit(&self, container: &TypeDescriptor, methods: &[String]) -> String {
        render_unit(&self.config, container, methods)
    }

    /// `<qualified container>.g.cs`
    fn unit_name(&self, container: &TypeName) -> String {
        format!("{}.g.cs", container)
    }
}
