//! Marker attribute consumers put on methods that want a generated body.

use typefinder_core::group::GeneratedUnit;
use typefinder_core::model::TypeName;

use crate::config::CSharpConfig;
use crate::source::CSharpSourceBuilder;

pub const MARKER_NAMESPACE: &str = "Typefinder";
pub const MARKER_ATTRIBUTE: &str = "FinderGeneratorAttribute";

/// Qualified name of the marker attribute.
pub fn marker_type_name() -> TypeName {
    TypeName::new(format!("{}.{}", MARKER_NAMESPACE, MARKER_ATTRIBUTE))
}

/// Source of the marker attribute, compiled alongside generated units.
pub fn marker_source(config: &CSharpConfig) -> String {
    let mut builder = CSharpSourceBuilder::new(config.indent.as_str());
    builder.push_line("using System;");
    builder.push_line("");
    builder.push_line(&format!("namespace {}", MARKER_NAMESPACE));
    builder.open_brace();
    builder.push_line(
        "[AttributeUsage(AttributeTargets.Method, Inherited = false, AllowMultiple = false)]",
    );
    builder.push_line(&format!("public sealed class {} : Attribute", MARKER_ATTRIBUTE));
    builder.open_brace();
    builder.close_brace();
    builder.close_brace();
    builder.build()
}

/// The marker as a standalone unit.
pub fn marker_unit(config: &CSharpConfig) -> GeneratedUnit {
    GeneratedUnit {
        container: marker_type_name(),
        name: format!("{}.g.cs", MARKER_ATTRIBUTE),
        finders: Vec::new(),
        source: marker_source(config),
    }
}
