//! Method and container declarations.
//!
//! | Declaration | Shape |
//! |-------------|-------|
//! | method | `<access>[ static][ partial] IEnumerable<T> Name(ParamType param)` |
//! | container | `<access>[ static][ sealed][ abstract] partial class Name` |
//!
//! Containers are always rendered `partial` so the generated half merges with
//! the hand-written declaration.

use typefinder_core::finder::FinderSpec;
use typefinder_core::model::{Accessibility, Modifier, TypeDescriptor};

/// C# keyword(s) for an accessibility, empty for `NotApplicable`.
pub fn accessibility_keyword(accessibility: Accessibility) -> &'static str {
    match accessibility {
        Accessibility::Public => "public",
        Accessibility::Internal => "internal",
        Accessibility::Protected => "protected",
        Accessibility::ProtectedInternal => "protected internal",
        Accessibility::PrivateProtected => "private protected",
        Accessibility::Private => "private",
        Accessibility::NotApplicable => "",
    }
}

pub fn method_declaration(spec: &FinderSpec) -> String {
    let mut parts = vec![accessibility_keyword(spec.accessibility).to_string()];
    if spec.has_modifier(Modifier::Static) {
        parts.push("static".to_string());
    }
    if spec.has_modifier(Modifier::Partial) {
        parts.push("partial".to_string());
    }
    parts.push(format!("IEnumerable<{}>", spec.target));
    parts.push(format!(
        "{}({} {})",
        spec.method_name, spec.parameter_type, spec.parameter_name
    ));
    join_words(&parts)
}

pub fn container_declaration(container: &TypeDescriptor) -> String {
    let mut parts = vec![accessibility_keyword(container.accessibility).to_string()];
    for (modifier, keyword) in [
        (Modifier::Static, "static"),
        (Modifier::Sealed, "sealed"),
        (Modifier::Abstract, "abstract"),
    ] {
        if container.has_modifier(modifier) {
            parts.push(keyword.to_string());
        }
    }
    parts.push("partial class".to_string());
    parts.push(container.name.simple_name().to_string());
    join_words(&parts)
}

fn join_words(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
