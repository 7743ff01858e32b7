//! Statement and unit rendering.

use typefinder_core::emit::{ProcedureBody, Statement};
use typefinder_core::finder::FinderSpec;
use typefinder_core::model::TypeDescriptor;

use crate::config::CSharpConfig;
use crate::signature::{container_declaration, method_declaration};
use crate::source::CSharpSourceBuilder;

/// Preferred name of the local collecting results inside a finder body.
pub const RESULT_LOCAL: &str = "instances";

/// Name for the result local that no parameter or loop variable shadows.
///
/// Falls back to `_instances`, `__instances`, ... on a clash.
pub fn result_local(body: &ProcedureBody) -> String {
    let bound = body.bound_names();
    let mut local = RESULT_LOCAL.to_string();
    while bound.contains(&local.as_str()) {
        local.insert(0, '_');
    }
    local
}

/// Render one complete method with zero base indentation.
pub fn render_method(config: &CSharpConfig, spec: &FinderSpec, body: &ProcedureBody) -> String {
    let local = result_local(body);
    let mut builder = CSharpSourceBuilder::new(config.indent.as_str());
    builder.push_line(&method_declaration(spec));
    builder.open_brace();
    builder.push_line(&format!("var {} = new List<{}>();", local, body.result_type));
    builder.push_line("");
    if !body.is_empty() {
        render_statements(&mut builder, &local, &body.statements);
        builder.push_line("");
    }
    builder.push_line(&format!("return {};", local));
    builder.close_brace();
    builder.build()
}

/// Render `statements`, appending matches to the local named `results`.
pub fn render_statements(builder: &mut CSharpSourceBuilder, results: &str, statements: &[Statement]) {
    for statement in statements {
        render_statement(builder, results, statement);
    }
}

fn render_statement(builder: &mut CSharpSourceBuilder, results: &str, statement: &Statement) {
    match statement {
        Statement::Collect { value } => {
            builder.push_line(&format!("{}.Add({});", results, value));
        }
        Statement::IfNotNull { subject, body } => {
            builder.push_line(&format!("if ({} != null)", subject));
            builder.open_brace();
            render_statements(builder, results, body);
            builder.close_brace();
        }
        Statement::ForEach {
            binding,
            source,
            body,
        } => {
            builder.push_line(&format!("foreach (var {} in {})", binding, source));
            builder.open_brace();
            render_statements(builder, results, body);
            builder.close_brace();
        }
    }
}

/// Render a full compilation unit: usings, namespace, container, methods.
///
/// Containers without a namespace are emitted at file scope.
pub fn render_unit(config: &CSharpConfig, container: &TypeDescriptor, methods: &[String]) -> String {
    let mut builder = CSharpSourceBuilder::new(config.indent.as_str());

    for using in &config.usings {
        builder.push_line(&format!("using {};", using));
    }
    if !config.usings.is_empty() {
        builder.push_line("");
    }

    let namespace = container.name.namespace();
    if let Some(namespace) = namespace {
        builder.push_line(&format!("namespace {}", namespace));
        builder.open_brace();
    }

    builder.push_line(&container_declaration(container));
    builder.open_brace();
    for (index, method) in methods.iter().enumerate() {
        if index > 0 {
            builder.push_line("");
        }
        builder.push_block(method);
    }
    builder.close_brace();

    if namespace.is_some() {
        builder.close_brace();
    }
    builder.build()
}
