//! Traversal emitter: lowers a plan into an imperative statement tree.
//!
//! The statement tree is the seam between planning and rendering. Backends
//! turn it into source text; the interpreter in [`crate::exec`] runs it
//! directly.
//!
//! | Plan step | Statements |
//! |-----------|------------|
//! | `Match(p)` | `Collect(p)` |
//! | `Iterate(p, v, body)` | `IfNotNull(p, [ForEach(v, p, body)])` |
//! | `Descend(p, children)` | `IfNotNull(p, children)` |

use serde::{Deserialize, Serialize};

use crate::model::TypeName;
use crate::plan::{AccessPath, TraversalPlan, TraversalStep};

/// One imperative statement of a finder body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    /// Append the value at `value` to the result collection.
    Collect { value: AccessPath },
    /// Run `body` only when `subject` is present.
    IfNotNull {
        subject: AccessPath,
        body: Vec<Statement>,
    },
    /// Run `body` once per element of `source`, bound to `binding`.
    ForEach {
        binding: String,
        source: AccessPath,
        body: Vec<Statement>,
    },
}

/// Lowered body of one finder procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureBody {
    /// Name the root value is bound to.
    pub parameter: String,
    /// Element type of the result collection.
    pub result_type: TypeName,
    pub statements: Vec<Statement>,
}

impl ProcedureBody {
    /// True when the body collects nothing.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every identifier the body binds: the parameter, then loop variables
    /// in first-appearance order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = vec![self.parameter.as_str()];
        collect_bindings(&self.statements, &mut names);
        names
    }
}

fn collect_bindings<'a>(statements: &'a [Statement], names: &mut Vec<&'a str>) {
    for statement in statements {
        match statement {
            Statement::Collect { .. } => {}
            Statement::IfNotNull { body, .. } => collect_bindings(body, names),
            Statement::ForEach { binding, body, .. } => {
                if !names.contains(&binding.as_str()) {
                    names.push(binding.as_str());
                }
                collect_bindings(body, names);
            }
        }
    }
}

/// Lower a plan into a procedure body, preserving order and nesting.
pub fn lower_plan(plan: &TraversalPlan) -> ProcedureBody {
    ProcedureBody {
        parameter: plan.parameter.clone(),
        result_type: plan.target.clone(),
        statements: lower_steps(&plan.steps),
    }
}

/// Lower a sequence of sibling steps.
pub fn lower_steps(steps: &[TraversalStep]) -> Vec<Statement> {
    steps.iter().map(lower_step).collect()
}

fn lower_step(step: &TraversalStep) -> Statement {
    match step {
        TraversalStep::Match { path } => Statement::Collect {
            value: path.clone(),
        },
        TraversalStep::Iterate { path, var, body } => Statement::IfNotNull {
            subject: path.clone(),
            body: vec![Statement::ForEach {
                binding: var.clone(),
                source: path.clone(),
                body: lower_steps(body),
            }],
        },
        TraversalStep::Descend { path, children } => Statement::IfNotNull {
            subject: path.clone(),
            body: lower_steps(children),
        },
    }
}
