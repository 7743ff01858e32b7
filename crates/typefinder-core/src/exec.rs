//! Runtime backend: runs a lowered finder body against a JSON instance graph.
//!
//! Objects are JSON objects (a missing member counts as absent), collections
//! are JSON arrays and everything else is a scalar. Results borrow from the
//! input, so a value reachable along two paths is returned twice.

use serde_json::Value;
use thiserror::Error;

use crate::emit::{ProcedureBody, Statement};
use crate::plan::AccessPath;

static NULL: Value = Value::Null;

/// Errors raised when an instance does not fit the shape the plan expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// A path starts from a name that is not bound.
    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },

    /// A member was read from a value that is not an object.
    #[error("'{path}' is not an object")]
    NotAnObject { path: String },

    /// A loop source is not an array.
    #[error("'{path}' is not a collection")]
    NotACollection { path: String },
}

/// Run `body` with its parameter bound to `root`.
///
/// # Errors
///
/// Returns an [`ExecError`] if the instance graph contradicts the plan's type
/// assumptions. Null or absent values never fail; they skip their subtree.
pub fn execute<'v>(body: &ProcedureBody, root: &'v Value) -> Result<Vec<&'v Value>, ExecError> {
    let mut interpreter = Interpreter {
        scopes: vec![(body.parameter.clone(), root)],
        results: Vec::new(),
    };
    interpreter.run(&body.statements)?;
    Ok(interpreter.results)
}

struct Interpreter<'v> {
    /// Bound names, innermost last.
    scopes: Vec<(String, &'v Value)>,
    results: Vec<&'v Value>,
}

impl<'v> Interpreter<'v> {
    fn run(&mut self, statements: &[Statement]) -> Result<(), ExecError> {
        for statement in statements {
            self.step(statement)?;
        }
        Ok(())
    }

    fn step(&mut self, statement: &Statement) -> Result<(), ExecError> {
        match statement {
            Statement::Collect { value } => {
                let found = self.resolve(value)?.unwrap_or(&NULL);
                self.results.push(found);
            }
            Statement::IfNotNull { subject, body } => {
                if self.resolve(subject)?.is_some_and(|v| !v.is_null()) {
                    self.run(body)?;
                }
            }
            Statement::ForEach {
                binding,
                source,
                body,
            } => {
                let elements = match self.resolve(source)? {
                    None | Some(Value::Null) => return Ok(()),
                    Some(Value::Array(elements)) => elements,
                    Some(_) => {
                        return Err(ExecError::NotACollection {
                            path: source.to_string(),
                        })
                    }
                };
                for element in elements {
                    self.scopes.push((binding.clone(), element));
                    let outcome = self.run(body);
                    self.scopes.pop();
                    outcome?;
                }
            }
        }
        Ok(())
    }

    /// Value at `path`, or `None` when a link is null or absent.
    fn resolve(&self, path: &AccessPath) -> Result<Option<&'v Value>, ExecError> {
        let mut current: &'v Value = self
            .scopes
            .iter()
            .rev()
            .find(|(name, _)| *name == path.root)
            .map(|(_, value)| *value)
            .ok_or_else(|| ExecError::UnboundVariable {
                name: path.root.clone(),
            })?;

        let mut walked = AccessPath::root(path.root.as_str());
        for member in &path.members {
            current = match current {
                Value::Null => return Ok(None),
                Value::Object(fields) => match fields.get(member) {
                    Some(value) => value,
                    None => return Ok(None),
                },
                _ => {
                    return Err(ExecError::NotAnObject {
                        path: walked.to_string(),
                    })
                }
            };
            walked = walked.child(member.as_str());
        }
        Ok(Some(current))
    }
}
