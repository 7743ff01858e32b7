//! Marked methods and their validation into finder specs.
//!
//! A [`MarkedMethod`] is what the host (or a declarative registry) reports:
//! a method that asked for a generated body. [`FinderSpec::from_marked`]
//! checks the finder shape, one parameter and a result that is a collection of
//! exactly one named type, and resolves the root and target types against a
//! [`TypeMetadataProvider`].

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{FinderError, FinderResult};
use crate::model::{Accessibility, Modifier, TypeName};
use crate::provider::TypeMetadataProvider;
use crate::typeref::{canonicalize, parse_type_ref, TypeRef};

/// One declared parameter of a marked method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameter {
    pub name: String,
    /// Declared type, as written.
    #[serde(rename = "type")]
    pub ty: String,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        MethodParameter {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A method that requested a generated finder body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedMethod {
    /// Declaring container.
    pub container: TypeName,
    pub name: String,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
    /// Declared result type, as written (e.g. `IEnumerable<DateTime>`).
    pub return_type: String,
}

impl MarkedMethod {
    pub fn new(
        container: impl Into<TypeName>,
        name: impl Into<String>,
        return_type: impl Into<String>,
    ) -> Self {
        MarkedMethod {
            container: container.into(),
            name: name.into(),
            accessibility: Accessibility::Public,
            modifiers: Vec::new(),
            parameters: Vec::new(),
            return_type: return_type.into(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.parameters.push(MethodParameter::new(name, ty));
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    /// `Container.Method` label using the qualified container name.
    pub fn label(&self) -> String {
        format!("{}.{}", self.container, self.name)
    }

    /// Whether `label` names this method, qualified or by simple container name.
    pub fn matches_label(&self, label: &str) -> bool {
        label == self.label() || label == format!("{}.{}", self.container.simple_name(), self.name)
    }
}

/// A validated request for one generated finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderSpec {
    pub container: TypeName,
    pub method_name: String,
    pub accessibility: Accessibility,
    pub modifiers: Vec<Modifier>,
    /// Type the traversal starts from (the parameter's type).
    pub root: TypeName,
    /// Type the finder collects.
    pub target: TypeName,
    pub parameter_name: String,
    /// Parameter type as written in the declaration.
    pub parameter_type: String,
}

impl FinderSpec {
    /// Validate a marked method and resolve its types.
    ///
    /// # Errors
    ///
    /// - [`FinderError::ShapeMismatch`] if the method has other than one
    ///   parameter or its result is not a collection of one named type
    /// - [`FinderError::InvalidTypeRef`] if the parameter type cannot be parsed
    /// - [`FinderError::UnknownType`] if the container, root or target is unknown
    pub fn from_marked<P>(
        method: &MarkedMethod,
        provider: &P,
        config: &GeneratorConfig,
    ) -> FinderResult<FinderSpec>
    where
        P: TypeMetadataProvider + ?Sized,
    {
        let parameter = match method.parameters.as_slice() {
            [single] => single,
            params => {
                return Err(shape_mismatch(
                    method,
                    format!("expected exactly one parameter, found {}", params.len()),
                ))
            }
        };

        let target = result_element(method, config)?;

        let root = TypeName::new(canonicalize(&parameter.ty)?);
        provider.require(&root)?;
        provider.require(&target)?;
        provider.require(&method.container)?;

        Ok(FinderSpec {
            container: method.container.clone(),
            method_name: method.name.clone(),
            accessibility: method.accessibility,
            modifiers: method.modifiers.clone(),
            root,
            target,
            parameter_name: parameter.name.clone(),
            parameter_type: parameter.ty.trim().to_string(),
        })
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn label(&self) -> String {
        format!("{}.{}", self.container, self.method_name)
    }
}

/// Element type of a `Collection<Named>` result, or a shape mismatch.
fn result_element(method: &MarkedMethod, config: &GeneratorConfig) -> FinderResult<TypeName> {
    let parsed = parse_type_ref(&method.return_type).map_err(|_| {
        shape_mismatch(
            method,
            format!("result type '{}' cannot be parsed", method.return_type),
        )
    })?;

    let TypeRef::Named { name, args } = &parsed else {
        return Err(shape_mismatch(
            method,
            format!("result type '{}' is not a named generic collection", parsed),
        ));
    };
    if !config.is_collection_name(name) {
        return Err(shape_mismatch(
            method,
            format!("result type '{}' is not a collection", parsed),
        ));
    }

    match args.as_slice() {
        [element @ TypeRef::Named { .. }] => Ok(TypeName::new(element.to_string())),
        [other] => Err(shape_mismatch(
            method,
            format!("result element '{}' is not a named type", other),
        )),
        _ => Err(shape_mismatch(
            method,
            format!(
                "result type '{}' must have exactly one type argument",
                parsed
            ),
        )),
    }
}

fn shape_mismatch(method: &MarkedMethod, reason: String) -> FinderError {
    FinderError::ShapeMismatch {
        method: method.label(),
        reason,
    }
}
