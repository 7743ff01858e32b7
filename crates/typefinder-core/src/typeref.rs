//! Type reference parser.
//!
//! Registries and marked methods spell types as text (`List<Child>`,
//! `int[]`, `IEnumerable<Acme.Contract>`). This module parses that text into a
//! [`TypeRef`] so collection shapes can be recognized structurally.
//!
//! ## Grammar
//!
//! ```text
//! <ref>   := <ident> ["<" <ref> ("," <ref>)* ">"] ("[" "]")*
//! <ident> := [A-Za-z_][A-Za-z0-9_.]*
//! ```
//!
//! Whitespace is allowed around every token.

use std::fmt;

use winnow::ascii::multispace0;
use winnow::combinator::{delimited, opt, repeat, separated};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};
use winnow::ModalResult;

use crate::config::GeneratorConfig;
use crate::error::{FinderError, FinderResult};

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A named type with optional generic arguments.
    Named { name: String, args: Vec<TypeRef> },
    /// Single-dimension array of the inner type.
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Element type if this reference spells a single-element collection.
    pub fn collection_element(&self, config: &GeneratorConfig) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(inner) => Some(inner),
            TypeRef::Named { name, args } if args.len() == 1 && config.is_collection_name(name) => {
                args.first()
            }
            TypeRef::Named { .. } => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// Parse a type reference.
///
/// # Errors
///
/// Returns [`FinderError::InvalidTypeRef`] for empty or malformed input.
pub fn parse_type_ref(input: &str) -> FinderResult<TypeRef> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FinderError::InvalidTypeRef {
            input: input.to_string(),
            message: "empty type reference".to_string(),
        });
    }

    parse_ref
        .parse(trimmed)
        .map_err(|e| FinderError::InvalidTypeRef {
            input: input.to_string(),
            message: format!("{:?}", e),
        })
}

/// Canonical spelling of a type reference (`List<Child>`, `int[]`).
pub fn canonicalize(input: &str) -> FinderResult<String> {
    parse_type_ref(input).map(|r| r.to_string())
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

fn parse_ref(input: &mut &str) -> ModalResult<TypeRef> {
    let _ = multispace0.parse_next(input)?;
    let name = parse_ident(input)?;

    let args: Option<Vec<TypeRef>> = opt(delimited(
        (multispace0, '<'),
        separated(1.., parse_ref, (multispace0, ',')),
        (multispace0, '>'),
    ))
    .parse_next(input)?;

    let ranks: usize = repeat(0.., (multispace0, '[', multispace0, ']')).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    let mut ty = TypeRef::Named {
        name: name.to_string(),
        args: args.unwrap_or_default(),
    };
    for _ in 0..ranks {
        ty = TypeRef::Array(Box::new(ty));
    }
    Ok(ty)
}

fn parse_ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '.'),
    )
        .take()
        .parse_next(input)
}
