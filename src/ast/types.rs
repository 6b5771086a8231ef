//! Type system definitions.
//!
//! This module defines two layers:
//!
//! - `TypeAnnotation`: what the parser reads after a `:`, still unresolved
//! - `Type`: the semantic type the checker resolves annotations and
//!   expressions to, including `any`, `void` and `never`
//!
//! Assignability between semantic types lives here as
//! [`Type::is_compatible_with`].

use std::fmt::Display;

use crate::Position;

/// A type written in source, resolved later by the type checker.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    Symbol(SymbolType),
    Object(ObjectTypeAnnotation),
}

impl TypeAnnotation {
    pub fn get_position(&self) -> Position {
        match self {
            TypeAnnotation::Symbol(symbol) => symbol.position.clone(),
            TypeAnnotation::Object(object) => object.position.clone(),
        }
    }
}

/// A named type reference such as `number` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolType {
    pub name: String,
    pub position: Position,
}

/// An object type literal such as `{ name: string; age: number }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeAnnotation {
    pub fields: Vec<(String, TypeAnnotation)>,
    pub position: Position,
}

/// Represents the different literal types in the language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literals {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Literal(Literals),
    /// Opts out of checking: assignable to and from everything but `never`
    Any,
    /// The result of a function that produces no usable value
    Void,
    /// The result of an expression that never completes normally
    Never,
    Object(ObjectType),
    Function(FunctionType),
}

/// Structural object type. `name` is only used for display (`Error`).
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: Option<String>,
    pub fields: Vec<(String, Type)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub name: String,
    /// Whether this function is provided by the runtime (`console.log`)
    pub is_native: bool,
    pub arguments: Vec<(String, Type)>,
    pub return_type: Box<Type>,
    /// The last argument repeats (`...args: any[]`)
    pub is_var_args: bool,
}

impl Type {
    pub fn number() -> Type {
        Type::Literal(Literals::Number)
    }

    pub fn string() -> Type {
        Type::Literal(Literals::String)
    }

    pub fn boolean() -> Type {
        Type::Literal(Literals::Boolean)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Type::Never)
    }

    /// Checks whether a value of this type may be stored where `other` is
    /// expected.
    pub fn is_compatible_with(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Never, _) => true,
            (_, Type::Never) => false,
            (_, Type::Any) | (Type::Any, _) => true,
            (Type::Literal(source), Type::Literal(target)) => source == target,
            (Type::Void, Type::Void) => true,
            (Type::Object(source), Type::Object(target)) => {
                target.fields.iter().all(|(name, target_field)| {
                    source
                        .get_field(name)
                        .is_some_and(|source_field| source_field.is_compatible_with(target_field))
                })
            }
            (Type::Function(source), Type::Function(target)) => source.is_compatible_with(target),
            _ => false,
        }
    }

    pub fn get_property_type(&self, property: &str) -> Option<Type> {
        match self {
            Type::Any => Some(Type::Any),
            Type::Literal(Literals::String) if property == "length" => Some(Type::number()),
            Type::Object(object) => object.get_field(property).cloned(),
            _ => None,
        }
    }
}

impl ObjectType {
    pub fn get_field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}

impl FunctionType {
    /// Fewer parameters are fine; each shared parameter must accept the
    /// target's argument and the return type must fit, with a `void`
    /// target discarding whatever is returned.
    fn is_compatible_with(&self, target: &FunctionType) -> bool {
        if self.arguments.len() > target.arguments.len() {
            return false;
        }

        let parameters_fit = self
            .arguments
            .iter()
            .zip(target.arguments.iter())
            .all(|((_, source), (_, target))| target.is_compatible_with(source));

        parameters_fit
            && (*target.return_type == Type::Void
                || self.return_type.is_compatible_with(&target.return_type))
    }

    /// Type of the `index`th argument of a call, honouring var-args.
    pub fn get_argument_type(&self, index: usize) -> Option<&Type> {
        match self.arguments.get(index) {
            Some((_, ty)) => Some(ty),
            None if self.is_var_args => self.arguments.last().map(|(_, ty)| ty),
            None => None,
        }
    }

    /// Number of arguments a call must supply.
    pub fn required_arguments(&self) -> usize {
        if self.is_var_args {
            self.arguments.len().saturating_sub(1)
        } else {
            self.arguments.len()
        }
    }
}

impl Display for Literals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literals::String => write!(f, "string"),
            Literals::Number => write!(f, "number"),
            Literals::Boolean => write!(f, "boolean"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Literal(literal) => write!(f, "{}", literal),
            Type::Any => write!(f, "any"),
            Type::Void => write!(f, "void"),
            Type::Never => write!(f, "never"),
            Type::Object(ObjectType { name: Some(name), .. }) => write!(f, "{}", name),
            Type::Object(ObjectType { fields, .. }) if fields.is_empty() => write!(f, "{{}}"),
            Type::Object(ObjectType { fields, .. }) => {
                let fields = fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .collect::<Vec<String>>()
                    .join("; ");
                write!(f, "{{ {} }}", fields)
            }
            Type::Function(function) => {
                let last = function.arguments.len().saturating_sub(1);
                let arguments = function
                    .arguments
                    .iter()
                    .enumerate()
                    .map(|(index, (name, ty))| {
                        if function.is_var_args && index == last {
                            format!("...{}: {}[]", name, ty)
                        } else {
                            format!("{}: {}", name, ty)
                        }
                    })
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "({}) => {}", arguments, function.return_type)
            }
        }
    }
}
