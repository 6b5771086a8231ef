//! Type checking and semantic analysis module.
//!
//! This module performs type checking and semantic analysis on the AST.
//! It transforms the untyped AST into a typed AST while:
//!
//! - Resolving type annotations and inferring the types of unannotated bindings
//! - Checking assignments, calls and operators for assignability
//! - Enforcing the `void` and `never` return rules of functions
//! - Tracking reachability through `return`, `throw`, `break` and endless loops
//! - Managing scopes and hoisted function declarations
//!
//! The type checker maintains an environment stack to handle nested scopes.

pub mod type_checker;
pub mod typed_ast;

#[cfg(test)]
mod tests;
