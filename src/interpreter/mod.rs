//! Tree-walking interpreter for the typed AST.
//!
//! This module executes programs that passed type checking. It handles:
//!
//! - JavaScript value semantics for numbers, strings, booleans and objects
//! - Lexical scopes, hoisted function declarations and closures
//! - The `console` global and its output formatting
//! - Uncaught `throw` and the configured loop and call depth limits

pub mod expr;
pub mod interpreter;
pub mod scope;
pub mod stmt;
pub mod value;

#[cfg(test)]
mod tests;
