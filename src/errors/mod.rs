//! Error types and error handling for the front end and interpreter.
//!
//! This module defines the error types used throughout the pipeline:
//!
//! - Error structures with source position information
//! - Specific error variants for lexing, parsing, type checking and execution
//! - Helpful error names and suggestions for diagnostics

pub mod errors;
