/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The `Stmt` and `Expr` node enums
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
/// - types: Type annotations and the semantic type model
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
