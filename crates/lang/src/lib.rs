//! AgeRun method language: grammars and ASTs
//!
//! The method language is deliberately small: one instruction per line,
//! expressions over three frame accessors, seven built-in functions. This
//! crate owns the syntax side - ASTs and parsers; evaluation lives in the
//! runtime crate.

pub mod ast;
pub mod expression_parser;
pub mod instruction_parser;

// Re-export key types
pub use ast::{
    BinaryOp, ExpressionAst, FunctionKind, InstructionAst, MemoryPath, MethodAst,
};
pub use expression_parser::parse_expression;
pub use instruction_parser::{parse_instruction, parse_method_source};
