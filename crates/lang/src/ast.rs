//! Abstract syntax trees for the AgeRun method language
//!
//! A method is a sequence of instructions, one per source line. Each
//! instruction is either an assignment into agent memory or a call to one
//! of the built-in functions; arguments and assignment right-hand sides
//! are expressions over literals and the three frame accessors
//! (`memory`, `context`, `message`).

use std::fmt;

/// Binary operators of the expression language.
///
/// `Equal` is the `=` operator: it compares and yields integer 1 or 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equal => "=",
        }
    }
}

/// Expression tree.
///
/// Accessor variants carry the dotted segments after their root keyword;
/// an empty segment list is the root itself (`message` is the whole
/// incoming message, `context` the whole context map).
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionAst {
    IntLiteral(i64),
    DoubleLiteral(f64),
    StringLiteral(String),
    MemoryAccess(Vec<String>),
    ContextAccess(Vec<String>),
    MessageAccess(Vec<String>),
    Binary {
        op: BinaryOp,
        left: Box<ExpressionAst>,
        right: Box<ExpressionAst>,
    },
}

impl ExpressionAst {
    /// True for the bare `context` accessor (no trailing segments).
    pub fn is_context_root(&self) -> bool {
        matches!(self, ExpressionAst::ContextAccess(segments) if segments.is_empty())
    }

    /// True for the bare `message` accessor (no trailing segments).
    pub fn is_message_root(&self) -> bool {
        matches!(self, ExpressionAst::MessageAccess(segments) if segments.is_empty())
    }
}

/// A dotted path under the `memory` root, the only legal assignment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPath {
    segments: Vec<String>,
}

impl MemoryPath {
    pub fn new(segments: Vec<String>) -> MemoryPath {
        MemoryPath { segments }
    }

    /// The key segments below the `memory` root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for MemoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory")?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// The built-in functions an instruction can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Send,
    If,
    Parse,
    Build,
    Compile,
    Spawn,
    Deprecate,
}

impl FunctionKind {
    pub fn from_name(name: &str) -> Option<FunctionKind> {
        match name {
            "send" => Some(FunctionKind::Send),
            "if" => Some(FunctionKind::If),
            "parse" => Some(FunctionKind::Parse),
            "build" => Some(FunctionKind::Build),
            "compile" => Some(FunctionKind::Compile),
            "spawn" => Some(FunctionKind::Spawn),
            "deprecate" => Some(FunctionKind::Deprecate),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Send => "send",
            FunctionKind::If => "if",
            FunctionKind::Parse => "parse",
            FunctionKind::Build => "build",
            FunctionKind::Compile => "compile",
            FunctionKind::Spawn => "spawn",
            FunctionKind::Deprecate => "deprecate",
        }
    }

    /// Required argument count.
    pub fn arity(&self) -> usize {
        match self {
            FunctionKind::Send => 2,
            FunctionKind::If => 3,
            FunctionKind::Parse => 2,
            FunctionKind::Build => 2,
            FunctionKind::Compile => 3,
            FunctionKind::Spawn => 3,
            FunctionKind::Deprecate => 2,
        }
    }
}

/// One parsed instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionAst {
    /// `memory.path := expr`
    Assignment {
        path: MemoryPath,
        /// Original right-hand-side text, kept for diagnostics.
        expr_text: String,
        expr: ExpressionAst,
    },
    /// `[memory.path :=] fn(arg, ...)`
    FunctionCall {
        kind: FunctionKind,
        /// Original argument texts, kept for diagnostics.
        args_text: Vec<String>,
        args: Vec<ExpressionAst>,
        /// Memory path receiving the call's returned value, when present.
        result_path: Option<MemoryPath>,
    },
}

/// A parsed method body: its instructions in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodAst {
    instructions: Vec<InstructionAst>,
}

impl MethodAst {
    pub fn new(instructions: Vec<InstructionAst>) -> MethodAst {
        MethodAst { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Fetch an instruction by 1-based position, the public convention.
    pub fn instruction(&self, position: usize) -> Option<&InstructionAst> {
        if position == 0 {
            return None;
        }
        self.instructions.get(position - 1)
    }

    pub fn instructions(&self) -> &[InstructionAst] {
        &self.instructions
    }
}
