//! AgeRun runtime: agents, methods, and the message loop
//!
//! Key design principles:
//! - Agents own their memory and inbox; methods are shared and immutable
//! - One message in flight at a time: single-threaded, cooperative
//! - Every runtime error is recovered at the instruction boundary and
//!   recorded on the log; nothing propagates into the host
//! - The catalog and the agent population persist as plain text files

pub mod agency;
pub mod agent;
pub mod agent_registry;
pub mod agent_store;
pub mod config;
pub mod evaluator;
pub mod expression_evaluator;
pub mod frame;
pub mod interpreter;
pub mod method;
pub mod method_registry;
pub mod method_resolver;
pub mod method_store;
pub mod methodology;
pub mod persist;
pub mod system;

// Re-export key types
pub use agency::Agency;
pub use agent::{Agent, AgentId, SLEEP_MESSAGE, WAKE_MESSAGE};
pub use agent_registry::AgentRegistry;
pub use agent_store::{AgentStore, StoredValue};
pub use config::RuntimeConfig;
pub use evaluator::InstructionEvaluator;
pub use expression_evaluator::evaluate as evaluate_expression;
pub use frame::Frame;
pub use interpreter::Interpreter;
pub use method::Method;
pub use method_registry::MethodRegistry;
pub use method_resolver::resolve_method;
pub use method_store::MethodStore;
pub use methodology::Methodology;
pub use system::System;

// The shared data model, re-exported for hosts that only depend on the
// runtime crate.
pub use agerun_core::{ErrorKind, Evaluated, Log, Map, RuntimeError, Value};
pub use agerun_lang::{ExpressionAst, FunctionKind, InstructionAst, MethodAst};
