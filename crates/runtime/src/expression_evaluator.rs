//! Expression evaluation against a frame
//!
//! Pure: reads the frame, never mutates it. Bare accessor paths come back
//! as [`Evaluated::Borrowed`] references into the frame; every computed
//! result is a fresh [`Evaluated::Computed`] value. Callers that need
//! ownership use [`Evaluated::into_owned`] uniformly.
//!
//! Path resolution is strict about structure and lenient about absence:
//! descending into a missing or non-map node is `PathUnresolved`, but a
//! leaf key simply absent from its (existing) map reads as integer 0 -
//! which is what lets `memory.n := memory.n + 1` work on fresh memory.

use crate::frame::Frame;
use agerun_core::{ErrorKind, Evaluated, RuntimeError, Value};
use agerun_lang::ast::{BinaryOp, ExpressionAst};

/// Evaluate an expression in the given frame.
pub fn evaluate<'f>(
    frame: &'f Frame<'_>,
    expr: &ExpressionAst,
) -> Result<Evaluated<'f>, RuntimeError> {
    match expr {
        ExpressionAst::IntLiteral(n) => Ok(Evaluated::Computed(Value::Integer(*n))),
        ExpressionAst::DoubleLiteral(d) => Ok(Evaluated::Computed(Value::Double(*d))),
        ExpressionAst::StringLiteral(s) => Ok(Evaluated::Computed(Value::String(s.clone()))),
        ExpressionAst::MemoryAccess(_)
        | ExpressionAst::ContextAccess(_)
        | ExpressionAst::MessageAccess(_) => resolve_accessor(frame, expr),
        ExpressionAst::Binary { op, left, right } => {
            Ok(Evaluated::Computed(evaluate_binary(frame, *op, left, right)?))
        }
    }
}

/// Resolve an accessor to a borrowed value in the frame (or the integer-0
/// default for an absent leaf).
fn resolve_accessor<'f>(
    frame: &'f Frame<'_>,
    expr: &ExpressionAst,
) -> Result<Evaluated<'f>, RuntimeError> {
    match expr {
        ExpressionAst::MemoryAccess(segments) => {
            if segments.is_empty() {
                return Ok(Evaluated::Borrowed(frame.memory()));
            }
            lookup(frame.memory(), segments, "memory")
        }
        ExpressionAst::ContextAccess(segments) => {
            let context = frame.context().ok_or_else(|| {
                RuntimeError::new(ErrorKind::PathUnresolved, "agent has no context")
            })?;
            if segments.is_empty() {
                return Ok(Evaluated::Borrowed(context));
            }
            lookup(context, segments, "context")
        }
        ExpressionAst::MessageAccess(segments) => {
            if segments.is_empty() {
                return Ok(Evaluated::Borrowed(frame.message()));
            }
            lookup(frame.message(), segments, "message")
        }
        _ => unreachable!("resolve_accessor called on non-accessor"),
    }
}

/// Walk dotted segments below an accessor root. Intermediates must exist
/// and be maps; a missing leaf in an existing map reads as integer 0.
fn lookup<'v>(
    root: &'v Value,
    segments: &[String],
    what: &str,
) -> Result<Evaluated<'v>, RuntimeError> {
    let (leaf, intermediates) = segments.split_last().expect("lookup needs segments");

    let mut current = root;
    for segment in intermediates {
        let map = current.as_map().ok_or_else(|| not_a_map(what, segment))?;
        current = map.get(segment).ok_or_else(|| {
            RuntimeError::new(
                ErrorKind::PathUnresolved,
                format!("{}.{} not found", what, segment),
            )
        })?;
    }

    let map = current.as_map().ok_or_else(|| not_a_map(what, leaf))?;
    match map.get(leaf) {
        Some(value) => Ok(Evaluated::Borrowed(value)),
        None => Ok(Evaluated::Computed(Value::Integer(0))),
    }
}

fn not_a_map(what: &str, segment: &str) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::PathUnresolved,
        format!("{}: cannot descend into '{}', not a map", what, segment),
    )
}

enum Number {
    Int(i64),
    Double(f64),
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Integer(n) => Some(Number::Int(*n)),
        Value::Double(d) => Some(Number::Double(*d)),
        _ => None,
    }
}

fn evaluate_binary(
    frame: &Frame<'_>,
    op: BinaryOp,
    left: &ExpressionAst,
    right: &ExpressionAst,
) -> Result<Value, RuntimeError> {
    let left_eval = evaluate(frame, left)?;
    let right_eval = evaluate(frame, right)?;
    let lhs = left_eval.as_value();
    let rhs = right_eval.as_value();

    match op {
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => numeric(op, lhs, rhs),
        BinaryOp::Equal => Ok(Value::Integer(if equals(lhs, rhs) { 1 } else { 0 })),
    }
}

/// `+`: concatenation when either side is a string, numeric otherwise.
fn add(lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
        let left_text = lhs.canonical_string().ok_or_else(|| concat_error(lhs))?;
        let right_text = rhs.canonical_string().ok_or_else(|| concat_error(rhs))?;
        return Ok(Value::String(left_text + &right_text));
    }
    numeric(BinaryOp::Add, lhs, rhs)
}

fn concat_error(value: &Value) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::TypeMismatch,
        format!("cannot concatenate a {}", value.type_name()),
    )
}

/// Numeric arithmetic with int-to-double promotion. Integer operations
/// wrap; division by zero is its own error.
fn numeric(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let (Some(a), Some(b)) = (as_number(lhs), as_number(rhs)) else {
        return Err(RuntimeError::new(
            ErrorKind::TypeMismatch,
            format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                lhs.type_name(),
                rhs.type_name()
            ),
        ));
    };

    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let result = match op {
                BinaryOp::Add => x.wrapping_add(y),
                BinaryOp::Subtract => x.wrapping_sub(y),
                BinaryOp::Multiply => x.wrapping_mul(y),
                BinaryOp::Divide => {
                    if y == 0 {
                        return Err(RuntimeError::new(
                            ErrorKind::DivisionByZero,
                            format!("{} / 0", x),
                        ));
                    }
                    x.wrapping_div(y)
                }
                BinaryOp::Equal => unreachable!("equality handled separately"),
            };
            Ok(Value::Integer(result))
        }
        (a, b) => {
            let x = match a {
                Number::Int(n) => n as f64,
                Number::Double(d) => d,
            };
            let y = match b {
                Number::Int(n) => n as f64,
                Number::Double(d) => d,
            };
            let result = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Subtract => x - y,
                BinaryOp::Multiply => x * y,
                BinaryOp::Divide => {
                    if y == 0.0 {
                        return Err(RuntimeError::new(
                            ErrorKind::DivisionByZero,
                            format!("{} / 0", x),
                        ));
                    }
                    x / y
                }
                BinaryOp::Equal => unreachable!("equality handled separately"),
            };
            Ok(Value::Double(result))
        }
    }
}

/// `=` semantics: strings bytewise, numbers with promotion, everything
/// else unequal.
fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Integer(a), Value::Integer(b)) => a == b,
        _ => match (as_number(lhs), as_number(rhs)) {
            (Some(a), Some(b)) => {
                let x = match a {
                    Number::Int(n) => n as f64,
                    Number::Double(d) => d,
                };
                let y = match b {
                    Number::Int(n) => n as f64,
                    Number::Double(d) => d,
                };
                x == y
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agerun_core::Map;
    use agerun_lang::parse_expression;
    use std::rc::Rc;

    fn eval_with(
        memory: &mut Value,
        context: Option<&Rc<Value>>,
        message: &Rc<Value>,
        source: &str,
    ) -> Result<Value, RuntimeError> {
        let frame = Frame::new(memory, context, message);
        let expr = parse_expression(source).unwrap();
        evaluate(&frame, &expr)?.into_owned()
    }

    fn empty_frame_eval(source: &str) -> Result<Value, RuntimeError> {
        let mut memory = Value::empty_map();
        let message = Rc::new(Value::from("msg"));
        eval_with(&mut memory, None, &message, source)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(empty_frame_eval("1 + 2 * 3").unwrap(), Value::Integer(7));
        assert_eq!(empty_frame_eval("10 - 2 - 3").unwrap(), Value::Integer(5));
        assert_eq!(empty_frame_eval("7 / 2").unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_double_promotion() {
        assert_eq!(empty_frame_eval("1 + 0.5").unwrap(), Value::Double(1.5));
        assert_eq!(empty_frame_eval("3.0 * 2").unwrap(), Value::Double(6.0));
    }

    #[test]
    fn test_division_by_zero() {
        let err = empty_frame_eval("1 / 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        let err = empty_frame_eval("1.5 / 0.0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            empty_frame_eval(r#""count is " + 3"#).unwrap(),
            Value::from("count is 3")
        );
        assert_eq!(
            empty_frame_eval(r#"2.5 + " units""#).unwrap(),
            Value::from("2.5 units")
        );
        assert_eq!(
            empty_frame_eval(r#""a" + "b""#).unwrap(),
            Value::from("ab")
        );
    }

    #[test]
    fn test_string_subtraction_is_type_mismatch() {
        let err = empty_frame_eval(r#""a" - 1"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_equality() {
        assert_eq!(empty_frame_eval("1 = 1").unwrap(), Value::Integer(1));
        assert_eq!(empty_frame_eval("1 = 2").unwrap(), Value::Integer(0));
        assert_eq!(empty_frame_eval("1 = 1.0").unwrap(), Value::Integer(1));
        assert_eq!(
            empty_frame_eval(r#""x" = "x""#).unwrap(),
            Value::Integer(1)
        );
        // Mixed string/number never compares equal.
        assert_eq!(
            empty_frame_eval(r#""1" = 1"#).unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn test_memory_path_lookup() {
        let mut map = Map::new();
        map.insert("count".to_string(), Value::Integer(9));
        let mut memory = Value::Map(map);
        let message = Rc::new(Value::from("m"));
        assert_eq!(
            eval_with(&mut memory, None, &message, "memory.count + 1").unwrap(),
            Value::Integer(10)
        );
    }

    #[test]
    fn test_missing_leaf_reads_as_zero() {
        assert_eq!(empty_frame_eval("memory.absent").unwrap(), Value::Integer(0));
        // Fresh-memory increment is the canonical use.
        assert_eq!(
            empty_frame_eval("memory.n + 1").unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_missing_intermediate_is_path_unresolved() {
        let err = empty_frame_eval("memory.outer.inner").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathUnresolved);
    }

    #[test]
    fn test_message_root_and_fields() {
        let mut memory = Value::empty_map();
        let mut payload = Map::new();
        payload.insert("sender".to_string(), Value::Integer(0));
        payload.insert("text".to_string(), Value::from("hi"));
        let message = Rc::new(Value::Map(payload));

        assert_eq!(
            eval_with(&mut memory, None, &message, "message.text").unwrap(),
            Value::from("hi")
        );
        // The whole message is a map: claiming it must fail gracefully.
        let frame = Frame::new(&mut memory, None, &message);
        let expr = parse_expression("message").unwrap();
        let evaluated = evaluate(&frame, &expr).unwrap();
        assert_eq!(
            evaluated.into_owned().unwrap_err().kind,
            ErrorKind::ContainerCopy
        );
    }

    #[test]
    fn test_context_lookup_and_missing_context() {
        let mut memory = Value::empty_map();
        let mut ctx = Map::new();
        ctx.insert("origin".to_string(), Value::from("boot"));
        let context = Rc::new(Value::Map(ctx));
        let message = Rc::new(Value::from("m"));

        assert_eq!(
            eval_with(&mut memory, Some(&context), &message, "context.origin").unwrap(),
            Value::from("boot")
        );

        let err = eval_with(&mut memory, None, &message, "context.origin").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathUnresolved);
    }

    #[test]
    fn test_descend_through_non_map_fails() {
        let mut memory = Value::empty_map();
        let message = Rc::new(Value::from("scalar"));
        let err = eval_with(&mut memory, None, &message, "message.field").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathUnresolved);
    }
}
