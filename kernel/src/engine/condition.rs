// Condition Evaluation
//
// A condition compares one context field against a literal or against
// another context field. Every malformed case evaluates to false.

use std::borrow::Cow;

use serde_json::Value;
use tracing::debug;

use super::patterns::PatternCache;
use crate::context::EvalContext;
use crate::kb::{Condition, Operator};

pub fn evaluate_condition(
    condition: &Condition,
    ctx: &EvalContext<'_>,
    patterns: &PatternCache,
) -> bool {
    let field = ctx.resolve(&condition.field);
    let expected = comparison_value(&condition.value, ctx);
    let expected = expected.as_ref();

    match condition.operator {
        Operator::Eq => field.as_ref().is_some_and(|f| strict_eq(f, expected)),
        Operator::Ne => !field.as_ref().is_some_and(|f| strict_eq(f, expected)),
        Operator::In => match expected.as_array() {
            Some(items) => field.as_ref().is_some_and(|f| contains(items, f)),
            None => false,
        },
        Operator::Nin => match expected.as_array() {
            Some(items) => !field.as_ref().is_some_and(|f| contains(items, f)),
            None => false,
        },
        Operator::Exists => field.as_ref().is_some_and(|f| !f.is_null()),
        Operator::NotExists => field.as_ref().map_or(true, Value::is_null),
        Operator::Gt => numeric(field.as_ref(), expected, |a, b| a > b),
        Operator::Gte => numeric(field.as_ref(), expected, |a, b| a >= b),
        Operator::Lt => numeric(field.as_ref(), expected, |a, b| a < b),
        Operator::Lte => numeric(field.as_ref(), expected, |a, b| a <= b),
        Operator::Matches => matches_pattern(field.as_ref(), expected, patterns),
        Operator::Unknown => {
            debug!(field = %condition.field, "unknown operator, condition fails closed");
            false
        }
    }
}

/// A dotted string that names a defined context field is replaced by
/// that field's value; anything else is used as written.
fn comparison_value<'v>(value: &'v Value, ctx: &EvalContext<'_>) -> Cow<'v, Value> {
    if let Value::String(s) = value {
        if s.contains('.') {
            if let Some(resolved) = ctx.resolve(s) {
                return Cow::Owned(resolved);
            }
        }
    }
    Cow::Borrowed(value)
}

/// Equality without coercion between kinds. Numbers compare by value so
/// that `0` and `0.0` are equal.
pub(crate) fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| strict_eq(x, y))
        }
        _ => a == b,
    }
}

fn contains(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| strict_eq(item, needle))
}

fn numeric(field: Option<&Value>, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (field.and_then(Value::as_f64), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn matches_pattern(field: Option<&Value>, pattern: &Value, patterns: &PatternCache) -> bool {
    let (Some(text), Some(pattern)) = (field.and_then(Value::as_str), pattern.as_str()) else {
        return false;
    };
    patterns.is_match(pattern, text)
}
