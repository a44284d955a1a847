//! Transform interpreter

use super::ast::{Expr, Op, Transform};
use crate::config::regions;
use sdp_common::{PipelineError, Result};
use serde_json::Value;

/// Apply a transform to a payload, yielding the resulting value stream
pub fn apply(transform: &Transform, payload: &Value) -> Result<Vec<Value>> {
    let mut stream = vec![payload.clone()];
    for op in &transform.ops {
        stream = apply_op(op, stream)?;
    }
    Ok(stream)
}

fn apply_op(op: &Op, stream: Vec<Value>) -> Result<Vec<Value>> {
    match op {
        Op::Focus(path) => stream.into_iter().map(|v| descend(v, path)).collect(),
        Op::Each => {
            let mut out = Vec::new();
            for value in stream {
                match value {
                    Value::Array(items) => out.extend(items),
                    other => {
                        return Err(PipelineError::Transform(format!(
                            "each: expected array, got {}",
                            kind(&other)
                        )))
                    },
                }
            }
            Ok(out)
        },
        Op::Filter(pred) => {
            let mut out = Vec::new();
            for value in stream {
                if truthy(&eval(pred, &value)?)? {
                    out.push(value);
                }
            }
            Ok(out)
        },
        Op::Project(fields) => stream
            .into_iter()
            .map(|value| {
                let mut obj = serde_json::Map::with_capacity(fields.len());
                for (name, expr) in fields {
                    obj.insert(name.clone(), eval(expr, &value)?);
                }
                Ok(Value::Object(obj))
            })
            .collect(),
    }
}

fn descend(value: Value, path: &[String]) -> Result<Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            Value::Object(mut obj) => obj.remove(segment).ok_or_else(|| {
                PipelineError::Transform(format!("focus: no field '{segment}'"))
            })?,
            other => {
                return Err(PipelineError::Transform(format!(
                    "focus: expected object at '{segment}', got {}",
                    kind(&other)
                )))
            },
        };
    }
    Ok(current)
}

/// Evaluate an expression against one stream element
pub fn eval(expr: &Expr, ctx: &Value) -> Result<Value> {
    match expr {
        Expr::Lit(value) => Ok(value.clone()),
        Expr::Field(name) => match ctx {
            Value::Object(obj) => Ok(obj.get(name).cloned().unwrap_or(Value::Null)),
            other => Err(PipelineError::Transform(format!(
                "field '{name}': expected object, got {}",
                kind(other)
            ))),
        },
        Expr::Add(a, b) => arith(a, b, ctx, "add", |x, y| x + y),
        Expr::Sub(a, b) => arith(a, b, ctx, "sub", |x, y| x - y),
        Expr::Eq(a, b) => Ok(Value::Bool(eval(a, ctx)? == eval(b, ctx)?)),
        Expr::Ne(a, b) => Ok(Value::Bool(eval(a, ctx)? != eval(b, ctx)?)),
        Expr::Ge(a, b) => compare(a, b, ctx, |ord| ord >= 0),
        Expr::Lt(a, b) => compare(a, b, ctx, |ord| ord < 0),
        Expr::And(exprs) => {
            for e in exprs {
                if !truthy(&eval(e, ctx)?)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        },
        Expr::Or(exprs) => {
            for e in exprs {
                if truthy(&eval(e, ctx)?)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        },
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval(inner, ctx)?)?)),
        Expr::ToInt(inner) => Ok(coerce_int(&eval(inner, ctx)?)),
        Expr::RegionCode(inner) => {
            let value = eval(inner, ctx)?;
            let Some(name) = value.as_str() else {
                return Ok(Value::Null);
            };
            Ok(regions::resolve(name)
                .map(|code| Value::String(code.to_string()))
                .unwrap_or(Value::Null))
        },
    }
}

fn arith(
    a: &Expr,
    b: &Expr,
    ctx: &Value,
    op: &str,
    f: impl Fn(i64, i64) -> i64,
) -> Result<Value> {
    let (left, right) = (eval(a, ctx)?, eval(b, ctx)?);
    match (left.as_i64(), right.as_i64()) {
        (Some(x), Some(y)) => Ok(Value::from(f(x, y))),
        // arithmetic over an absent operand stays absent
        _ if left.is_null() || right.is_null() => Ok(Value::Null),
        _ => Err(PipelineError::Transform(format!(
            "{op}: expected integers, got {} and {}",
            kind(&left),
            kind(&right)
        ))),
    }
}

fn compare(a: &Expr, b: &Expr, ctx: &Value, f: impl Fn(i64) -> bool) -> Result<Value> {
    let (left, right) = (eval(a, ctx)?, eval(b, ctx)?);
    match (left.as_i64(), right.as_i64()) {
        (Some(x), Some(y)) => Ok(Value::Bool(f(match x.cmp(&y) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        }))),
        _ => Err(PipelineError::Transform(format!(
            "compare: expected integers, got {} and {}",
            kind(&left),
            kind(&right)
        ))),
    }
}

fn coerce_int(value: &Value) -> Value {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Value::from)
            .unwrap_or(Value::Null),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',' && *c != '，')
                .collect();
            cleaned.parse::<i64>().map(Value::from).unwrap_or(Value::Null)
        },
        _ => Value::Null,
    }
}

fn truthy(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(PipelineError::Transform(format!(
            "predicate must be boolean, got {}",
            kind(other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
