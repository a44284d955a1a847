//! Transform AST
//!
//! A transform is a pipeline of operations over a stream of JSON values.
//! Expressions are evaluated against one stream element at a time and
//! cannot reach outside it, so scripts stay sandboxed by construction.

use serde_json::Value;

/// A complete transform script
#[derive(Debug, Clone)]
pub struct Transform {
    pub ops: Vec<Op>,
}

/// One pipeline operation
#[derive(Debug, Clone)]
pub enum Op {
    /// Descend into an object field path on every stream element
    Focus(Vec<String>),
    /// Splice every array element into the stream
    Each,
    /// Keep elements for which the predicate is true
    Filter(Expr),
    /// Reshape every element into an object of evaluated fields
    Project(Vec<(String, Expr)>),
}

/// An expression over the current stream element
#[derive(Debug, Clone)]
pub enum Expr {
    Lit(Value),
    /// Field of the current element (objects only); missing fields are null
    Field(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    /// Coerce to integer: numbers truncate, strings parse after stripping
    /// thousands separators; anything else is null
    ToInt(Box<Expr>),
    /// Resolve a region display name to its stable code, null if unknown
    RegionCode(Box<Expr>),
}

impl Expr {
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Lit(Value::from(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Lit(Value::String(value.into()))
    }

    pub fn to_int(self) -> Self {
        Expr::ToInt(Box::new(self))
    }

    pub fn add(self, other: Expr) -> Self {
        Expr::Add(Box::new(self), Box::new(other))
    }

    pub fn ne(self, other: Expr) -> Self {
        Expr::Ne(Box::new(self), Box::new(other))
    }

    pub fn region_code(self) -> Self {
        Expr::RegionCode(Box::new(self))
    }
}
