//! Embedded declarative transform evaluator
//!
//! A small, side-effect-free JSON-to-JSON query language, interpreted
//! in-process so transform failures share the pipeline's error taxonomy
//! instead of living in an external interpreter. Per-source extraction
//! scripts and the multi-source join both run through it.

pub mod ast;
pub mod eval;
pub mod scripts;

pub use ast::{Expr, Op, Transform};
