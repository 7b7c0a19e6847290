//! Expression evaluation for derived fields and row predicates
//!
//! The rest of the crate only talks to the [`ExpressionEvaluator`] and
//! [`CompiledExpression`] traits. [`DslEvaluator`] is the bundled
//! implementation: a small JavaScript-flavoured expression language with
//! property access, operators, conditionals and a set of built-in functions.
//! It has no statements, loops or user-defined functions.

pub mod ast;
mod builtins;
pub mod engine;
pub mod evaluator;
pub mod lexer_parser;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::core::error::Result;

pub use ast::{Expr, LiteralValue};
pub use engine::{
    parse_extended_fields, split_top_level, ExpressionEngine, ExtendedFields, FieldDefinition,
    Predicate,
};
pub use evaluator::{Binding, Evaluator, DEFAULT_MAX_EVAL_STEPS};
pub use lexer_parser::parse_expression;

/// Compiles expression source against a binding
pub trait ExpressionEvaluator: fmt::Debug + Send + Sync {
    /// Compile `source`; syntax errors surface here
    fn compile(&self, source: &str, binding: &Binding) -> Result<Arc<dyn CompiledExpression>>;
}

/// A compiled expression ready to run against inputs
pub trait CompiledExpression: fmt::Debug + Send + Sync {
    /// Original source text
    fn source(&self) -> &str;

    /// Evaluate against an input already in the language's value model
    fn evaluate_literal(&self, input: &LiteralValue) -> Result<LiteralValue>;

    /// Evaluate against one input; runtime errors surface here
    fn evaluate(&self, input: &Value) -> Result<LiteralValue> {
        self.evaluate_literal(&LiteralValue::from_json(input))
    }
}

/// Bundled evaluator for the expression language
#[derive(Debug, Clone)]
pub struct DslEvaluator {
    max_steps: usize,
}

impl Default for DslEvaluator {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_EVAL_STEPS,
        }
    }
}

impl DslEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator with a custom per-evaluation step budget
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps: max_steps.max(1),
        }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

impl ExpressionEvaluator for DslEvaluator {
    fn compile(&self, source: &str, binding: &Binding) -> Result<Arc<dyn CompiledExpression>> {
        let expr = parse_expression(source)?;
        Ok(Arc::new(DslExpression {
            source: source.to_string(),
            expr,
            binding: binding.clone(),
            max_steps: self.max_steps,
        }))
    }
}

/// Parsed expression of the bundled language
#[derive(Debug, Clone)]
pub struct DslExpression {
    source: String,
    expr: Expr,
    binding: Binding,
    max_steps: usize,
}

impl DslExpression {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl CompiledExpression for DslExpression {
    fn source(&self) -> &str {
        &self.source
    }

    fn evaluate_literal(&self, input: &LiteralValue) -> Result<LiteralValue> {
        Evaluator::new(&self.binding, input, self.max_steps).evaluate(&self.expr)
    }
}
