//! Extended fields and predicate compilation
//!
//! An extended-fields expression is a comma separated list of `name: expr`
//! pairs. Every pair is compiled and evaluated on its own; a pair that fails
//! to compile or to evaluate is dropped without affecting the others.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::ast::LiteralValue;
use super::evaluator::Binding;
use super::{CompiledExpression, DslEvaluator, ExpressionEvaluator};
use crate::core::value::canonical_text;

/// Name of the implicit input variable
pub const INPUT_BINDING: &str = "$";

/// One `name: expr` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub expr: String,
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\'' || ch == '`'
}

/// Split on commas that are outside brackets and string literals
pub fn split_top_level(expression: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for ch in expression.chars() {
        if is_quote(ch) && prev != Some('\\') {
            match quote {
                None => quote = Some(ch),
                Some(open) if open == ch => quote = None,
                Some(_) => {}
            }
        }

        if quote.is_none() {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ => {}
            }
        }

        if ch == ',' && depth == 0 && quote.is_none() {
            if !current.trim().is_empty() {
                parts.push(current.trim().to_string());
            }
            current.clear();
        } else {
            current.push(ch);
        }
        prev = Some(ch);
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Split `name: expr` at the first colon outside a string literal
fn split_field_definition(definition: &str) -> Option<FieldDefinition> {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut colon = None;

    for (idx, ch) in definition.char_indices() {
        if is_quote(ch) && prev != Some('\\') {
            match quote {
                None => quote = Some(ch),
                Some(open) if open == ch => quote = None,
                Some(_) => {}
            }
        }
        if ch == ':' && quote.is_none() {
            colon = Some(idx);
            break;
        }
        prev = Some(ch);
    }

    let colon = colon?;
    let name = definition[..colon].trim();
    let expr = definition[colon + 1..].trim();
    if name.is_empty() || expr.is_empty() {
        return None;
    }
    Some(FieldDefinition {
        name: name.to_string(),
        expr: expr.to_string(),
    })
}

/// Parse an extended-fields expression into its pairs
pub fn parse_extended_fields(expression: &str) -> Vec<FieldDefinition> {
    if expression.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(expression)
        .iter()
        .filter_map(|part| split_field_definition(part))
        .collect()
}

/// Compiled set of extended fields
#[derive(Debug, Clone)]
pub struct ExtendedFields {
    fields: Vec<(String, Arc<dyn CompiledExpression>)>,
}

impl ExtendedFields {
    /// Field names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Evaluate every field against `input`
    ///
    /// Failing fields are left out and `undefined` ones map to `None`. Object
    /// and array results are stored as their canonical JSON text.
    pub fn extract(&self, input: &Value) -> IndexMap<String, Option<Value>> {
        let mut result = IndexMap::new();

        for (name, expression) in &self.fields {
            match expression.evaluate(input) {
                Ok(value) => {
                    let stored = value.to_json().map(|json| match json {
                        Value::Object(_) | Value::Array(_) => Value::String(canonical_text(&json)),
                        scalar => scalar,
                    });
                    result.insert(name.clone(), stored);
                }
                Err(e) => log::trace!("extended field '{}' failed: {}", name, e),
            }
        }

        result
    }
}

/// Compiled boolean expression with fail-open semantics
#[derive(Debug, Clone)]
pub struct Predicate {
    expression: Arc<dyn CompiledExpression>,
}

impl Predicate {
    pub fn source(&self) -> &str {
        self.expression.source()
    }

    /// Truthiness of the expression, or the evaluation error
    pub fn try_test(&self, input: &Value) -> crate::core::error::Result<bool> {
        self.expression
            .evaluate(input)
            .map(|value| value.is_truthy())
    }

    /// Truthiness of the expression; evaluation errors count as a match
    pub fn test(&self, input: &Value) -> bool {
        self.keep(self.try_test(input))
    }

    /// Like [`Predicate::test`], with `None` bound as `undefined`
    pub fn test_optional(&self, input: Option<&Value>) -> bool {
        let input = input.map_or(LiteralValue::Undefined, LiteralValue::from_json);
        self.keep(
            self.expression
                .evaluate_literal(&input)
                .map(|value| value.is_truthy()),
        )
    }

    fn keep(&self, outcome: crate::core::error::Result<bool>) -> bool {
        match outcome {
            Ok(matched) => matched,
            Err(e) => {
                log::trace!("expression '{}' failed, keeping row: {}", self.source(), e);
                true
            }
        }
    }

    /// Raw value of the expression
    pub fn evaluate(&self, input: &Value) -> crate::core::error::Result<LiteralValue> {
        self.expression.evaluate(input)
    }
}

/// Front end that turns user expressions into extractors and predicates
#[derive(Clone)]
pub struct ExpressionEngine {
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl fmt::Debug for ExpressionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEngine")
            .field("evaluator", &self.evaluator)
            .finish()
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new(Arc::new(DslEvaluator::default()))
    }
}

impl ExpressionEngine {
    /// Engine backed by a specific evaluator
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Engine backed by the bundled evaluator with a step budget
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self::new(Arc::new(DslEvaluator::with_max_steps(max_steps)))
    }

    pub fn evaluator(&self) -> &Arc<dyn ExpressionEvaluator> {
        &self.evaluator
    }

    /// Compile an extended-fields expression
    ///
    /// Returns `None` for a blank expression or when no pair compiles.
    pub fn compile_extended_fields(&self, expression: &str) -> Option<ExtendedFields> {
        let binding = Binding::scope(INPUT_BINDING);
        let mut fields = Vec::new();

        for definition in parse_extended_fields(expression) {
            match self.evaluator.compile(&definition.expr, &binding) {
                Ok(compiled) => fields.push((definition.name, compiled)),
                Err(e) => log::warn!(
                    "error parsing extended field '{}' ({}): {}",
                    definition.name,
                    definition.expr,
                    e
                ),
            }
        }

        if fields.is_empty() {
            None
        } else {
            Some(ExtendedFields { fields })
        }
    }

    /// Compile a single-argument predicate bound to `$`
    pub fn compile_predicate(&self, expression: &str) -> Option<Predicate> {
        let expression = expression.trim();
        if expression.is_empty() {
            return None;
        }
        match self
            .evaluator
            .compile(expression, &Binding::value(INPUT_BINDING))
        {
            Ok(compiled) => Some(Predicate {
                expression: compiled,
            }),
            Err(e) => {
                log::warn!("invalid expression '{}': {}", expression, e);
                None
            }
        }
    }

    /// Compile a document-level query; `identity` (usually `$`) means no filter
    pub fn compile_document_query(&self, query: &str, identity: &str) -> Option<Predicate> {
        if query.trim().is_empty() || query.trim() == identity {
            return None;
        }
        self.compile_predicate(query)
    }
}
