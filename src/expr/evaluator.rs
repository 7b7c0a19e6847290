//! Expression evaluation
//!
//! Evaluates an [`Expr`] tree against one bound input value. Every node visit
//! counts against a step budget so a single evaluation is always bounded.

use std::cell::Cell;
use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, LiteralValue, UnaryOp};
use super::builtins;
use crate::core::error::{Error, Result};

/// Default number of node visits allowed for one evaluation
pub const DEFAULT_MAX_EVAL_STEPS: usize = 100_000;

/// How the input is bound inside an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    name: String,
    with_scope: bool,
}

impl Binding {
    /// Input reachable only through `name`
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            with_scope: false,
        }
    }

    /// Input reachable through `name`, and its keys as bare identifiers
    pub fn scope(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            with_scope: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_scope(&self) -> bool {
        self.with_scope
    }
}

/// Evaluator for a single input
pub struct Evaluator<'a> {
    binding: &'a Binding,
    input: &'a LiteralValue,
    steps: Cell<usize>,
    max_steps: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(binding: &'a Binding, input: &'a LiteralValue, max_steps: usize) -> Self {
        Self {
            binding,
            input,
            steps: Cell::new(0),
            max_steps,
        }
    }

    /// Number of node visits so far
    pub fn steps(&self) -> usize {
        self.steps.get()
    }

    /// Evaluate an expression to a value
    pub fn evaluate(&self, expr: &Expr) -> Result<LiteralValue> {
        Ok(self.evaluate_chain(expr)?.unwrap_or(LiteralValue::Undefined))
    }

    fn tick(&self) -> Result<()> {
        let steps = self.steps.get() + 1;
        if steps > self.max_steps {
            return Err(Error::EvaluationBudgetExceeded {
                limit: self.max_steps,
            });
        }
        self.steps.set(steps);
        Ok(())
    }

    /// `None` means an optional chain short-circuited
    fn evaluate_chain(&self, expr: &Expr) -> Result<Option<LiteralValue>> {
        self.tick()?;

        match expr {
            Expr::Member {
                object,
                property,
                optional,
            } => {
                if let Some(constant) = self.static_constant(object, property) {
                    return Ok(Some(constant));
                }
                let target = match self.evaluate_chain(object)? {
                    Some(target) => target,
                    None => return Ok(None),
                };
                if *optional && target.is_nullish() {
                    return Ok(None);
                }
                let key = self.evaluate(property)?;
                get_property(&target, &key).map(Some)
            }
            Expr::Call { callee, args } => self.evaluate_call(callee, args),
            other => self.evaluate_node(other).map(Some),
        }
    }

    fn evaluate_node(&self, expr: &Expr) -> Result<LiteralValue> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Identifier(name) => self.resolve_identifier(name),
            Expr::Array(items) => Ok(LiteralValue::Array(
                items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Expr::Object(entries) => {
                let mut map = indexmap::IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), self.evaluate(value)?);
                }
                Ok(LiteralValue::Object(map))
            }
            Expr::Unary { op, operand } => self.evaluate_unary(*op, operand),
            Expr::Binary { left, op, right } => self.evaluate_binary(left, *op, right),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.evaluate(test)?.is_truthy() {
                    self.evaluate(consequent)
                } else {
                    self.evaluate(alternate)
                }
            }
            Expr::Member { .. } | Expr::Call { .. } => self.evaluate(expr),
        }
    }

    fn lookup_variable(&self, name: &str) -> Option<LiteralValue> {
        if name == self.binding.name() {
            return Some(self.input.clone());
        }
        if self.binding.is_scope() {
            if let LiteralValue::Object(map) = self.input {
                return map.get(name).cloned();
            }
        }
        None
    }

    fn has_variable(&self, name: &str) -> bool {
        name == self.binding.name()
            || (self.binding.is_scope()
                && matches!(self.input, LiteralValue::Object(map) if map.contains_key(name)))
    }

    fn resolve_identifier(&self, name: &str) -> Result<LiteralValue> {
        if let Some(value) = self.lookup_variable(name) {
            return Ok(value);
        }
        match name {
            "NaN" => Ok(LiteralValue::Number(f64::NAN)),
            "Infinity" => Ok(LiteralValue::Number(f64::INFINITY)),
            _ if builtins::is_global(name) => Err(Error::ExpressionEval(format!(
                "{} cannot be used as a value",
                name
            ))),
            _ => Err(Error::ExpressionEval(format!("{} is not defined", name))),
        }
    }

    /// `Math.PI` and friends, unless the namespace name is shadowed
    fn static_constant(&self, object: &Expr, property: &Expr) -> Option<LiteralValue> {
        match (object, property) {
            (Expr::Identifier(ns), Expr::Literal(LiteralValue::String(name))) => {
                builtins::static_constant(ns, name).filter(|_| !self.has_variable(ns))
            }
            _ => None,
        }
    }

    fn evaluate_call(&self, callee: &Expr, args: &[Expr]) -> Result<Option<LiteralValue>> {
        match callee {
            Expr::Identifier(name) => {
                if self.has_variable(name) {
                    return Err(Error::ExpressionEval(format!("{} is not a function", name)));
                }
                let args = self.evaluate_args(args)?;
                builtins::call_global(name, &args).map(Some)
            }
            Expr::Member {
                object,
                property,
                optional,
            } => {
                if let (Expr::Identifier(ns), Expr::Literal(LiteralValue::String(name))) =
                    (object.as_ref(), property.as_ref())
                {
                    if builtins::is_namespace(ns) && !self.has_variable(ns) {
                        let args = self.evaluate_args(args)?;
                        return builtins::call_static(ns, name, &args).map(Some);
                    }
                }

                let target = match self.evaluate_chain(object)? {
                    Some(target) => target,
                    None => return Ok(None),
                };
                if target.is_nullish() {
                    if *optional {
                        return Ok(None);
                    }
                    return Err(Error::ExpressionEval(format!(
                        "Cannot read properties of {}",
                        describe(&target)
                    )));
                }
                let method = self.evaluate(property)?.to_display_string();
                let args = self.evaluate_args(args)?;
                builtins::call_method(&target, &method, &args).map(Some)
            }
            _ => Err(Error::ExpressionEval(
                "Expression is not callable".to_string(),
            )),
        }
    }

    fn evaluate_args(&self, args: &[Expr]) -> Result<Vec<LiteralValue>> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn evaluate_unary(&self, op: UnaryOp, operand: &Expr) -> Result<LiteralValue> {
        if op == UnaryOp::Typeof {
            if let Expr::Identifier(name) = operand {
                if !self.has_variable(name) && !builtins::is_global(name) {
                    return Ok(LiteralValue::from("undefined"));
                }
                if !self.has_variable(name) {
                    let kind = if builtins::is_namespace(name) { "object" } else { "function" };
                    return Ok(LiteralValue::from(kind));
                }
            }
        }

        let value = self.evaluate(operand)?;
        Ok(match op {
            UnaryOp::Not => LiteralValue::Boolean(!value.is_truthy()),
            UnaryOp::Negate => LiteralValue::Number(-value.to_number()),
            UnaryOp::Plus => LiteralValue::Number(value.to_number()),
            UnaryOp::Typeof => LiteralValue::from(value.type_name()),
        })
    }

    fn evaluate_binary(&self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<LiteralValue> {
        let l = self.evaluate(left)?;

        // Logical operators short-circuit and return an operand
        match op {
            BinaryOp::And if !l.is_truthy() => Ok(l),
            BinaryOp::Or if l.is_truthy() => Ok(l),
            BinaryOp::NullishCoalesce if !l.is_nullish() => Ok(l),
            BinaryOp::And | BinaryOp::Or | BinaryOp::NullishCoalesce => self.evaluate(right),
            _ => {
                let r = self.evaluate(right)?;
                Ok(apply_binary(op, &l, &r))
            }
        }
    }
}

/// Apply a binary operator to evaluated operands
pub fn apply_binary(op: BinaryOp, l: &LiteralValue, r: &LiteralValue) -> LiteralValue {
    match op {
        BinaryOp::Equal => LiteralValue::Boolean(loose_equals(l, r)),
        BinaryOp::NotEqual => LiteralValue::Boolean(!loose_equals(l, r)),
        BinaryOp::StrictEqual => LiteralValue::Boolean(strict_equals(l, r)),
        BinaryOp::StrictNotEqual => LiteralValue::Boolean(!strict_equals(l, r)),
        BinaryOp::LessThan => LiteralValue::Boolean(matches!(compare(l, r), Some(Ordering::Less))),
        BinaryOp::LessThanOrEqual => LiteralValue::Boolean(matches!(
            compare(l, r),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::GreaterThan => {
            LiteralValue::Boolean(matches!(compare(l, r), Some(Ordering::Greater)))
        }
        BinaryOp::GreaterThanOrEqual => LiteralValue::Boolean(matches!(
            compare(l, r),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::And => {
            if l.is_truthy() {
                r.clone()
            } else {
                l.clone()
            }
        }
        BinaryOp::Or => {
            if l.is_truthy() {
                l.clone()
            } else {
                r.clone()
            }
        }
        BinaryOp::NullishCoalesce => {
            if l.is_nullish() {
                r.clone()
            } else {
                l.clone()
            }
        }
        BinaryOp::Add => add(l, r),
        BinaryOp::Subtract => LiteralValue::Number(l.to_number() - r.to_number()),
        BinaryOp::Multiply => LiteralValue::Number(l.to_number() * r.to_number()),
        BinaryOp::Divide => LiteralValue::Number(l.to_number() / r.to_number()),
        BinaryOp::Modulo => LiteralValue::Number(l.to_number() % r.to_number()),
        BinaryOp::Power => LiteralValue::Number(l.to_number().powf(r.to_number())),
    }
}

fn describe(value: &LiteralValue) -> &'static str {
    match value {
        LiteralValue::Null => "null",
        other => other.type_name(),
    }
}

/// Property read; reading from `undefined` or `null` is an error
pub fn get_property(target: &LiteralValue, key: &LiteralValue) -> Result<LiteralValue> {
    let name = key.to_display_string();
    match target {
        LiteralValue::Undefined | LiteralValue::Null => Err(Error::ExpressionEval(format!(
            "Cannot read properties of {} (reading '{}')",
            describe(&target),
            name
        ))),
        LiteralValue::String(s) => {
            if name == "length" {
                return Ok(LiteralValue::Number(s.chars().count() as f64));
            }
            Ok(index_of_key(&name)
                .and_then(|i| s.chars().nth(i))
                .map(|c| LiteralValue::String(c.to_string()))
                .unwrap_or(LiteralValue::Undefined))
        }
        LiteralValue::Array(items) => {
            if name == "length" {
                return Ok(LiteralValue::Number(items.len() as f64));
            }
            Ok(index_of_key(&name)
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(LiteralValue::Undefined))
        }
        LiteralValue::Object(map) => Ok(map.get(&name).cloned().unwrap_or(LiteralValue::Undefined)),
        LiteralValue::Number(_) | LiteralValue::Boolean(_) => Ok(LiteralValue::Undefined),
    }
}

fn index_of_key(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

fn add(l: &LiteralValue, r: &LiteralValue) -> LiteralValue {
    let lp = l.to_primitive();
    let rp = r.to_primitive();
    if matches!(lp, LiteralValue::String(_)) || matches!(rp, LiteralValue::String(_)) {
        LiteralValue::String(format!("{}{}", lp.to_display_string(), rp.to_display_string()))
    } else {
        LiteralValue::Number(lp.to_number() + rp.to_number())
    }
}

/// `==` comparison with type coercion
pub fn loose_equals(a: &LiteralValue, b: &LiteralValue) -> bool {
    use LiteralValue::*;
    match (a, b) {
        (Undefined | Null, Undefined | Null) => true,
        (Undefined | Null, _) | (_, Undefined | Null) => false,
        (Number(x), Number(y)) => x == y,
        (String(x), String(y)) => x == y,
        (Boolean(x), Boolean(y)) => x == y,
        (Array(_) | Object(_), Array(_) | Object(_)) => a == b,
        (Boolean(_), _) => loose_equals(&Number(a.to_number()), b),
        (_, Boolean(_)) => loose_equals(a, &Number(b.to_number())),
        (Number(x), String(_)) => *x == b.to_number(),
        (String(_), Number(y)) => a.to_number() == *y,
        (Array(_) | Object(_), _) => loose_equals(&a.to_primitive(), b),
        (_, Array(_) | Object(_)) => loose_equals(a, &b.to_primitive()),
    }
}

/// `===` comparison without coercion
pub fn strict_equals(a: &LiteralValue, b: &LiteralValue) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b) && a == b
}

/// Relational ordering; `None` when the operands are not comparable (NaN)
pub fn compare(a: &LiteralValue, b: &LiteralValue) -> Option<Ordering> {
    let ap = a.to_primitive();
    let bp = b.to_primitive();
    if let (LiteralValue::String(x), LiteralValue::String(y)) = (&ap, &bp) {
        return Some(x.cmp(y));
    }
    ap.to_number().partial_cmp(&bp.to_number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer_parser::parse_expression;
    use serde_json::json;

    fn eval_with(source: &str, input: serde_json::Value, binding: Binding) -> Result<LiteralValue> {
        let expr = parse_expression(source)?;
        let input = LiteralValue::from_json(&input);
        Evaluator::new(&binding, &input, DEFAULT_MAX_EVAL_STEPS).evaluate(&expr)
    }

    fn eval(source: &str, input: serde_json::Value) -> Result<LiteralValue> {
        eval_with(source, input, Binding::value("$"))
    }

    #[test]
    fn test_member_access() {
        let input = json!({"a": {"b": [1, 2, 3]}, "s": "hello"});
        assert_eq!(eval("$.a.b[1]", input.clone()).unwrap(), LiteralValue::Number(2.0));
        assert_eq!(eval("$.a.b.length", input.clone()).unwrap(), LiteralValue::Number(3.0));
        assert_eq!(eval("$['s'].length", input.clone()).unwrap(), LiteralValue::Number(5.0));
        assert_eq!(eval("$.missing", input.clone()).unwrap(), LiteralValue::Undefined);
        assert!(eval("$.missing.deeper", input).is_err());
    }

    #[test]
    fn test_optional_chaining() {
        let input = json!({"a": null});
        assert_eq!(eval("$.a?.b.c", input.clone()).unwrap(), LiteralValue::Undefined);
        assert_eq!(eval("$.x?.y ?? 'd'", input).unwrap(), LiteralValue::from("d"));
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(eval("$ || 'x'", json!("")).unwrap(), LiteralValue::from("x"));
        assert_eq!(eval("$ && $.a", json!({"a": 5})).unwrap(), LiteralValue::Number(5.0));
        assert_eq!(eval("!$", json!(0)).unwrap(), LiteralValue::Boolean(true));
    }

    #[test]
    fn test_equality_and_comparison() {
        assert_eq!(eval("$ == '5'", json!(5)).unwrap(), LiteralValue::Boolean(true));
        assert_eq!(eval("$ === '5'", json!(5)).unwrap(), LiteralValue::Boolean(false));
        assert_eq!(eval("$ > 25", json!(30)).unwrap(), LiteralValue::Boolean(true));
        assert_eq!(eval("'b' > 'a'", json!(null)).unwrap(), LiteralValue::Boolean(true));
        assert_eq!(eval("null == undefined", json!(null)).unwrap(), LiteralValue::Boolean(true));
    }

    #[test]
    fn test_string_concatenation() {
        let input = json!({"first": "John", "last": "Doe", "n": 2});
        assert_eq!(
            eval("$.first + ' ' + $.last", input.clone()).unwrap(),
            LiteralValue::from("John Doe")
        );
        assert_eq!(eval("$.n + 1 + 'x'", input).unwrap(), LiteralValue::from("3x"));
    }

    #[test]
    fn test_with_scope_identifiers() {
        let input = json!({"name": "test", "level": 3});
        let result = eval_with("name + level", input.clone(), Binding::scope("$")).unwrap();
        assert_eq!(result, LiteralValue::from("test3"));
        assert!(eval("name", input).is_err());
    }

    #[test]
    fn test_typeof() {
        assert_eq!(eval("typeof $", json!("s")).unwrap(), LiteralValue::from("string"));
        assert_eq!(eval("typeof nothing", json!(1)).unwrap(), LiteralValue::from("undefined"));
        assert_eq!(eval("typeof Math", json!(1)).unwrap(), LiteralValue::from("object"));
    }

    #[test]
    fn test_step_budget() {
        let expr = parse_expression("1 + 2 + 3 + 4").unwrap();
        let binding = Binding::value("$");
        let input = LiteralValue::Null;
        let result = Evaluator::new(&binding, &input, 3).evaluate(&expr);
        assert!(matches!(result, Err(Error::EvaluationBudgetExceeded { limit: 3 })));
    }
}
