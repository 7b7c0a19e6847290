//! AST definitions for field expressions
//!
//! Tokens, syntax tree and runtime values of the small expression language
//! used by extended fields, field expressions and document queries.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Token types for expression parsing
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier, including `$`-prefixed names
    Identifier(String),
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// Boolean literal
    Boolean(bool),
    Null,
    Undefined,
    Typeof,
    /// Comparison operators
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// Logical operators
    And,
    Or,
    Not,
    NullishCoalesce,
    /// Arithmetic operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Power,
    /// Member access
    Dot,
    OptionalDot,
    /// Conditional
    Question,
    Colon,
    /// Brackets
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    /// Comma separator
    Comma,
    /// End of input
    Eof,
}

/// Expression AST node types
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Variable or global reference
    Identifier(String),
    /// Literal values
    Literal(LiteralValue),
    /// `[a, b]`
    Array(Vec<Expr>),
    /// `{key: value}`
    Object(Vec<(String, Expr)>),
    /// `obj.name`, `obj?.name`, `obj[expr]`
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        optional: bool,
    },
    /// Function or method call
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// Binary operations
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operations
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Logical
    And,
    Or,
    NullishCoalesce,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
    Typeof,
}

/// Runtime value of an expression
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LiteralValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<LiteralValue>),
    Object(IndexMap<String, LiteralValue>),
}

impl LiteralValue {
    /// Convert a plain JSON value
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => LiteralValue::Null,
            Value::Bool(b) => LiteralValue::Boolean(*b),
            Value::Number(n) => LiteralValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => LiteralValue::String(s.clone()),
            Value::Array(items) => LiteralValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => LiteralValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a plain JSON value; `None` for `undefined`
    ///
    /// Follows `JSON.stringify`: undefined members are skipped, undefined
    /// array items and non-finite numbers become `null`, integral numbers are
    /// written without a fraction.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            LiteralValue::Undefined => None,
            LiteralValue::Null => Some(Value::Null),
            LiteralValue::Boolean(b) => Some(Value::Bool(*b)),
            LiteralValue::Number(n) => Some(number_to_json(*n)),
            LiteralValue::String(s) => Some(Value::String(s.clone())),
            LiteralValue::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|v| v.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
            LiteralValue::Object(map) => {
                let object: Map<String, Value> = map
                    .iter()
                    .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                    .collect();
                Some(Value::Object(object))
            }
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, LiteralValue::Undefined | LiteralValue::Null)
    }

    /// Truthiness as used by conditions and logical operators
    pub fn is_truthy(&self) -> bool {
        match self {
            LiteralValue::Undefined | LiteralValue::Null => false,
            LiteralValue::Boolean(b) => *b,
            LiteralValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LiteralValue::String(s) => !s.is_empty(),
            LiteralValue::Array(_) | LiteralValue::Object(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Undefined => "undefined",
            LiteralValue::Null | LiteralValue::Array(_) | LiteralValue::Object(_) => "object",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Number(_) => "number",
            LiteralValue::String(_) => "string",
        }
    }

    /// String conversion (`String(x)`)
    pub fn to_display_string(&self) -> String {
        match self {
            LiteralValue::Undefined => "undefined".to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::String(s) => s.clone(),
            LiteralValue::Array(items) => items
                .iter()
                .map(|v| {
                    if v.is_nullish() {
                        String::new()
                    } else {
                        v.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            LiteralValue::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Numeric conversion (`Number(x)`)
    pub fn to_number(&self) -> f64 {
        match self {
            LiteralValue::Undefined => f64::NAN,
            LiteralValue::Null => 0.0,
            LiteralValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            LiteralValue::Number(n) => *n,
            LiteralValue::String(s) => parse_number(s),
            LiteralValue::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => parse_number(&single.to_display_string()),
                _ => f64::NAN,
            },
            LiteralValue::Object(_) => f64::NAN,
        }
    }

    /// Primitive view used by `+` and loose comparisons
    pub fn to_primitive(&self) -> LiteralValue {
        match self {
            LiteralValue::Array(_) | LiteralValue::Object(_) => {
                LiteralValue::String(self.to_display_string())
            }
            other => other.clone(),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Number(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Boolean(value)
    }
}

fn number_to_json(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Number formatting without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

/// Lenient string-to-number conversion; blank is zero, garbage is NaN
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust accepts "inf"/"nan" spellings that are not numbers here
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
