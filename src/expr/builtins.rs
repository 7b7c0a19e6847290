//! Built-in functions and methods available to expressions

use super::ast::{format_number, parse_number, LiteralValue};
use super::evaluator::strict_equals;
use crate::core::error::{Error, Result};

const GLOBAL_FUNCTIONS: &[&str] = &[
    "String",
    "Number",
    "Boolean",
    "parseInt",
    "parseFloat",
    "isNaN",
    "isFinite",
    "encodeURIComponent",
    "decodeURIComponent",
];

const NAMESPACES: &[&str] = &["Math", "JSON", "Object", "Array", "Number"];

/// Longest string a built-in may produce, in characters
pub const MAX_STRING_LENGTH: usize = 1 << 24;

fn check_length(length: usize) -> Result<()> {
    if length > MAX_STRING_LENGTH {
        return Err(Error::ExpressionEval(format!(
            "Invalid string length: {} exceeds {}",
            length, MAX_STRING_LENGTH
        )));
    }
    Ok(())
}

/// True for names of namespaces with static members (`Math.max`)
pub fn is_namespace(name: &str) -> bool {
    NAMESPACES.contains(&name)
}

/// True for any built-in global name
pub fn is_global(name: &str) -> bool {
    GLOBAL_FUNCTIONS.contains(&name) || is_namespace(name)
}

fn arg(args: &[LiteralValue], index: usize) -> LiteralValue {
    args.get(index).cloned().unwrap_or_default()
}

fn arg_string(args: &[LiteralValue], index: usize) -> String {
    arg(args, index).to_display_string()
}

fn arg_number(args: &[LiteralValue], index: usize, default: f64) -> f64 {
    match args.get(index) {
        None | Some(LiteralValue::Undefined) => default,
        Some(value) => value.to_number(),
    }
}

fn not_a_function(target: &str, name: &str) -> Error {
    Error::ExpressionEval(format!("{}.{} is not a function", target, name))
}

/// Call a global function such as `String(x)` or `parseInt(s)`
pub fn call_global(name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    let value = arg(args, 0);
    Ok(match name {
        "String" => {
            if args.is_empty() {
                LiteralValue::String(String::new())
            } else {
                LiteralValue::String(value.to_display_string())
            }
        }
        "Number" => {
            if args.is_empty() {
                LiteralValue::Number(0.0)
            } else {
                LiteralValue::Number(value.to_number())
            }
        }
        "Boolean" => LiteralValue::Boolean(value.is_truthy()),
        "parseInt" => LiteralValue::Number(parse_int(
            &value.to_display_string(),
            arg_number(args, 1, 0.0) as u32,
        )),
        "parseFloat" => LiteralValue::Number(parse_float(&value.to_display_string())),
        "isNaN" => LiteralValue::Boolean(value.to_number().is_nan()),
        "isFinite" => LiteralValue::Boolean(value.to_number().is_finite()),
        "encodeURIComponent" => {
            LiteralValue::String(urlencoding::encode(&value.to_display_string()).into_owned())
        }
        "decodeURIComponent" => {
            let text = value.to_display_string();
            let decoded = urlencoding::decode(&text)
                .map_err(|e| Error::ExpressionEval(format!("URIError: {}", e)))?;
            LiteralValue::String(decoded.into_owned())
        }
        _ => return Err(Error::ExpressionEval(format!("{} is not defined", name))),
    })
}

/// Constant members of a namespace (`Math.PI`)
pub fn static_constant(namespace: &str, name: &str) -> Option<LiteralValue> {
    let value = match (namespace, name) {
        ("Math", "PI") => std::f64::consts::PI,
        ("Math", "E") => std::f64::consts::E,
        ("Math", "LN2") => std::f64::consts::LN_2,
        ("Math", "LN10") => std::f64::consts::LN_10,
        ("Math", "SQRT2") => std::f64::consts::SQRT_2,
        ("Number", "MAX_SAFE_INTEGER") => 9_007_199_254_740_991.0,
        ("Number", "MIN_SAFE_INTEGER") => -9_007_199_254_740_991.0,
        ("Number", "EPSILON") => f64::EPSILON,
        ("Number", "NaN") => f64::NAN,
        _ => return None,
    };
    Some(LiteralValue::Number(value))
}

/// Call a static function (`Math.max`, `JSON.stringify`, `Object.keys`, ...)
pub fn call_static(namespace: &str, name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    match namespace {
        "Math" => call_math(name, args),
        "JSON" => call_json(name, args),
        "Object" => call_object(name, args),
        "Array" => match name {
            "isArray" => Ok(LiteralValue::Boolean(matches!(arg(args, 0), LiteralValue::Array(_)))),
            "of" => Ok(LiteralValue::Array(args.to_vec())),
            _ => Err(not_a_function(namespace, name)),
        },
        "Number" => {
            let n = arg(args, 0);
            let number = match n {
                LiteralValue::Number(v) => Some(v),
                _ => None,
            };
            match name {
                "isInteger" => Ok(LiteralValue::Boolean(
                    number.map_or(false, |v| v.is_finite() && v.fract() == 0.0),
                )),
                "isFinite" => Ok(LiteralValue::Boolean(number.map_or(false, f64::is_finite))),
                "isNaN" => Ok(LiteralValue::Boolean(number.map_or(false, f64::is_nan))),
                "parseFloat" => call_global("parseFloat", args),
                "parseInt" => call_global("parseInt", args),
                _ => Err(not_a_function(namespace, name)),
            }
        }
        _ => Err(not_a_function(namespace, name)),
    }
}

fn call_math(name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    let x = arg_number(args, 0, f64::NAN);
    let value = match name {
        "abs" => x.abs(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "round" => (x + 0.5).floor(),
        "trunc" => x.trunc(),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "log" => x.ln(),
        "log10" => x.log10(),
        "log2" => x.log2(),
        "exp" => x.exp(),
        "pow" => x.powf(arg_number(args, 1, f64::NAN)),
        "min" => fold_numbers(args, f64::INFINITY, f64::min),
        "max" => fold_numbers(args, f64::NEG_INFINITY, f64::max),
        _ => return Err(not_a_function("Math", name)),
    };
    Ok(LiteralValue::Number(value))
}

fn fold_numbers(args: &[LiteralValue], init: f64, f: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return f64::NAN;
        }
        acc = f(acc, n);
    }
    acc
}

fn call_json(name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    match name {
        "stringify" => {
            let json = match arg(args, 0).to_json() {
                Some(json) => json,
                None => return Ok(LiteralValue::Undefined),
            };
            let pretty = arg_number(args, 2, 0.0) > 0.0;
            let text = if pretty {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string(&json)
            }
            .map_err(|e| Error::ExpressionEval(e.to_string()))?;
            Ok(LiteralValue::String(text))
        }
        "parse" => {
            let text = arg_string(args, 0);
            let value: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| Error::ExpressionEval(format!("SyntaxError: {}", e)))?;
            Ok(LiteralValue::from_json(&value))
        }
        _ => Err(not_a_function("JSON", name)),
    }
}

fn call_object(name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    let target = arg(args, 0);
    let entries: Vec<(String, LiteralValue)> = match &target {
        LiteralValue::Undefined | LiteralValue::Null => {
            return Err(Error::ExpressionEval(
                "Cannot convert undefined or null to object".to_string(),
            ))
        }
        LiteralValue::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        LiteralValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        LiteralValue::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), LiteralValue::String(c.to_string())))
            .collect(),
        _ => Vec::new(),
    };

    match name {
        "keys" => Ok(LiteralValue::Array(
            entries.into_iter().map(|(k, _)| LiteralValue::String(k)).collect(),
        )),
        "values" => Ok(LiteralValue::Array(entries.into_iter().map(|(_, v)| v).collect())),
        "entries" => Ok(LiteralValue::Array(
            entries
                .into_iter()
                .map(|(k, v)| LiteralValue::Array(vec![LiteralValue::String(k), v]))
                .collect(),
        )),
        _ => Err(not_a_function("Object", name)),
    }
}

/// Call a method on a value (`s.includes(x)`, `arr.join(',')`, `n.toFixed(2)`)
pub fn call_method(target: &LiteralValue, name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    match target {
        LiteralValue::String(s) => string_method(s, name, args),
        LiteralValue::Array(items) => array_method(items, name, args),
        LiteralValue::Number(n) => match name {
            "toFixed" => {
                let digits = arg_number(args, 0, 0.0).clamp(0.0, 100.0) as usize;
                Ok(LiteralValue::String(format!("{:.*}", digits, n)))
            }
            "toString" => Ok(LiteralValue::String(format_number(*n))),
            _ => Err(not_a_function("number", name)),
        },
        LiteralValue::Boolean(b) => match name {
            "toString" => Ok(LiteralValue::String(b.to_string())),
            _ => Err(not_a_function("boolean", name)),
        },
        LiteralValue::Object(map) => match name {
            "hasOwnProperty" => Ok(LiteralValue::Boolean(map.contains_key(&arg_string(args, 0)))),
            "toString" => Ok(LiteralValue::String(target.to_display_string())),
            _ => Err(not_a_function("object", name)),
        },
        LiteralValue::Undefined | LiteralValue::Null => Err(Error::ExpressionEval(format!(
            "Cannot read properties of {} (reading '{}')",
            target.to_display_string(),
            name
        ))),
    }
}

/// Clamp a possibly negative index into `0..=len`
fn relative_index(value: f64, len: usize) -> usize {
    if value.is_nan() {
        return 0;
    }
    let value = value.trunc();
    if value < 0.0 {
        (len as f64 + value).max(0.0) as usize
    } else {
        value.min(len as f64) as usize
    }
}

fn char_index_of(haystack: &str, needle: &str, from_end: bool) -> f64 {
    let found = if from_end {
        haystack.rfind(needle)
    } else {
        haystack.find(needle)
    };
    match found {
        Some(byte) => haystack[..byte].chars().count() as f64,
        None => -1.0,
    }
}

fn string_method(s: &str, name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let slice = |start: usize, end: usize| -> String {
        if start >= end {
            String::new()
        } else {
            chars[start..end].iter().collect()
        }
    };

    Ok(match name {
        "includes" => LiteralValue::Boolean(s.contains(&arg_string(args, 0))),
        "startsWith" => LiteralValue::Boolean(s.starts_with(&arg_string(args, 0))),
        "endsWith" => LiteralValue::Boolean(s.ends_with(&arg_string(args, 0))),
        "indexOf" => LiteralValue::Number(char_index_of(s, &arg_string(args, 0), false)),
        "lastIndexOf" => LiteralValue::Number(char_index_of(s, &arg_string(args, 0), true)),
        "toUpperCase" => LiteralValue::String(s.to_uppercase()),
        "toLowerCase" => LiteralValue::String(s.to_lowercase()),
        "trim" => LiteralValue::String(s.trim().to_string()),
        "trimStart" => LiteralValue::String(s.trim_start().to_string()),
        "trimEnd" => LiteralValue::String(s.trim_end().to_string()),
        "toString" => LiteralValue::String(s.to_string()),
        "charAt" => {
            let i = arg_number(args, 0, 0.0);
            let found = if i >= 0.0 { chars.get(i as usize) } else { None };
            LiteralValue::String(found.map(|c| c.to_string()).unwrap_or_default())
        }
        "at" => {
            let i = arg_number(args, 0, 0.0).trunc();
            let index = if i < 0.0 { len as f64 + i } else { i };
            if index >= 0.0 {
                chars
                    .get(index as usize)
                    .map(|c| LiteralValue::String(c.to_string()))
                    .unwrap_or(LiteralValue::Undefined)
            } else {
                LiteralValue::Undefined
            }
        }
        "slice" => {
            let start = relative_index(arg_number(args, 0, 0.0), len);
            let end = relative_index(arg_number(args, 1, len as f64), len);
            LiteralValue::String(slice(start, end))
        }
        "substring" => {
            let clamp = |v: f64| {
                if v.is_nan() {
                    0
                } else {
                    v.max(0.0).min(len as f64) as usize
                }
            };
            let a = clamp(arg_number(args, 0, 0.0));
            let b = clamp(arg_number(args, 1, len as f64));
            LiteralValue::String(slice(a.min(b), a.max(b)))
        }
        "split" => {
            let limit = match args.get(1) {
                None | Some(LiteralValue::Undefined) => usize::MAX,
                Some(v) => v.to_number().max(0.0) as usize,
            };
            let parts: Vec<LiteralValue> = match args.first() {
                None | Some(LiteralValue::Undefined) => vec![LiteralValue::String(s.to_string())],
                Some(sep) => {
                    let sep = sep.to_display_string();
                    if sep.is_empty() {
                        chars.iter().map(|c| LiteralValue::String(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str())
                            .map(|p| LiteralValue::String(p.to_string()))
                            .collect()
                    }
                }
            };
            LiteralValue::Array(parts.into_iter().take(limit).collect())
        }
        "replace" => LiteralValue::String(s.replacen(&arg_string(args, 0), &arg_string(args, 1), 1)),
        "replaceAll" => {
            let pattern = arg_string(args, 0);
            if pattern.is_empty() {
                LiteralValue::String(s.to_string())
            } else {
                let replacement = arg_string(args, 1);
                let grown = replacement.len().saturating_sub(pattern.len());
                let count = s.matches(pattern.as_str()).count();
                check_length(s.len().saturating_add(count.saturating_mul(grown)))?;
                LiteralValue::String(s.replace(&pattern, &replacement))
            }
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_display_string());
            }
            LiteralValue::String(out)
        }
        "padStart" | "padEnd" => {
            let width = arg_number(args, 0, 0.0);
            let width = if width.is_nan() { 0.0 } else { width.max(0.0) };
            if width > MAX_STRING_LENGTH as f64 {
                check_length(usize::MAX)?;
            }
            let width = width as usize;
            let fill = match args.get(1) {
                None | Some(LiteralValue::Undefined) => " ".to_string(),
                Some(v) => v.to_display_string(),
            };
            if width <= len || fill.is_empty() {
                LiteralValue::String(s.to_string())
            } else {
                let padding: String = fill.chars().cycle().take(width - len).collect();
                if name == "padStart" {
                    LiteralValue::String(format!("{}{}", padding, s))
                } else {
                    LiteralValue::String(format!("{}{}", s, padding))
                }
            }
        }
        _ => return Err(not_a_function("string", name)),
    })
}

fn array_method(items: &[LiteralValue], name: &str, args: &[LiteralValue]) -> Result<LiteralValue> {
    let len = items.len();
    Ok(match name {
        "includes" => {
            let needle = arg(args, 0);
            LiteralValue::Boolean(items.iter().any(|item| {
                strict_equals(item, &needle)
                    || matches!((item, &needle), (LiteralValue::Number(a), LiteralValue::Number(b)) if a.is_nan() && b.is_nan())
            }))
        }
        "indexOf" => {
            let needle = arg(args, 0);
            LiteralValue::Number(
                items
                    .iter()
                    .position(|item| strict_equals(item, &needle))
                    .map_or(-1.0, |i| i as f64),
            )
        }
        "join" => {
            let sep = match args.first() {
                None | Some(LiteralValue::Undefined) => ",".to_string(),
                Some(v) => v.to_display_string(),
            };
            LiteralValue::String(
                items
                    .iter()
                    .map(|item| {
                        if item.is_nullish() {
                            String::new()
                        } else {
                            item.to_display_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(&sep),
            )
        }
        "slice" => {
            let start = relative_index(arg_number(args, 0, 0.0), len);
            let end = relative_index(arg_number(args, 1, len as f64), len);
            LiteralValue::Array(if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            })
        }
        "concat" => {
            let mut out = items.to_vec();
            for value in args {
                match value {
                    LiteralValue::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            LiteralValue::Array(out)
        }
        "at" => {
            let i = arg_number(args, 0, 0.0).trunc();
            let index = if i < 0.0 { len as f64 + i } else { i };
            if index >= 0.0 {
                items.get(index as usize).cloned().unwrap_or_default()
            } else {
                LiteralValue::Undefined
            }
        }
        "reverse" => LiteralValue::Array(items.iter().rev().cloned().collect()),
        "toString" => LiteralValue::String(LiteralValue::Array(items.to_vec()).to_display_string()),
        _ => return Err(not_a_function("array", name)),
    })
}

/// Integer prefix parse with optional radix (0 = auto)
fn parse_int(text: &str, radix: u32) -> f64 {
    let mut s = text.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let mut radix = radix;
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let digits: String = s.chars().take_while(|c| c.is_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0;
    for c in digits.chars() {
        value = value * radix as f64 + c.to_digit(radix).unwrap_or(0) as f64;
    }
    sign * value
}

/// Float prefix parse (`"3.5px"` → 3.5)
fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let mut end = 0;
    let bytes = s.as_bytes();
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let mut valid_end = 0;
    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_digit() {
            seen_digit = true;
            end += 1;
            valid_end = end;
        } else if b == b'.' && !seen_dot && !seen_exp {
            seen_dot = true;
            end += 1;
        } else if (b == b'e' || b == b'E') && seen_digit && !seen_exp {
            seen_exp = true;
            end += 1;
            if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                end += 1;
            }
        } else {
            break;
        }
    }

    if !seen_digit {
        return f64::NAN;
    }
    parse_number(&s[..valid_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> LiteralValue {
        LiteralValue::from(v)
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(call_method(&s("Hello"), "includes", &[s("ell")]).unwrap(), LiteralValue::Boolean(true));
        assert_eq!(call_method(&s("Hello"), "toUpperCase", &[]).unwrap(), s("HELLO"));
        assert_eq!(call_method(&s("a,b,c"), "split", &[s(",")]).unwrap(), LiteralValue::Array(vec![s("a"), s("b"), s("c")]));
        assert_eq!(call_method(&s("abcdef"), "slice", &[LiteralValue::Number(-3.0)]).unwrap(), s("def"));
        assert_eq!(
            call_method(&s("abcdef"), "substring", &[LiteralValue::Number(4.0), LiteralValue::Number(1.0)]).unwrap(),
            s("bcd")
        );
        assert_eq!(call_method(&s("héllo"), "indexOf", &[s("l")]).unwrap(), LiteralValue::Number(2.0));
        assert!(call_method(&s("x"), "nope", &[]).is_err());
    }

    #[test]
    fn test_padding_is_bounded() {
        let padded = call_method(&s("7"), "padStart", &[LiteralValue::Number(3.0), s("0")]).unwrap();
        assert_eq!(padded, s("007"));
        assert_eq!(call_method(&s("ab"), "padEnd", &[LiteralValue::Number(4.0)]).unwrap(), s("ab  "));
        assert_eq!(call_method(&s("abc"), "padStart", &[LiteralValue::Number(f64::NAN)]).unwrap(), s("abc"));

        for width in [1e12, f64::INFINITY] {
            let result = call_method(&s("abc"), "padStart", &[LiteralValue::Number(width)]);
            assert!(matches!(result, Err(Error::ExpressionEval(_))));
            assert!(call_method(&s("abc"), "padEnd", &[LiteralValue::Number(width)]).is_err());
        }
    }

    #[test]
    fn test_replace_all_is_bounded() {
        assert_eq!(call_method(&s("a-b-c"), "replaceAll", &[s("-"), s("+")]).unwrap(), s("a+b+c"));

        let wide = "x".repeat(1 << 12);
        let input = "a".repeat(1 << 13);
        assert!(call_method(&s(&input), "replaceAll", &[s("a"), s(&wide)]).is_err());
    }

    #[test]
    fn test_array_methods() {
        let arr = LiteralValue::Array(vec![LiteralValue::Number(1.0), s("a"), LiteralValue::Null]);
        if let LiteralValue::Array(items) = &arr {
            assert_eq!(array_method(items, "join", &[s("-")]).unwrap(), s("1-a-"));
            assert_eq!(array_method(items, "includes", &[s("a")]).unwrap(), LiteralValue::Boolean(true));
            assert_eq!(array_method(items, "indexOf", &[s("1")]).unwrap(), LiteralValue::Number(-1.0));
        }
    }

    #[test]
    fn test_globals() {
        assert_eq!(call_global("parseInt", &[s("42px")]).unwrap(), LiteralValue::Number(42.0));
        assert_eq!(call_global("parseInt", &[s("ff"), LiteralValue::Number(16.0)]).unwrap(), LiteralValue::Number(255.0));
        assert_eq!(call_global("parseFloat", &[s("3.5e1x")]).unwrap(), LiteralValue::Number(35.0));
        assert_eq!(call_global("String", &[LiteralValue::Number(5.0)]).unwrap(), s("5"));
        assert!(matches!(call_global("parseInt", &[s("x")]).unwrap(), LiteralValue::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_statics() {
        assert_eq!(
            call_static("Math", "max", &[LiteralValue::Number(1.0), LiteralValue::Number(3.0)]).unwrap(),
            LiteralValue::Number(3.0)
        );
        assert_eq!(call_static("Math", "round", &[LiteralValue::Number(2.5)]).unwrap(), LiteralValue::Number(3.0));
        assert_eq!(
            call_static("JSON", "parse", &[s(r#"{"a":[1]}"#)]).unwrap(),
            LiteralValue::from_json(&serde_json::json!({"a": [1]}))
        );
        assert!(call_static("Object", "keys", &[LiteralValue::Null]).is_err());
    }
}
