//! Lexical analysis and parsing for field expressions
//!
//! Converts expression source into tokens and then into an [`Expr`] tree with a
//! recursive-descent parser. Precedence from loosest to tightest: conditional,
//! `??`, `||`, `&&`, equality, comparison, additive, multiplicative, `**`,
//! unary, member access and calls.

use std::iter::Peekable;
use std::str::Chars;

use super::ast::{BinaryOp, Expr, LiteralValue, Token, UnaryOp};
use crate::core::error::{Error, Result};

/// Lexer for tokenizing expressions
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    /// Tokenize the whole input, ending with [`Token::Eof`]
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token == Token::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let ch = match self.chars.peek() {
            None => return Ok(Token::Eof),
            Some(&ch) => ch,
        };

        match ch {
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '[' => self.single(Token::LeftBracket),
            ']' => self.single(Token::RightBracket),
            '{' => self.single(Token::LeftBrace),
            '}' => self.single(Token::RightBrace),
            ',' => self.single(Token::Comma),
            ':' => self.single(Token::Colon),
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '/' => self.single(Token::Divide),
            '%' => self.single(Token::Modulo),
            '*' => {
                self.chars.next();
                if self.eat('*') {
                    Ok(Token::Power)
                } else {
                    Ok(Token::Multiply)
                }
            }
            '.' => {
                self.chars.next();
                if matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                    self.read_number(String::from("0."))
                } else {
                    Ok(Token::Dot)
                }
            }
            '?' => {
                self.chars.next();
                if self.eat('?') {
                    Ok(Token::NullishCoalesce)
                } else if self.eat('.') {
                    Ok(Token::OptionalDot)
                } else {
                    Ok(Token::Question)
                }
            }
            '=' => {
                self.chars.next();
                if !self.eat('=') {
                    return Err(Error::ExpressionParse(
                        "Assignment is not supported, expected '==' or '==='".to_string(),
                    ));
                }
                if self.eat('=') {
                    Ok(Token::StrictEqual)
                } else {
                    Ok(Token::Equal)
                }
            }
            '!' => {
                self.chars.next();
                if self.eat('=') {
                    if self.eat('=') {
                        Ok(Token::StrictNotEqual)
                    } else {
                        Ok(Token::NotEqual)
                    }
                } else {
                    Ok(Token::Not)
                }
            }
            '<' => {
                self.chars.next();
                if self.eat('=') {
                    Ok(Token::LessThanOrEqual)
                } else {
                    Ok(Token::LessThan)
                }
            }
            '>' => {
                self.chars.next();
                if self.eat('=') {
                    Ok(Token::GreaterThanOrEqual)
                } else {
                    Ok(Token::GreaterThan)
                }
            }
            '&' => {
                self.chars.next();
                if self.eat('&') {
                    Ok(Token::And)
                } else {
                    Err(Error::ExpressionParse(
                        "Expected '&&' for logical AND".to_string(),
                    ))
                }
            }
            '|' => {
                self.chars.next();
                if self.eat('|') {
                    Ok(Token::Or)
                } else {
                    Err(Error::ExpressionParse(
                        "Expected '||' for logical OR".to_string(),
                    ))
                }
            }
            '\'' | '"' | '`' => self.read_string(),
            '0'..='9' => self.read_number(String::new()),
            c if c.is_alphabetic() || c == '_' || c == '$' => Ok(self.read_identifier()),
            _ => Err(Error::ExpressionParse(format!(
                "Unexpected character: {}",
                ch
            ))),
        }
    }

    fn single(&mut self, token: Token) -> Result<Token> {
        self.chars.next();
        Ok(token)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    /// Read a string literal delimited by `'`, `"` or a backtick
    fn read_string(&mut self) -> Result<Token> {
        let quote = match self.chars.next() {
            Some(q) => q,
            None => return Err(Error::ExpressionParse("Expected string".to_string())),
        };
        let mut value = String::new();

        while let Some(ch) = self.chars.next() {
            if ch == quote {
                return Ok(Token::String(value));
            } else if ch == '\\' {
                match self.chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('u') => value.push(self.read_unicode_escape()?),
                    Some(other) => value.push(other),
                    None => break,
                }
            } else {
                value.push(ch);
            }
        }

        Err(Error::ExpressionParse(
            "Unterminated string literal".to_string(),
        ))
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let mut hex = String::new();
        if self.eat('{') {
            while let Some(ch) = self.chars.next() {
                if ch == '}' {
                    break;
                }
                hex.push(ch);
            }
        } else {
            for _ in 0..4 {
                if let Some(ch) = self.chars.next() {
                    hex.push(ch);
                }
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| Error::ExpressionParse(format!("Invalid unicode escape: \\u{}", hex)))
    }

    /// Read a number literal (decimal, exponent or `0x` hex)
    fn read_number(&mut self, mut number: String) -> Result<Token> {
        if number.is_empty() && self.chars.peek() == Some(&'0') {
            self.chars.next();
            if self.eat('x') || self.eat('X') {
                let mut hex = String::new();
                while let Some(&ch) = self.chars.peek() {
                    if ch.is_ascii_hexdigit() {
                        hex.push(ch);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                return i64::from_str_radix(&hex, 16)
                    .map(|v| Token::Number(v as f64))
                    .map_err(|_| Error::ExpressionParse(format!("Invalid number: 0x{}", hex)));
            }
            number.push('0');
        }

        let mut seen_exponent = false;
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() || (ch == '.' && !seen_exponent && !number.contains('.')) {
                number.push(ch);
                self.chars.next();
            } else if (ch == 'e' || ch == 'E') && !seen_exponent {
                seen_exponent = true;
                number.push(ch);
                self.chars.next();
                if let Some(&sign) = self.chars.peek() {
                    if sign == '+' || sign == '-' {
                        number.push(sign);
                        self.chars.next();
                    }
                }
            } else {
                break;
            }
        }

        match number.parse::<f64>() {
            Ok(value) => Ok(Token::Number(value)),
            Err(_) => Err(Error::ExpressionParse(format!("Invalid number: {}", number))),
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                identifier.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }

        match identifier.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "undefined" => Token::Undefined,
            "typeof" => Token::Typeof,
            _ => Token::Identifier(identifier),
        }
    }
}

/// Deepest syntax tree the parser builds
///
/// Parsing and evaluation both recurse over the tree, so the height is
/// capped instead of trusting user input with the stack.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parser for building expression AST
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser with tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the tokens into a single expression; trailing tokens are an error
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_conditional_expression()?;
        match self.current_token() {
            Some(Token::Eof) | None => Ok(expr),
            Some(token) => Err(Error::ExpressionParse(format!(
                "Unexpected token: {:?}",
                token
            ))),
        }
    }

    /// Parse `test ? a : b`
    fn parse_conditional_expression(&mut self) -> Result<Expr> {
        self.descend()?;
        let test = self.parse_nullish_expression()?;

        if !self.match_token(&Token::Question) {
            self.ascend(1);
            return Ok(test);
        }

        let consequent = self.parse_conditional_expression()?;
        self.expect(&Token::Colon, "Expected ':' in conditional expression")?;
        let alternate = self.parse_conditional_expression()?;
        self.ascend(1);

        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// Parse `??` expressions
    fn parse_nullish_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_or_expression()?;

        while self.match_token(&Token::NullishCoalesce) {
            self.descend()?;
            chain += 1;
            let right = self.parse_or_expression()?;
            left = binary(left, BinaryOp::NullishCoalesce, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse OR expressions
    fn parse_or_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_and_expression()?;

        while self.match_token(&Token::Or) {
            self.descend()?;
            chain += 1;
            let right = self.parse_and_expression()?;
            left = binary(left, BinaryOp::Or, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse AND expressions
    fn parse_and_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_equality_expression()?;

        while self.match_token(&Token::And) {
            self.descend()?;
            chain += 1;
            let right = self.parse_equality_expression()?;
            left = binary(left, BinaryOp::And, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse equality expressions (==, !=, ===, !==)
    fn parse_equality_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_comparison_expression()?;

        while let Some(op) = self.match_operator(|t| match t {
            Token::Equal => Some(BinaryOp::Equal),
            Token::NotEqual => Some(BinaryOp::NotEqual),
            Token::StrictEqual => Some(BinaryOp::StrictEqual),
            Token::StrictNotEqual => Some(BinaryOp::StrictNotEqual),
            _ => None,
        }) {
            self.descend()?;
            chain += 1;
            let right = self.parse_comparison_expression()?;
            left = binary(left, op, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse comparison expressions (<, <=, >, >=)
    fn parse_comparison_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_additive_expression()?;

        while let Some(op) = self.match_operator(|t| match t {
            Token::LessThan => Some(BinaryOp::LessThan),
            Token::LessThanOrEqual => Some(BinaryOp::LessThanOrEqual),
            Token::GreaterThan => Some(BinaryOp::GreaterThan),
            Token::GreaterThanOrEqual => Some(BinaryOp::GreaterThanOrEqual),
            _ => None,
        }) {
            self.descend()?;
            chain += 1;
            let right = self.parse_additive_expression()?;
            left = binary(left, op, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse additive expressions (+, -)
    fn parse_additive_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_multiplicative_expression()?;

        while let Some(op) = self.match_operator(|t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Subtract),
            _ => None,
        }) {
            self.descend()?;
            chain += 1;
            let right = self.parse_multiplicative_expression()?;
            left = binary(left, op, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse multiplicative expressions (*, /, %)
    fn parse_multiplicative_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut left = self.parse_power_expression()?;

        while let Some(op) = self.match_operator(|t| match t {
            Token::Multiply => Some(BinaryOp::Multiply),
            Token::Divide => Some(BinaryOp::Divide),
            Token::Modulo => Some(BinaryOp::Modulo),
            _ => None,
        }) {
            self.descend()?;
            chain += 1;
            let right = self.parse_power_expression()?;
            left = binary(left, op, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Parse power expressions (**)
    fn parse_power_expression(&mut self) -> Result<Expr> {
        let left = self.parse_unary_expression()?;

        if self.match_token(&Token::Power) {
            self.descend()?;
            let right = self.parse_power_expression()?; // Right associative
            self.ascend(1);
            return Ok(binary(left, BinaryOp::Power, right));
        }

        Ok(left)
    }

    /// Parse unary expressions (!, -, +, typeof)
    fn parse_unary_expression(&mut self) -> Result<Expr> {
        let op = match self.current_token() {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Negate,
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Typeof) => UnaryOp::Typeof,
            _ => return self.parse_postfix_expression(),
        };
        self.advance();

        self.descend()?;
        let operand = self.parse_unary_expression()?;
        self.ascend(1);
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parse member access and calls following a primary expression
    fn parse_postfix_expression(&mut self) -> Result<Expr> {
        let mut chain = 0;
        let mut expr = self.parse_primary_expression()?;

        loop {
            self.descend()?;
            chain += 1;
            if self.match_token(&Token::Dot) {
                let name = self.expect_property_name()?;
                expr = member(expr, name, false);
            } else if self.match_token(&Token::OptionalDot) {
                if self.match_token(&Token::LeftBracket) {
                    let property = self.parse_conditional_expression()?;
                    self.expect(&Token::RightBracket, "Expected ']' after property")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        optional: true,
                    };
                } else {
                    let name = self.expect_property_name()?;
                    expr = member(expr, name, true);
                }
            } else if self.match_token(&Token::LeftBracket) {
                let property = self.parse_conditional_expression()?;
                self.expect(&Token::RightBracket, "Expected ']' after property")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(property),
                    optional: false,
                };
            } else if self.match_token(&Token::LeftParen) {
                let args = self.parse_list(&Token::RightParen)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                self.ascend(chain);
                return Ok(expr);
            }
        }
    }

    /// Parse primary expressions (literals, identifiers, parentheses, array and object literals)
    fn parse_primary_expression(&mut self) -> Result<Expr> {
        let token = match self.current_token().cloned() {
            Some(token) => token,
            None => return Err(Error::ExpressionParse("Unexpected end of input".to_string())),
        };
        self.advance();

        match token {
            Token::Number(value) => Ok(Expr::Literal(LiteralValue::Number(value))),
            Token::String(value) => Ok(Expr::Literal(LiteralValue::String(value))),
            Token::Boolean(value) => Ok(Expr::Literal(LiteralValue::Boolean(value))),
            Token::Null => Ok(Expr::Literal(LiteralValue::Null)),
            Token::Undefined => Ok(Expr::Literal(LiteralValue::Undefined)),
            Token::Identifier(name) => Ok(Expr::Identifier(name)),
            Token::LeftParen => {
                let expr = self.parse_conditional_expression()?;
                self.expect(&Token::RightParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            Token::LeftBracket => Ok(Expr::Array(self.parse_list(&Token::RightBracket)?)),
            Token::LeftBrace => self.parse_object_literal(),
            Token::Eof => Err(Error::ExpressionParse("Unexpected end of input".to_string())),
            other => Err(Error::ExpressionParse(format!(
                "Unexpected token: {:?}",
                other
            ))),
        }
    }

    /// Comma separated expressions up to `close`; a trailing comma is allowed
    fn parse_list(&mut self, close: &Token) -> Result<Vec<Expr>> {
        let mut items = Vec::new();

        while !self.check_token(close) {
            items.push(self.parse_conditional_expression()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        self.expect(close, "Unterminated list")?;
        Ok(items)
    }

    fn parse_object_literal(&mut self) -> Result<Expr> {
        let mut entries = Vec::new();

        while !self.check_token(&Token::RightBrace) {
            let key = match self.current_token().cloned() {
                Some(Token::Identifier(name)) => name,
                Some(Token::String(name)) => name,
                Some(Token::Number(n)) => super::ast::format_number(n),
                other => {
                    return Err(Error::ExpressionParse(format!(
                        "Invalid object key: {:?}",
                        other
                    )))
                }
            };
            self.advance();

            let value = if self.match_token(&Token::Colon) {
                self.parse_conditional_expression()?
            } else {
                // shorthand `{name}`
                Expr::Identifier(key.clone())
            };
            entries.push((key, value));

            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        self.expect(&Token::RightBrace, "Expected '}' after object literal")?;
        Ok(Expr::Object(entries))
    }

    fn expect_property_name(&mut self) -> Result<String> {
        let name = match self.current_token() {
            Some(Token::Identifier(name)) => name.clone(),
            Some(Token::Boolean(b)) => b.to_string(),
            Some(Token::Null) => "null".to_string(),
            Some(Token::Undefined) => "undefined".to_string(),
            Some(Token::Typeof) => "typeof".to_string(),
            other => {
                return Err(Error::ExpressionParse(format!(
                    "Expected property name, found {:?}",
                    other
                )))
            }
        };
        self.advance();
        Ok(name)
    }

    /// Enter one more level of the syntax tree
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(Error::ExpressionParse(format!(
                "expression nested too deeply (more than {} levels)",
                MAX_NESTING_DEPTH
            )));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    /// Helper methods for parsing
    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.check_token(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check_token(&self, expected: &Token) -> bool {
        if let Some(token) = self.current_token() {
            std::mem::discriminant(token) == std::mem::discriminant(expected)
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, message: &str) -> Result<()> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(Error::ExpressionParse(format!(
                "{}, found {:?}",
                message,
                self.current_token().unwrap_or(&Token::Eof)
            )))
        }
    }

    fn match_operator<F>(&mut self, select: F) -> Option<BinaryOp>
    where
        F: Fn(&Token) -> Option<BinaryOp>,
    {
        let op = self.current_token().and_then(select)?;
        self.advance();
        Some(op)
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn member(object: Expr, name: String, optional: bool) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: Box::new(Expr::Literal(LiteralValue::String(name))),
        optional,
    }
}

/// Tokenize and parse `source` into an expression tree
pub fn parse_expression(source: &str) -> Result<Expr> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_operators() {
        let tokens = Lexer::new("a?.b ?? c === 1 !== 2").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("a".into()),
                Token::OptionalDot,
                Token::Identifier("b".into()),
                Token::NullishCoalesce,
                Token::Identifier("c".into()),
                Token::StrictEqual,
                Token::Number(1.0),
                Token::StrictNotEqual,
                Token::Number(2.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_strings_and_numbers() {
        let tokens = Lexer::new(r#"'it\'s' "a\nb" `x` 1.5e2 0x1F .5"#).tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::String("it's".into()),
                Token::String("a\nb".into()),
                Token::String("x".into()),
                Token::Number(150.0),
                Token::Number(31.0),
                Token::Number(0.5),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_dollar_identifiers() {
        let expr = parse_expression("$.first + $name").unwrap();
        match expr {
            Expr::Binary { left, op, right } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*left, Expr::Member { .. }));
                assert_eq!(*right, Expr::Identifier("$name".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let expr = parse_expression("1 + 2 * 3 > 6 && true").unwrap();
        match expr {
            Expr::Binary { op, .. } => assert_eq!(op, BinaryOp::And),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("invalid syntax {{").is_err());
        assert!(parse_expression("function{}").is_err());
        assert!(parse_expression("a = 1").is_err());
        assert!(parse_expression("(1 + 2").is_err());
        assert!(parse_expression("'open").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse_expression(&shallow).is_ok());

        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(parse_expression(&deep), Err(Error::ExpressionParse(_))));

        for source in [
            "!".repeat(10_000) + "true",
            vec!["1"; 10_000].join(" + "),
            format!("$.{}", vec!["a"; 10_000].join(".")),
            format!("{}1{}", "[".repeat(10_000), "]".repeat(10_000)),
            format!("{}1{}", "{a: ".repeat(10_000), "}".repeat(10_000)),
            vec!["2"; 10_000].join(" ** "),
        ] {
            assert!(parse_expression(&source).is_err());
        }

        // siblings do not add up
        let wide = vec!["(1 + 2)"; 500].join(", ");
        assert!(parse_expression(&format!("[{}]", wide)).is_ok());
    }

    #[test]
    fn test_literals() {
        assert!(matches!(parse_expression("[1, 'a',]").unwrap(), Expr::Array(items) if items.len() == 2));
        assert!(matches!(parse_expression("{a: 1, 'b': 2, c}").unwrap(), Expr::Object(entries) if entries.len() == 3));
    }
}
