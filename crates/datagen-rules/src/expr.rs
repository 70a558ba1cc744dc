//! Expression evaluator for formula lines.
//!
//! A small JavaScript-flavoured language: numbers, quoted strings, `true` /
//! `false`, parentheses, unary `- + !`, `* / %`, `+ -` (`+` concatenates when
//! either side is a string), comparisons `< <= > >= == != === !==`, `&&`,
//! `||`, the ternary `?:`, the constants `Math.PI` / `Math.E` and the
//! functions `Math.abs ceil floor round sqrt pow min max`.
//!
//! Evaluation is a pure function of the expression text: there is no global
//! state, so one evaluator can serve every worker thread.

use std::fmt;
use thiserror::Error;

/// Maximum nesting of parentheses, unary operators, ternaries and calls.
///
/// Runs of binary operators are stored flat, so only this nesting grows the
/// parser and evaluator stacks.
const MAX_DEPTH: usize = 32;

/// Expression failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: &'static str,
        got: usize,
    },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Result of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    fn to_number(&self) -> Result<f64, ExprError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| ExprError::NotANumber(s.clone()))
            }
        }
    }
}

impl fmt::Display for Value {
    /// Numbers print the way JavaScript prints them: `5`, not `5.0`, and
    /// exponent form (`1e+21`, `1e-7`) outside `[1e-6, 1e21)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.is_nan() => f.write_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) if *n == 0.0 => f.write_str("0"),
            Value::Number(n) if n.abs() >= 1e21 || n.abs() < 1e-6 => {
                let text = format!("{n:e}");
                match text.split_once('e') {
                    Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                        write!(f, "{mantissa}e+{exponent}")
                    }
                    _ => f.write_str(&text),
                }
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Evaluate an expression.
pub fn evaluate(expression: &str) -> Result<Value, ExprError> {
    let tokens = lex(expression)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let ast = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(ExprError::UnexpectedToken(token.to_string()));
    }
    eval(&ast)
}

/// Append `value` to an expression being assembled, as a literal.
///
/// Numbers and booleans are inserted verbatim; anything else becomes a
/// double-quoted string literal.
pub fn push_literal(expression: &mut String, value: &str) {
    let trimmed = value.trim();
    let is_number = trimmed.parse::<f64>().is_ok_and(f64::is_finite);
    if is_number || trimmed == "true" || trimmed == "false" {
        // Parenthesized so that `-$x` with x = -1 stays a valid expression
        if trimmed.starts_with('-') {
            expression.push('(');
            expression.push_str(trimmed);
            expression.push(')');
        } else {
            expression.push_str(trimmed);
        }
        return;
    }
    expression.push('"');
    for c in value.chars() {
        match c {
            '"' => expression.push_str("\\\""),
            '\\' => expression.push_str("\\\\"),
            '\n' => expression.push_str("\\n"),
            _ => expression.push(c),
        }
    }
    expression.push('"');
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Ident(s) => f.write_str(s),
            Token::Punct(p) => f.write_str(p),
        }
    }
}

/// Punctuators, longest first.
const PUNCTUATORS: [&str; 22] = [
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "(", ")", ",",
    "?", ":", "!", "<", ">", ".",
];

fn lex(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_digit()
            || (c == '.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
        {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                i += 1;
                if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                    i += 1;
                }
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text = &src[start..i];
            let n = text
                .parse::<f64>()
                .map_err(|_| ExprError::InvalidNumber(text.to_string()))?;
            tokens.push(Token::Number(n));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::Ident(src[start..i].to_string()));
        } else if c == '"' || c == '\'' {
            let (s, next) = lex_string(src, i, c)?;
            tokens.push(Token::Str(s));
            i = next;
        } else if let Some(p) = PUNCTUATORS.iter().find(|p| src[i..].starts_with(**p)) {
            tokens.push(Token::Punct(*p));
            i += p.len();
        } else {
            let ch = src[i..].chars().next().unwrap_or(c);
            return Err(ExprError::UnexpectedChar(ch, i));
        }
    }
    Ok(tokens)
}

/// Lex a quoted string starting at `start`; returns the text and the next offset.
fn lex_string(src: &str, start: usize, quote: char) -> Result<(String, usize), ExprError> {
    let mut out = String::new();
    let mut chars = src[start + 1..].char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped)) => out.push(escaped),
                None => return Err(ExprError::UnterminatedString),
            },
            c if c == quote => return Ok((out, start + 1 + offset + c.len_utf8())),
            c => out.push(c),
        }
    }
    Err(ExprError::UnterminatedString)
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
enum Ast {
    Literal(Value),
    Unary(UnaryOp, Box<Ast>),
    /// Left-associative run: `first op1 x1 op2 x2 ...`
    Chain(Box<Ast>, Vec<(BinaryOp, Ast)>),
    Ternary(Box<Ast>, Box<Ast>, Box<Ast>),
    Call(String, Vec<Ast>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ExprError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), ExprError> {
        if self.eat(punct) {
            Ok(())
        } else {
            match self.peek() {
                Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
                None => Err(ExprError::UnexpectedEnd),
            }
        }
    }

    fn expression(&mut self) -> Result<Ast, ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        let condition = self.binary(0)?;
        let result = if self.eat("?") {
            let then = self.expression()?;
            self.expect(":")?;
            let otherwise = self.expression()?;
            Ast::Ternary(Box::new(condition), Box::new(then), Box::new(otherwise))
        } else {
            condition
        };
        self.depth -= 1;
        Ok(result)
    }

    /// Precedence climbing over the binary operators.
    ///
    /// Operators taken at one level are collected into a single
    /// [`Ast::Chain`], so `1 + 1 + ... + 1` has constant depth.
    fn binary(&mut self, min_precedence: u8) -> Result<Ast, ExprError> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        while let Some((op, precedence)) = self.peek().and_then(binary_op) {
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            rest.push((op, self.binary(precedence + 1)?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Ast::Chain(Box::new(first), rest))
        }
    }

    fn unary(&mut self) -> Result<Ast, ExprError> {
        let op = if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else if self.eat("!") {
            UnaryOp::Not
        } else {
            return self.primary();
        };
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Ast::Unary(op, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Ast, ExprError> {
        match self.next()? {
            Token::Number(n) => Ok(Ast::Literal(Value::Number(n))),
            Token::Str(s) => Ok(Ast::Literal(Value::Str(s))),
            Token::Punct("(") => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Ident(name) => self.identifier(name),
            token => Err(ExprError::UnexpectedToken(token.to_string())),
        }
    }

    fn identifier(&mut self, name: String) -> Result<Ast, ExprError> {
        match name.as_str() {
            "true" => return Ok(Ast::Literal(Value::Bool(true))),
            "false" => return Ok(Ast::Literal(Value::Bool(false))),
            "NaN" => return Ok(Ast::Literal(Value::Number(f64::NAN))),
            "Infinity" => return Ok(Ast::Literal(Value::Number(f64::INFINITY))),
            _ => {}
        }
        if name != "Math" || !self.eat(".") {
            return Err(ExprError::UnknownIdentifier(name));
        }
        let member = match self.next()? {
            Token::Ident(member) => member,
            token => return Err(ExprError::UnexpectedToken(token.to_string())),
        };
        match member.as_str() {
            "PI" => return Ok(Ast::Literal(Value::Number(std::f64::consts::PI))),
            "E" => return Ok(Ast::Literal(Value::Number(std::f64::consts::E))),
            _ => {}
        }
        if !self.eat("(") {
            return Err(ExprError::UnknownIdentifier(format!("Math.{member}")));
        }
        let mut args = Vec::new();
        if !self.eat(")") {
            loop {
                args.push(self.expression()?);
                if self.eat(")") {
                    break;
                }
                self.expect(",")?;
            }
        }
        Ok(Ast::Call(member, args))
    }
}

/// Binary operator and precedence for a token; higher binds tighter.
fn binary_op(token: &Token) -> Option<(BinaryOp, u8)> {
    let Token::Punct(p) = token else {
        return None;
    };
    let op = match *p {
        "||" => (BinaryOp::Or, 1),
        "&&" => (BinaryOp::And, 2),
        "==" => (BinaryOp::LooseEq, 3),
        "!=" => (BinaryOp::LooseNe, 3),
        "===" => (BinaryOp::StrictEq, 3),
        "!==" => (BinaryOp::StrictNe, 3),
        "<" => (BinaryOp::Lt, 4),
        "<=" => (BinaryOp::Le, 4),
        ">" => (BinaryOp::Gt, 4),
        ">=" => (BinaryOp::Ge, 4),
        "+" => (BinaryOp::Add, 5),
        "-" => (BinaryOp::Sub, 5),
        "*" => (BinaryOp::Mul, 6),
        "/" => (BinaryOp::Div, 6),
        "%" => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(op)
}

// ============================================================================
// Evaluation
// ============================================================================

fn eval(ast: &Ast) -> Result<Value, ExprError> {
    match ast {
        Ast::Literal(v) => Ok(v.clone()),
        Ast::Unary(op, operand) => {
            let v = eval(operand)?;
            Ok(match op {
                UnaryOp::Neg => Value::Number(-v.to_number()?),
                UnaryOp::Plus => Value::Number(v.to_number()?),
                UnaryOp::Not => Value::Bool(!v.truthy()),
            })
        }
        Ast::Chain(first, rest) => {
            let mut acc = eval(first)?;
            for (op, operand) in rest {
                acc = match op {
                    BinaryOp::And if !acc.truthy() => acc,
                    BinaryOp::Or if acc.truthy() => acc,
                    BinaryOp::And | BinaryOp::Or => eval(operand)?,
                    _ => binary(*op, acc, eval(operand)?)?,
                };
            }
            Ok(acc)
        }
        Ast::Ternary(condition, then, otherwise) => {
            if eval(condition)?.truthy() {
                eval(then)
            } else {
                eval(otherwise)
            }
        }
        Ast::Call(name, args) => {
            let args = args
                .iter()
                .map(|a| eval(a).and_then(|v| v.to_number()))
                .collect::<Result<Vec<_>, _>>()?;
            call(name, &args).map(Value::Number)
        }
    }
}

fn binary(op: BinaryOp, l: Value, r: Value) -> Result<Value, ExprError> {
    let value = match op {
        BinaryOp::Add => match (&l, &r) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{l}{r}")),
            _ => Value::Number(l.to_number()? + r.to_number()?),
        },
        BinaryOp::Sub => Value::Number(l.to_number()? - r.to_number()?),
        BinaryOp::Mul => Value::Number(l.to_number()? * r.to_number()?),
        BinaryOp::Div => {
            let divisor = r.to_number()?;
            if divisor == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            Value::Number(l.to_number()? / divisor)
        }
        BinaryOp::Rem => {
            let divisor = r.to_number()?;
            if divisor == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            Value::Number(l.to_number()? % divisor)
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&l, &r) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => l.to_number()?.partial_cmp(&r.to_number()?),
            };
            let result = match (op, ordering) {
                (_, None) => false,
                (BinaryOp::Lt, Some(o)) => o.is_lt(),
                (BinaryOp::Le, Some(o)) => o.is_le(),
                (BinaryOp::Gt, Some(o)) => o.is_gt(),
                (_, Some(o)) => o.is_ge(),
            };
            Value::Bool(result)
        }
        BinaryOp::LooseEq => Value::Bool(loose_eq(&l, &r)?),
        BinaryOp::LooseNe => Value::Bool(!loose_eq(&l, &r)?),
        BinaryOp::StrictEq => Value::Bool(l == r),
        BinaryOp::StrictNe => Value::Bool(l != r),
        // `eval` short-circuits these before both sides are known
        BinaryOp::And => {
            if l.truthy() {
                r
            } else {
                l
            }
        }
        BinaryOp::Or => {
            if l.truthy() {
                l
            } else {
                r
            }
        }
    };
    Ok(value)
}

fn loose_eq(l: &Value, r: &Value) -> Result<bool, ExprError> {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        _ => Ok(l.to_number()? == r.to_number()?),
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, ExprError> {
    let arity = |expected: &'static str| ExprError::Arity {
        function: format!("Math.{name}"),
        expected,
        got: args.len(),
    };
    let one = || match args {
        [x] => Ok(*x),
        _ => Err(arity("1")),
    };
    match name {
        "abs" => Ok(one()?.abs()),
        "ceil" => Ok(one()?.ceil()),
        "floor" => Ok(one()?.floor()),
        "round" => Ok((one()? + 0.5).floor()),
        "sqrt" => Ok(one()?.sqrt()),
        "pow" => match args {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(arity("2")),
        },
        "min" | "max" if args.is_empty() => Err(arity("at least 1")),
        "min" => Ok(args.iter().copied().fold(f64::INFINITY, f64::min)),
        "max" => Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        _ => Err(ExprError::UnknownIdentifier(format!("Math.{name}"))),
    }
}
