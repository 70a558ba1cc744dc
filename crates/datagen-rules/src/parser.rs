//! Tokenizer and parser for rule lines.
//!
//! A rule line is a condition text plus an output text. The condition text
//! is either one of the keywords `formula`, `link`, `injection`, `default`
//! (case-insensitive), or a sequence of atoms separated by `&` / `|`:
//!
//! ```text
//! $age>60 | $city=Paris & $vip=true
//! ```
//!
//! Parsing only records names. Types are resolved later by
//! [`UnboundRuleSet::bind`](crate::UnboundRuleSet::bind).
//!
//! # Error recovery
//!
//! - an operator token other than `&` or `|` is read as `&`
//! - two atoms with no operator between them are joined by `&`
//! - a leading or trailing operator is dropped
//! - a word that is neither an atom nor an operator where an atom is
//!   expected, or a malformed atom, turns the whole line into
//!   [`UnboundLine::Broken`]
//!
//! Every recovery is logged as a warning.

use crate::error::ParseError;
use crate::formula::FormulaTemplate;
use crate::injection::Injection;
use crate::link::LinkPath;
use crate::operators::{CompareOp, LogicalOp};
use std::fmt;
use tracing::{debug, warn};

/// Keywords that turn a line into a special line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Formula,
    Link,
    Injection,
    Default,
}

impl Keyword {
    /// Case-insensitive keyword lookup.
    pub fn parse(word: &str) -> Option<Keyword> {
        [
            Keyword::Formula,
            Keyword::Link,
            Keyword::Injection,
            Keyword::Default,
        ]
        .into_iter()
        .find(|k| word.eq_ignore_ascii_case(k.as_str()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Formula => "formula",
            Keyword::Link => "link",
            Keyword::Injection => "injection",
            Keyword::Default => "default",
        }
    }
}

/// One whitespace-delimited word of a condition text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    Atom(&'a str),
    Operator(LogicalOp),
    Other(&'a str),
}

/// Split a condition text into tokens.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    text.split_whitespace()
        .map(|word| {
            if let Some(op) = LogicalOp::from_token(word) {
                Token::Operator(op)
            } else if CompareOp::detect(word).is_some() {
                Token::Atom(word)
            } else if let Some(keyword) = Keyword::parse(word) {
                Token::Keyword(keyword)
            } else {
                Token::Other(word)
            }
        })
        .collect()
}

/// Right-hand side of an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Column(String),
    Literal(String),
}

/// A parsed comparison, before types are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub left: String,
    pub op: CompareOp,
    pub right: Operand,
}

impl Atom {
    /// Parse `$left<op>right`.
    ///
    /// The operator is the first of `=`, `!`, `<`, `>` present in the text.
    /// The right side is the text between the first and the second occurrence
    /// of the operator character, so `$a!=5` compares column `a!` with `5`.
    pub fn parse(text: &str) -> Result<Atom, ParseError> {
        let op = CompareOp::detect(text)
            .ok_or_else(|| ParseError::MissingOperator(text.to_string()))?;
        let mut parts = text.trim().split(op.symbol());
        let left = parts.next().unwrap_or_default();
        let right = parts.next().unwrap_or_default();

        let left = left.strip_prefix('$').unwrap_or(left);
        if left.is_empty() {
            return Err(ParseError::EmptyColumn(text.to_string()));
        }

        let right = match right.strip_prefix('$') {
            Some("") => return Err(ParseError::EmptyColumn(text.to_string())),
            Some(column) => Operand::Column(column.to_string()),
            None => Operand::Literal(right.to_string()),
        };

        Ok(Atom {
            left: left.to_string(),
            op,
            right,
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Operand::Column(column) => write!(f, "${}{}${}", self.left, self.op.symbol(), column),
            Operand::Literal(literal) => write!(f, "${}{}{}", self.left, self.op.symbol(), literal),
        }
    }
}

/// A parsed line, before binding.
#[derive(Debug, Clone, PartialEq)]
pub enum UnboundLine {
    /// One or more atoms; `operators.len() == atoms.len() - 1`
    Conditions {
        atoms: Vec<Atom>,
        operators: Vec<LogicalOp>,
        output: String,
    },
    Formula(FormulaTemplate),
    Link(LinkPath),
    Injection(Injection),
    Default(String),
    /// A line that failed to parse; never satisfied
    Broken(ParseError),
}

/// Parse one rule line.
pub fn parse_line(condition: &str, output: &str) -> UnboundLine {
    match try_parse_line(condition, output) {
        Ok(line) => line,
        Err(e) => {
            warn!("Rule line '{condition}' is never satisfied: {e}");
            UnboundLine::Broken(e)
        }
    }
}

fn try_parse_line(condition: &str, output: &str) -> Result<UnboundLine, ParseError> {
    let tokens = tokenize(condition);

    if let Some(Token::Keyword(keyword)) = tokens.first() {
        if tokens.len() > 1 {
            warn!(
                "Ignoring text after '{}' in rule line '{condition}'",
                keyword.as_str()
            );
        }
        debug!("Found a {} line", keyword.as_str());
        return special_line(*keyword, output);
    }

    let mut atoms = Vec::new();
    let mut operators = Vec::new();
    let mut expect_atom = true;

    for token in tokens {
        match (expect_atom, token) {
            (true, Token::Atom(text)) => {
                atoms.push(Atom::parse(text)?);
                expect_atom = false;
            }
            (true, Token::Operator(op)) => {
                warn!("Dropping operator {op} with no condition before it in '{condition}'");
            }
            (true, Token::Keyword(_)) | (true, Token::Other(_)) => {
                let word = match token {
                    Token::Keyword(k) => k.as_str().to_string(),
                    Token::Other(w) => w.to_string(),
                    _ => String::new(),
                };
                return Err(ParseError::MissingOperator(word));
            }
            (false, Token::Operator(op)) => {
                operators.push(op);
                expect_atom = true;
            }
            (false, Token::Atom(text)) => {
                warn!("Missing operator before '{text}' in '{condition}', using AND");
                operators.push(LogicalOp::And);
                atoms.push(Atom::parse(text)?);
            }
            (false, Token::Keyword(_)) | (false, Token::Other(_)) => {
                warn!("Unknown operator in '{condition}', using AND");
                operators.push(LogicalOp::And);
                expect_atom = true;
            }
        }
    }

    if atoms.is_empty() {
        return Err(ParseError::EmptyLine);
    }
    if operators.len() == atoms.len() {
        warn!("Dropping trailing operator in '{condition}'");
        operators.pop();
    }

    Ok(UnboundLine::Conditions {
        atoms,
        operators,
        output: output.to_string(),
    })
}

fn special_line(keyword: Keyword, output: &str) -> Result<UnboundLine, ParseError> {
    match keyword {
        Keyword::Default => Ok(UnboundLine::Default(output.to_string())),
        Keyword::Formula => {
            if output.trim().is_empty() {
                return Err(ParseError::EmptyBody("formula"));
            }
            Ok(UnboundLine::Formula(FormulaTemplate::parse(output)))
        }
        Keyword::Link => LinkPath::parse(output).map(UnboundLine::Link),
        Keyword::Injection => Ok(UnboundLine::Injection(Injection::parse(output))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(left: &str, op: CompareOp, right: Operand) -> Atom {
        Atom {
            left: left.to_string(),
            op,
            right,
        }
    }

    fn lit(text: &str) -> Operand {
        Operand::Literal(text.to_string())
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("$a=1  & $b>$c | x Default");
        assert_eq!(
            tokens,
            vec![
                Token::Atom("$a=1"),
                Token::Operator(LogicalOp::And),
                Token::Atom("$b>$c"),
                Token::Operator(LogicalOp::Or),
                Token::Other("x"),
                Token::Keyword(Keyword::Default),
            ]
        );
    }

    #[test]
    fn test_parse_atoms() {
        assert_eq!(
            Atom::parse("$age<30").unwrap(),
            atom("age", CompareOp::Lt, lit("30"))
        );
        assert_eq!(
            Atom::parse("$a>$b").unwrap(),
            atom("a", CompareOp::Gt, Operand::Column("b".to_string()))
        );
        // Sigil on the left side is optional
        assert_eq!(
            Atom::parse("a=1").unwrap(),
            atom("a", CompareOp::Eq, lit("1"))
        );
        assert_eq!(
            Atom::parse("$a=").unwrap(),
            atom("a", CompareOp::Eq, lit(""))
        );
    }

    #[test]
    fn test_operator_detection_quirks() {
        // `=` wins over `!`: the left column keeps the bang
        assert_eq!(
            Atom::parse("$a!=5").unwrap(),
            atom("a!", CompareOp::Eq, lit("5"))
        );
        // Right side stops at the second occurrence of the operator
        assert_eq!(
            Atom::parse("$a=b=c").unwrap(),
            atom("a", CompareOp::Eq, lit("b"))
        );
        // A literal containing an operator character splits there
        assert_eq!(
            Atom::parse("$tag!a<b").unwrap(),
            atom("tag", CompareOp::Ne, lit("a<b"))
        );
    }

    #[test]
    fn test_parse_atom_errors() {
        assert_eq!(
            Atom::parse("$=1"),
            Err(ParseError::EmptyColumn("$=1".to_string()))
        );
        assert_eq!(
            Atom::parse("$a=$"),
            Err(ParseError::EmptyColumn("$a=$".to_string()))
        );
        assert!(matches!(
            Atom::parse("abc"),
            Err(ParseError::MissingOperator(_))
        ));
    }

    #[test]
    fn test_parse_combined_line() {
        let line = parse_line("a=1 & b=2 | c=3", "x");
        let UnboundLine::Conditions {
            atoms,
            operators,
            output,
        } = line
        else {
            panic!("expected conditions");
        };
        assert_eq!(atoms.len(), 3);
        assert_eq!(operators, vec![LogicalOp::And, LogicalOp::Or]);
        assert_eq!(output, "x");
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            parse_line("DEFAULT", "fallback"),
            UnboundLine::Default("fallback".to_string())
        );
        assert!(matches!(
            parse_line("Formula", "$x + 1"),
            UnboundLine::Formula(_)
        ));
        assert!(matches!(
            parse_line("injection", "Hi ${n}"),
            UnboundLine::Injection(_)
        ));
        assert!(matches!(
            parse_line("link", "$city.lat"),
            UnboundLine::Link(_)
        ));
    }

    #[test]
    fn test_unknown_operator_defaults_to_and() {
        let UnboundLine::Conditions { operators, .. } = parse_line("a=1 AND b=2", "x") else {
            panic!("expected conditions");
        };
        assert_eq!(operators, vec![LogicalOp::And]);
    }

    #[test]
    fn test_missing_operator_implies_and() {
        let UnboundLine::Conditions {
            atoms, operators, ..
        } = parse_line("a=1 b=2", "x")
        else {
            panic!("expected conditions");
        };
        assert_eq!(atoms.len(), 2);
        assert_eq!(operators, vec![LogicalOp::And]);
    }

    #[test]
    fn test_dangling_operators_dropped() {
        let UnboundLine::Conditions {
            atoms, operators, ..
        } = parse_line("| a=1 &", "x")
        else {
            panic!("expected conditions");
        };
        assert_eq!(atoms.len(), 1);
        assert!(operators.is_empty());
    }

    #[test]
    fn test_broken_lines() {
        assert_eq!(
            parse_line("   ", "x"),
            UnboundLine::Broken(ParseError::EmptyLine)
        );
        assert_eq!(
            parse_line("a=1 & junk", "x"),
            UnboundLine::Broken(ParseError::MissingOperator("junk".to_string()))
        );
        assert_eq!(
            parse_line("link", "city"),
            UnboundLine::Broken(ParseError::MalformedLink("city".to_string()))
        );
        assert_eq!(
            parse_line("formula", " "),
            UnboundLine::Broken(ParseError::EmptyBody("formula"))
        );
    }
}
