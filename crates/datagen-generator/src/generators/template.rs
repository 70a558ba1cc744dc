//! Text built from a character-class template (`string_regex` fields).
//!
//! A template is literal text with groups of the form `[choices]{count}`.
//! Each group emits `count` picks from its choices. Choices are ranges
//! such as `a-z` or `0-9`, or comma separated tokens that may be longer
//! than one character.
//!
//! ```text
//!   "[A-Z]{2}-[0-9]{3}"      -> "QX-042"
//!   "[red,green]{1}_[a-c]{2}" -> "green_ca"
//! ```

use crate::error::GeneratorError;
use rand::Rng;
use regex::Regex;
use tracing::debug;

/// Characters a range walks through, in order.
const RANGE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const GROUP: &str = r"\[([^\]]*)\]\{([0-9]*)\}";
const RANGE: &str = r"[A-Za-z0-9]-[A-Za-z0-9]";

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Choice { choices: Vec<String>, count: usize },
}

/// A parsed `string_regex` template.
#[derive(Debug, Clone, PartialEq)]
pub struct CharTemplate {
    parts: Vec<Part>,
}

impl CharTemplate {
    pub fn parse(field: &str, template: &str) -> Result<Self, GeneratorError> {
        let invalid = |reason: String| GeneratorError::InvalidTemplate {
            field: field.to_string(),
            template: template.to_string(),
            reason,
        };
        let group = Regex::new(GROUP).map_err(|e| invalid(e.to_string()))?;
        let range = Regex::new(RANGE).map_err(|e| invalid(e.to_string()))?;

        let mut parts = Vec::new();
        let mut cursor = 0;
        for captures in group.captures_iter(template) {
            let (Some(whole), Some(set), Some(count)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            if cursor < whole.start() {
                parts.push(Part::Literal(template[cursor..whole.start()].to_string()));
            }
            let count = count.as_str().parse::<usize>().map_err(|_| {
                invalid(format!("group '{}' has no repeat count", whole.as_str()))
            })?;
            let choices = expand_choices(&range, set.as_str());
            if choices.is_empty() {
                return Err(invalid(format!("group '{}' has no choices", whole.as_str())));
            }
            debug!(
                "Field '{field}': group {} repeats {count} time(s) over {} choice(s)",
                whole.as_str(),
                choices.len()
            );
            parts.push(Part::Choice { choices, count });
            cursor = whole.end();
        }
        if cursor < template.len() {
            parts.push(Part::Literal(template[cursor..].to_string()));
        }
        Ok(Self { parts })
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> String {
        let mut text = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(literal) => text.push_str(literal),
                Part::Choice { choices, count } => {
                    for _ in 0..*count {
                        text.push_str(&choices[rng.random_range(0..choices.len())]);
                    }
                }
            }
        }
        text
    }
}

/// Ranges first, in order of appearance, then the comma separated tokens
/// left once ranges are removed.
fn expand_choices(range: &Regex, set: &str) -> Vec<String> {
    let mut choices = Vec::new();
    for found in range.find_iter(set) {
        let mut ends = found.as_str().chars();
        let (Some(first), Some(last)) = (ends.next(), ends.next_back()) else {
            continue;
        };
        let (Some(from), Some(to)) = (RANGE_ALPHABET.find(first), RANGE_ALPHABET.find(last))
        else {
            continue;
        };
        if from <= to {
            choices.extend(RANGE_ALPHABET[from..=to].chars().map(String::from));
        }
    }
    let rest = range.replace_all(set, "");
    choices.extend(
        rest.split(',')
            .filter(|token| !token.is_empty())
            .map(str::to_string),
    );
    choices
}
