//! `${column}` templates.

use datagen_core::Row;
use std::fmt;
use tracing::warn;

/// Piece of a template: text kept as is, or a column to substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Literal(String),
    Column(String),
}

/// Characters allowed in a placeholder or `$column` name.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Match `${name}` at the start of `text`; returns the name and the bytes consumed.
pub(crate) fn match_placeholder(text: &str) -> Option<(&str, usize)> {
    let rest = text.strip_prefix("${")?;
    let end = rest.find('}')?;
    let name = &rest[..end];
    if name.is_empty() || !name.chars().all(is_name_char) {
        return None;
    }
    Some((name, end + 3))
}

/// Append literal text, merging with a preceding literal fragment.
pub(crate) fn push_literal(fragments: &mut Vec<Fragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match fragments.last_mut() {
        Some(Fragment::Literal(last)) => last.push_str(text),
        _ => fragments.push(Fragment::Literal(text.to_string())),
    }
}

/// A literal/placeholder template, e.g. `Hello ${name}!`.
///
/// An unterminated `${` or a placeholder with an invalid name stays literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    fragments: Vec<Fragment>,
}

impl Injection {
    /// Split a template into fragments.
    pub fn parse(template: &str) -> Self {
        let mut fragments = Vec::new();
        let mut literal_start = 0;
        let mut cursor = 0;

        while let Some(offset) = template[cursor..].find("${") {
            let start = cursor + offset;
            match match_placeholder(&template[start..]) {
                Some((name, consumed)) => {
                    push_literal(&mut fragments, &template[literal_start..start]);
                    fragments.push(Fragment::Column(name.to_string()));
                    cursor = start + consumed;
                    literal_start = cursor;
                }
                None => cursor = start + 2,
            }
        }
        push_literal(&mut fragments, &template[literal_start..]);

        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Columns referenced by placeholders, in order of appearance.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Column(name) => Some(name.as_str()),
            Fragment::Literal(_) => None,
        })
    }

    /// Substitute the row's values into the template.
    ///
    /// A column missing from the row contributes an empty string.
    pub fn evaluate(&self, row: &Row) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => out.push_str(text),
                Fragment::Column(name) => match row.get_string(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        warn!(row = row.index(), "Injection column '{name}' is not set, leaving it empty");
                    }
                },
            }
        }
        out
    }
}

impl fmt::Display for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => f.write_str(text)?,
                Fragment::Column(name) => write!(f, "${{{name}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragments() {
        let injection = Injection::parse("Hello ${name}, you live in ${city}");
        assert_eq!(
            injection.fragments(),
            &[
                Fragment::Literal("Hello ".to_string()),
                Fragment::Column("name".to_string()),
                Fragment::Literal(", you live in ".to_string()),
                Fragment::Column("city".to_string()),
            ]
        );
        assert_eq!(injection.columns().collect::<Vec<_>>(), vec!["name", "city"]);
    }

    #[test]
    fn test_hello_ann() {
        let injection = Injection::parse("Hello ${name}!");
        let row = Row::builder(0).field("name", "Ann").build();
        assert_eq!(injection.evaluate(&row), "Hello Ann!");
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        let injection = Injection::parse("cost: ${ and ${x");
        assert_eq!(
            injection.fragments(),
            &[Fragment::Literal("cost: ${ and ${x".to_string())]
        );
        let injection = Injection::parse("${bad name} ${ok}");
        assert_eq!(
            injection.fragments(),
            &[
                Fragment::Literal("${bad name} ".to_string()),
                Fragment::Column("ok".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_column_is_empty() {
        let injection = Injection::parse("[${a}|${b}]");
        let row = Row::builder(0).field("a", 1).build();
        assert_eq!(injection.evaluate(&row), "[1|]");
    }

    #[test]
    fn test_display_roundtrips_template() {
        let template = "id-${n}-x";
        assert_eq!(Injection::parse(template).to_string(), template);
    }
}
