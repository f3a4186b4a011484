//! Search filters (RFC 4515) and their three-valued evaluation.

use crate::entry::Entry;
use crate::error::{DirectoryError, DirectoryResult};
use crate::schema::{MatchOutcome, RuleKind, Schema, SubstringAssertion};
use std::cmp::Ordering;
use std::fmt;

const OBJECT_CLASS_OID: &str = "2.5.4.0";

/// A search filter over entries.
///
/// Evaluation is three-valued: an assertion on an unknown attribute, or one
/// whose attribute has no usable matching rule, is `Undefined` and never
/// selects an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Present(String),
    Equality { attribute: String, value: String },
    Approx { attribute: String, value: String },
    Substrings { attribute: String, assertion: SubstringAssertion },
    GreaterOrEqual { attribute: String, value: String },
    LessOrEqual { attribute: String, value: String },
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    pub fn present(attribute: impl Into<String>) -> Self {
        Filter::Present(attribute.into())
    }

    pub fn equality(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equality {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// The filter `(objectClass=*)`, true for every entry.
    pub fn everything() -> Self {
        Filter::present("objectClass")
    }

    /// Parse the RFC 4515 string form, e.g. `(&(sn=Tester)(cn=Test*))`.
    ///
    /// A single item without surrounding parentheses (`sn=Tester`) is also
    /// accepted.
    pub fn parse(text: &str) -> DirectoryResult<Filter> {
        let trimmed = text.trim();
        let wrapped;
        let source = if trimmed.starts_with('(') {
            trimmed
        } else {
            wrapped = format!("({trimmed})");
            &wrapped
        };
        let mut parser = FilterParser {
            text: source,
            position: 0,
        };
        let filter = parser
            .filter()
            .map_err(|details| DirectoryError::invalid_filter(text, details))?;
        if parser.position != source.len() {
            return Err(DirectoryError::invalid_filter(text, "trailing characters after filter"));
        }
        Ok(filter)
    }

    /// Evaluate against an entry.
    pub fn evaluate(&self, entry: &Entry, schema: &Schema) -> MatchOutcome {
        match self {
            Filter::And(filters) => {
                let mut outcome = MatchOutcome::Match;
                for filter in filters {
                    match filter.evaluate(entry, schema) {
                        MatchOutcome::NoMatch => return MatchOutcome::NoMatch,
                        MatchOutcome::Undefined => outcome = MatchOutcome::Undefined,
                        MatchOutcome::Match => {}
                    }
                }
                outcome
            }
            Filter::Or(filters) => {
                let mut outcome = MatchOutcome::NoMatch;
                for filter in filters {
                    match filter.evaluate(entry, schema) {
                        MatchOutcome::Match => return MatchOutcome::Match,
                        MatchOutcome::Undefined => outcome = MatchOutcome::Undefined,
                        MatchOutcome::NoMatch => {}
                    }
                }
                outcome
            }
            Filter::Not(filter) => match filter.evaluate(entry, schema) {
                MatchOutcome::Match => MatchOutcome::NoMatch,
                MatchOutcome::NoMatch => MatchOutcome::Match,
                MatchOutcome::Undefined => MatchOutcome::Undefined,
            },
            Filter::Present(attribute) => match schema.attribute(attribute) {
                Some(at) if at.oid == OBJECT_CLASS_OID => MatchOutcome::Match,
                Some(at) => MatchOutcome::from_bool(entry.has_attribute(schema, &at.oid)),
                None => MatchOutcome::NoMatch,
            },
            Filter::Equality { attribute, value } | Filter::Approx { attribute, value } => {
                if is_object_class(schema, attribute) {
                    return object_class_match(entry, schema, value);
                }
                compare_values(entry, schema, attribute, RuleKind::Equality, |rule, v| {
                    rule.equality(v, value)
                })
            }
            Filter::Substrings { attribute, assertion } => {
                compare_values(entry, schema, attribute, RuleKind::Substrings, |rule, v| {
                    rule.substrings(v, assertion)
                })
            }
            Filter::GreaterOrEqual { attribute, value } => {
                compare_values(entry, schema, attribute, RuleKind::Ordering, |rule, v| {
                    Ok(ordering_outcome(rule.ordering(v, value)?, |o| o != Ordering::Less))
                })
            }
            Filter::LessOrEqual { attribute, value } => {
                compare_values(entry, schema, attribute, RuleKind::Ordering, |rule, v| {
                    Ok(ordering_outcome(rule.ordering(v, value)?, |o| o != Ordering::Greater))
                })
            }
        }
    }

    /// Whether the filter evaluates to `Match` for the entry.
    pub fn matches(&self, entry: &Entry, schema: &Schema) -> bool {
        self.evaluate(entry, schema) == MatchOutcome::Match
    }
}

fn is_object_class(schema: &Schema, attribute: &str) -> bool {
    schema.attribute(attribute).is_some_and(|at| at.oid == OBJECT_CLASS_OID)
}

fn object_class_match(entry: &Entry, schema: &Schema, value: &str) -> MatchOutcome {
    let Some(class) = schema.object_class(value) else {
        return MatchOutcome::NoMatch;
    };
    let has_class = std::iter::once(entry.structural_class())
        .chain(entry.auxiliary_classes())
        .any(|c| schema.is_subclass_of(c, &class.oid));
    MatchOutcome::from_bool(has_class)
}

fn ordering_outcome(ordering: Option<Ordering>, accept: impl Fn(Ordering) -> bool) -> MatchOutcome {
    match ordering {
        Some(o) => MatchOutcome::from_bool(accept(o)),
        None => MatchOutcome::Undefined,
    }
}

/// Apply `compare` to every value; any match wins, otherwise any undefined
/// comparison makes the whole assertion undefined.
fn compare_values<F>(entry: &Entry, schema: &Schema, attribute: &str, kind: RuleKind, compare: F) -> MatchOutcome
where
    F: Fn(&crate::schema::MatchingRule, &str) -> DirectoryResult<MatchOutcome>,
{
    let Some(at) = schema.attribute(attribute) else {
        return MatchOutcome::Undefined;
    };
    let rule = match schema.rule_for(&at.oid, kind) {
        Ok(rule) => rule,
        Err(e) => {
            log::trace!("Filter on '{attribute}' is undefined: {e}");
            return MatchOutcome::Undefined;
        }
    };
    let Some(values) = entry.values(schema, &at.oid) else {
        return MatchOutcome::NoMatch;
    };
    let mut outcome = MatchOutcome::NoMatch;
    for value in values {
        match compare(rule, value) {
            Ok(MatchOutcome::Match) => return MatchOutcome::Match,
            Ok(MatchOutcome::NoMatch) => {}
            Ok(MatchOutcome::Undefined) | Err(_) => outcome = MatchOutcome::Undefined,
        }
    }
    outcome
}

struct FilterParser<'a> {
    text: &'a str,
    position: usize,
}

impl FilterParser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.peek() {
            Some(c) if c == expected => {
                self.position += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(format!("expected '{expected}' at offset {}, found '{c}'", self.position)),
            None => Err(format!("expected '{expected}' at end of filter")),
        }
    }

    fn filter(&mut self) -> Result<Filter, String> {
        self.expect('(')?;
        let filter = match self.peek() {
            Some('&') => {
                self.position += 1;
                Filter::And(self.filter_list()?)
            }
            Some('|') => {
                self.position += 1;
                Filter::Or(self.filter_list()?)
            }
            Some('!') => {
                self.position += 1;
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err("unexpected end of filter".to_string()),
        };
        self.expect(')')?;
        Ok(filter)
    }

    fn filter_list(&mut self) -> Result<Vec<Filter>, String> {
        let mut filters = Vec::new();
        while self.peek() == Some('(') {
            filters.push(self.filter()?);
        }
        Ok(filters)
    }

    fn item(&mut self) -> Result<Filter, String> {
        let rest = &self.text[self.position..];
        let end = rest.find(')').ok_or("unterminated filter item")?;
        let item = &rest[..end];
        self.position += end;

        let operator = item
            .find(['=', '~', '>', '<'])
            .ok_or_else(|| format!("'{item}' has no filter operator"))?;
        let attribute = item[..operator].trim();
        if attribute.is_empty() || !attribute.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
            return Err(format!("invalid attribute description '{attribute}'"));
        }
        let attribute = attribute.to_string();
        let after = &item[operator..];
        let (kind, raw) = if let Some(raw) = after.strip_prefix("~=") {
            ('~', raw)
        } else if let Some(raw) = after.strip_prefix(">=") {
            ('>', raw)
        } else if let Some(raw) = after.strip_prefix("<=") {
            ('<', raw)
        } else if let Some(raw) = after.strip_prefix('=') {
            ('=', raw)
        } else {
            return Err(format!("invalid filter operator in '{item}'"));
        };

        Ok(match kind {
            '~' => Filter::Approx {
                attribute,
                value: unescape(raw)?,
            },
            '>' => Filter::GreaterOrEqual {
                attribute,
                value: unescape(raw)?,
            },
            '<' => Filter::LessOrEqual {
                attribute,
                value: unescape(raw)?,
            },
            _ if raw == "*" => Filter::Present(attribute),
            _ if raw.contains('*') => Filter::Substrings {
                attribute,
                assertion: substring_assertion(raw)?,
            },
            _ => Filter::Equality {
                attribute,
                value: unescape(raw)?,
            },
        })
    }
}

fn substring_assertion(raw: &str) -> Result<SubstringAssertion, String> {
    let parts: Vec<&str> = raw.split('*').collect();
    let last = parts.len() - 1;
    let mut assertion = SubstringAssertion::default();
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        let value = unescape(part)?;
        if index == 0 {
            assertion.initial = Some(value);
        } else if index == last {
            assertion.final_value = Some(value);
        } else {
            assertion.any.push(value);
        }
    }
    Ok(assertion)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buffer = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            continue;
        }
        let high = chars.next().and_then(|c| c.to_digit(16));
        let low = chars.next().and_then(|c| c.to_digit(16));
        match (high, low) {
            (Some(h), Some(l)) => bytes.push((h * 16 + l) as u8),
            _ => return Err(format!("invalid escape in '{raw}'")),
        }
    }
    String::from_utf8(bytes).map_err(|_| format!("escaped bytes in '{raw}' are not valid UTF-8"))
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Renders the RFC 4515 string form.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                let op = if matches!(self, Filter::And(_)) { '&' } else { '|' };
                write!(f, "({op}")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                write!(f, ")")
            }
            Filter::Not(filter) => write!(f, "(!{filter})"),
            Filter::Present(attribute) => write!(f, "({attribute}=*)"),
            Filter::Equality { attribute, value } => write!(f, "({attribute}={})", escape(value)),
            Filter::Approx { attribute, value } => write!(f, "({attribute}~={})", escape(value)),
            Filter::GreaterOrEqual { attribute, value } => write!(f, "({attribute}>={})", escape(value)),
            Filter::LessOrEqual { attribute, value } => write!(f, "({attribute}<={})", escape(value)),
            Filter::Substrings { attribute, assertion } => {
                write!(f, "({attribute}=")?;
                if let Some(initial) = &assertion.initial {
                    write!(f, "{}", escape(initial))?;
                }
                write!(f, "*")?;
                for any in &assertion.any {
                    write!(f, "{}*", escape(any))?;
                }
                if let Some(last) = &assertion.final_value {
                    write!(f, "{}", escape(last))?;
                }
                write!(f, ")")
            }
        }
    }
}
