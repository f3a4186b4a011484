//! Matching rules (RFC 4517 §4.2).
//!
//! A rule prepares both values (case folding, insignificant space removal,
//! numeric parsing) and then compares the prepared forms. Rules that the
//! standard declares but this directory does not implement can still be
//! referenced by a schema; invoking them fails with `unwillingToPerform`.

use super::syntax::{self, parse_generalized_time};
use crate::error::{DirectoryError, DirectoryResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

/// The assertion kind a rule serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Equality,
    Ordering,
    Substrings,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Equality => write!(f, "equality"),
            RuleKind::Ordering => write!(f, "ordering"),
            RuleKind::Substrings => write!(f, "substrings"),
        }
    }
}

/// Three-valued result of applying a rule (RFC 4511 §4.5.1.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Match,
    NoMatch,
    /// The rule cannot be evaluated for these values
    Undefined,
}

impl MatchOutcome {
    pub fn is_match(self) -> bool {
        self == MatchOutcome::Match
    }

    pub(crate) fn from_bool(matched: bool) -> Self {
        if matched {
            MatchOutcome::Match
        } else {
            MatchOutcome::NoMatch
        }
    }
}

/// The components of a substrings assertion: `initial*any*...*final`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringAssertion {
    pub initial: Option<String>,
    pub any: Vec<String>,
    pub final_value: Option<String>,
}

#[derive(Clone, Copy)]
enum Comparison {
    /// Compare string preparations; `None` from the preparation is undefined
    Prepared(fn(&str) -> Option<String>),
    Integer,
    GeneralizedTime,
    Unimplemented,
}

/// A matching rule identified by OID and name.
#[derive(Clone, Serialize)]
pub struct MatchingRule {
    oid: &'static str,
    name: &'static str,
    syntax: &'static str,
    kind: RuleKind,
    #[serde(skip)]
    comparison: Comparison,
}

impl fmt::Debug for MatchingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchingRule")
            .field("oid", &self.oid)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl PartialEq for MatchingRule {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for MatchingRule {}

impl MatchingRule {
    const fn new(
        oid: &'static str,
        name: &'static str,
        syntax: &'static str,
        kind: RuleKind,
        comparison: Comparison,
    ) -> Self {
        Self {
            oid,
            name,
            syntax,
            kind,
            comparison,
        }
    }

    pub fn oid(&self) -> &'static str {
        self.oid
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// OID of the assertion syntax.
    pub fn syntax(&self) -> &'static str {
        self.syntax
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_implemented(&self) -> bool {
        !matches!(self.comparison, Comparison::Unimplemented)
    }

    fn unimplemented(&self) -> DirectoryError {
        DirectoryError::unwilling(format!("matching rule {} is not implemented", self.name))
    }

    fn prepare(&self, value: &str) -> DirectoryResult<Option<String>> {
        match self.comparison {
            Comparison::Prepared(prepare) => Ok(prepare(value)),
            Comparison::Integer => Ok(parse_integer(value).map(|n| n.to_string())),
            Comparison::GeneralizedTime => Ok(parse_generalized_time(value).map(|t| t.to_string())),
            Comparison::Unimplemented => Err(self.unimplemented()),
        }
    }

    /// Apply the rule as an equality match.
    pub fn equality(&self, attribute_value: &str, assertion: &str) -> DirectoryResult<MatchOutcome> {
        match (self.prepare(attribute_value)?, self.prepare(assertion)?) {
            (Some(a), Some(b)) => Ok(MatchOutcome::from_bool(a == b)),
            _ => Ok(MatchOutcome::Undefined),
        }
    }

    /// Apply the rule as an ordering; `None` means the order is undefined.
    pub fn ordering(&self, attribute_value: &str, assertion: &str) -> DirectoryResult<Option<Ordering>> {
        match self.comparison {
            Comparison::Integer => {
                Ok(parse_integer(attribute_value).zip(parse_integer(assertion)).map(|(a, b)| a.cmp(&b)))
            }
            Comparison::GeneralizedTime => Ok(parse_generalized_time(attribute_value)
                .zip(parse_generalized_time(assertion))
                .map(|(a, b)| a.cmp(&b))),
            Comparison::Prepared(prepare) => {
                Ok(prepare(attribute_value).zip(prepare(assertion)).map(|(a, b)| a.cmp(&b)))
            }
            Comparison::Unimplemented => Err(self.unimplemented()),
        }
    }

    /// Apply the rule as a substrings match.
    pub fn substrings(
        &self,
        attribute_value: &str,
        assertion: &SubstringAssertion,
    ) -> DirectoryResult<MatchOutcome> {
        let Some(value) = self.prepare(attribute_value)? else {
            return Ok(MatchOutcome::Undefined);
        };
        let mut pieces = Vec::with_capacity(assertion.any.len() + 2);
        for piece in assertion
            .initial
            .iter()
            .chain(assertion.any.iter())
            .chain(assertion.final_value.iter())
        {
            match self.prepare(piece)? {
                Some(prepared) => pieces.push(prepared),
                None => return Ok(MatchOutcome::Undefined),
            }
        }
        let mut pieces = pieces.into_iter();
        let mut position = 0;
        if assertion.initial.is_some() {
            let initial = pieces.next().unwrap_or_default();
            if !value.starts_with(&initial) {
                return Ok(MatchOutcome::NoMatch);
            }
            position = initial.len();
        }
        for _ in &assertion.any {
            let any = pieces.next().unwrap_or_default();
            match value[position..].find(&any) {
                Some(offset) => position += offset + any.len(),
                None => return Ok(MatchOutcome::NoMatch),
            }
        }
        if assertion.final_value.is_some() {
            let last = pieces.next().unwrap_or_default();
            return Ok(MatchOutcome::from_bool(
                value.len() >= position + last.len() && value[position..].ends_with(&last),
            ));
        }
        Ok(MatchOutcome::Match)
    }
}

fn parse_integer(value: &str) -> Option<i128> {
    value.trim().parse().ok()
}

fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn case_ignore(value: &str) -> Option<String> {
    Some(collapse_spaces(value).to_lowercase())
}

fn case_exact(value: &str) -> Option<String> {
    Some(collapse_spaces(value))
}

fn case_ignore_ia5(value: &str) -> Option<String> {
    value.is_ascii().then(|| collapse_spaces(value).to_ascii_lowercase())
}

fn case_exact_ia5(value: &str) -> Option<String> {
    value.is_ascii().then(|| collapse_spaces(value))
}

fn numeric_string(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| *c != ' ').collect();
    digits.chars().all(|c| c.is_ascii_digit()).then_some(digits)
}

fn telephone_number(value: &str) -> Option<String> {
    Some(
        value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_lowercase)
            .collect(),
    )
}

fn octet_string(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn boolean(value: &str) -> Option<String> {
    matches!(value, "TRUE" | "FALSE").then(|| value.to_string())
}

/// Descriptors compare case-insensitively; numeric OIDs literally.
fn object_identifier(value: &str) -> Option<String> {
    Some(value.trim().to_ascii_lowercase())
}

/// Textual DN preparation: spaces around separators dropped, case folded.
///
/// Attribute names are not mapped to OIDs here.
fn distinguished_name(value: &str) -> Option<String> {
    let rdns: Vec<String> = value
        .split(',')
        .map(|rdn| {
            rdn.split('+')
                .map(|ava| match ava.split_once('=') {
                    Some((name, v)) => format!("{}={}", name.trim().to_ascii_lowercase(), case_ignore(v).unwrap_or_default()),
                    None => ava.trim().to_lowercase(),
                })
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect();
    Some(rdns.join(","))
}

fn uuid(value: &str) -> Option<String> {
    syntax::syntax(syntax::UUID)
        .and_then(|s| s.validate(value).ok())
        .filter(|valid| *valid)
        .and_then(|_| Uuid::parse_str(value).ok())
        .map(|parsed| parsed.hyphenated().to_string())
}

use Comparison::{GeneralizedTime, Integer, Prepared, Unimplemented};
use RuleKind::{Equality, Ordering as Order, Substrings};

const SUBSTRING_ASSERTION: &str = "1.3.6.1.4.1.1466.115.121.1.58";

static MATCHING_RULES: &[MatchingRule] = &[
    MatchingRule::new("2.5.13.0", "objectIdentifierMatch", syntax::OID, Equality, Prepared(object_identifier)),
    MatchingRule::new("2.5.13.1", "distinguishedNameMatch", syntax::DN, Equality, Prepared(distinguished_name)),
    MatchingRule::new("2.5.13.2", "caseIgnoreMatch", syntax::DIRECTORY_STRING, Equality, Prepared(case_ignore)),
    MatchingRule::new("2.5.13.3", "caseIgnoreOrderingMatch", syntax::DIRECTORY_STRING, Order, Prepared(case_ignore)),
    MatchingRule::new("2.5.13.4", "caseIgnoreSubstringsMatch", SUBSTRING_ASSERTION, Substrings, Prepared(case_ignore)),
    MatchingRule::new("2.5.13.5", "caseExactMatch", syntax::DIRECTORY_STRING, Equality, Prepared(case_exact)),
    MatchingRule::new("2.5.13.6", "caseExactOrderingMatch", syntax::DIRECTORY_STRING, Order, Prepared(case_exact)),
    MatchingRule::new("2.5.13.7", "caseExactSubstringsMatch", SUBSTRING_ASSERTION, Substrings, Prepared(case_exact)),
    MatchingRule::new("2.5.13.8", "numericStringMatch", syntax::NUMERIC_STRING, Equality, Prepared(numeric_string)),
    MatchingRule::new("2.5.13.9", "numericStringOrderingMatch", syntax::NUMERIC_STRING, Order, Prepared(numeric_string)),
    MatchingRule::new("2.5.13.10", "numericStringSubstringsMatch", SUBSTRING_ASSERTION, Substrings, Prepared(numeric_string)),
    MatchingRule::new("2.5.13.11", "caseIgnoreListMatch", syntax::POSTAL_ADDRESS, Equality, Unimplemented),
    MatchingRule::new("2.5.13.12", "caseIgnoreListSubstringsMatch", SUBSTRING_ASSERTION, Substrings, Unimplemented),
    MatchingRule::new("2.5.13.13", "booleanMatch", syntax::BOOLEAN, Equality, Prepared(boolean)),
    MatchingRule::new("2.5.13.14", "integerMatch", syntax::INTEGER, Equality, Integer),
    MatchingRule::new("2.5.13.15", "integerOrderingMatch", syntax::INTEGER, Order, Integer),
    MatchingRule::new("2.5.13.16", "bitStringMatch", syntax::BIT_STRING, Equality, Unimplemented),
    MatchingRule::new("2.5.13.17", "octetStringMatch", syntax::OCTET_STRING, Equality, Prepared(octet_string)),
    MatchingRule::new("2.5.13.18", "octetStringOrderingMatch", syntax::OCTET_STRING, Order, Prepared(octet_string)),
    MatchingRule::new("2.5.13.20", "telephoneNumberMatch", syntax::TELEPHONE_NUMBER, Equality, Prepared(telephone_number)),
    MatchingRule::new("2.5.13.21", "telephoneNumberSubstringsMatch", SUBSTRING_ASSERTION, Substrings, Prepared(telephone_number)),
    MatchingRule::new("2.5.13.22", "presentationAddressMatch", "1.3.6.1.4.1.1466.115.121.1.43", Equality, Unimplemented),
    MatchingRule::new("2.5.13.23", "uniqueMemberMatch", "1.3.6.1.4.1.1466.115.121.1.34", Equality, Unimplemented),
    MatchingRule::new("2.5.13.24", "protocolInformationMatch", "1.3.6.1.4.1.1466.115.121.1.42", Equality, Unimplemented),
    MatchingRule::new("2.5.13.27", "generalizedTimeMatch", syntax::GENERALIZED_TIME, Equality, GeneralizedTime),
    MatchingRule::new("2.5.13.28", "generalizedTimeOrderingMatch", syntax::GENERALIZED_TIME, Order, GeneralizedTime),
    MatchingRule::new("2.5.13.29", "integerFirstComponentMatch", syntax::INTEGER, Equality, Unimplemented),
    MatchingRule::new("2.5.13.30", "objectIdentifierFirstComponentMatch", syntax::OID, Equality, Unimplemented),
    MatchingRule::new("2.5.13.31", "directoryStringFirstComponentMatch", syntax::DIRECTORY_STRING, Equality, Unimplemented),
    MatchingRule::new("2.5.13.32", "wordMatch", syntax::DIRECTORY_STRING, Equality, Unimplemented),
    MatchingRule::new("2.5.13.33", "keywordMatch", syntax::DIRECTORY_STRING, Equality, Unimplemented),
    MatchingRule::new("1.3.6.1.4.1.1466.109.114.1", "caseExactIA5Match", syntax::IA5_STRING, Equality, Prepared(case_exact_ia5)),
    MatchingRule::new("1.3.6.1.4.1.1466.109.114.2", "caseIgnoreIA5Match", syntax::IA5_STRING, Equality, Prepared(case_ignore_ia5)),
    MatchingRule::new("1.3.6.1.4.1.1466.109.114.3", "caseIgnoreIA5SubstringsMatch", SUBSTRING_ASSERTION, Substrings, Prepared(case_ignore_ia5)),
    MatchingRule::new("1.3.6.1.1.16.2", "uuidMatch", syntax::UUID, Equality, Prepared(uuid)),
    MatchingRule::new("1.3.6.1.1.16.3", "uuidOrderingMatch", syntax::UUID, Order, Prepared(uuid)),
];

static RULE_INDEX: LazyLock<HashMap<String, &'static MatchingRule>> = LazyLock::new(|| {
    let mut index = HashMap::with_capacity(MATCHING_RULES.len() * 2);
    for rule in MATCHING_RULES {
        index.insert(rule.oid.to_string(), rule);
        index.insert(rule.name.to_ascii_lowercase(), rule);
    }
    index
});

/// Look a matching rule up by name (case-insensitive) or numeric OID.
pub fn matching_rule(name_or_oid: &str) -> Option<&'static MatchingRule> {
    RULE_INDEX.get(&name_or_oid.trim().to_ascii_lowercase()).copied()
}

/// Every catalogued matching rule.
pub fn all_matching_rules() -> &'static [MatchingRule] {
    MATCHING_RULES
}
