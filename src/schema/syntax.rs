//! LDAP value syntaxes (RFC 4517 §3.3).
//!
//! The catalog is a read-only table built on first use and looked up by OID
//! through [`syntax`]. Each syntax either validates values, accepts any value
//! explicitly, or is declared without an implementation, in which case
//! validation fails with `unwillingToPerform`.

use crate::error::{DirectoryError, DirectoryResult};
use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;

/// How a syntax checks values.
#[derive(Clone, Copy)]
pub enum SyntaxCheck {
    /// Value is checked by the function
    Validate(fn(&str) -> bool),
    /// Any value is explicitly allowed
    AcceptAny,
    /// Declared by the standard but not implemented here
    Unimplemented,
}

/// A value syntax, identified by OID.
#[derive(Clone, Serialize)]
pub struct Syntax {
    oid: &'static str,
    description: &'static str,
    #[serde(skip)]
    check: SyntaxCheck,
}

impl Syntax {
    const fn new(oid: &'static str, description: &'static str, check: SyntaxCheck) -> Self {
        Self {
            oid,
            description,
            check,
        }
    }

    pub fn oid(&self) -> &'static str {
        self.oid
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn is_implemented(&self) -> bool {
        !matches!(self.check, SyntaxCheck::Unimplemented)
    }

    /// Check a value against this syntax.
    ///
    /// Returns `Ok(false)` when the value is malformed and an
    /// `UnwillingToPerform` error when the syntax has no implementation.
    pub fn validate(&self, value: &str) -> DirectoryResult<bool> {
        match self.check {
            SyntaxCheck::Validate(check) => Ok(check(value)),
            SyntaxCheck::AcceptAny => Ok(true),
            SyntaxCheck::Unimplemented => Err(DirectoryError::unwilling(format!(
                "syntax {} ({}) is not implemented",
                self.description, self.oid
            ))),
        }
    }
}

impl PartialEq for Syntax {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for Syntax {}

impl std::fmt::Debug for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Syntax")
            .field("oid", &self.oid)
            .field("description", &self.description)
            .finish()
    }
}

pub const BIT_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.6";
pub const BOOLEAN: &str = "1.3.6.1.4.1.1466.115.121.1.7";
pub const COUNTRY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.11";
pub const DN: &str = "1.3.6.1.4.1.1466.115.121.1.12";
pub const DIRECTORY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.15";
pub const GENERALIZED_TIME: &str = "1.3.6.1.4.1.1466.115.121.1.24";
pub const IA5_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.26";
pub const INTEGER: &str = "1.3.6.1.4.1.1466.115.121.1.27";
pub const NUMERIC_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.36";
pub const OID: &str = "1.3.6.1.4.1.1466.115.121.1.38";
pub const OCTET_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.40";
pub const POSTAL_ADDRESS: &str = "1.3.6.1.4.1.1466.115.121.1.41";
pub const PRINTABLE_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.44";
pub const TELEPHONE_NUMBER: &str = "1.3.6.1.4.1.1466.115.121.1.50";
pub const UUID: &str = "1.3.6.1.1.16.1";

static SYNTAXES: &[Syntax] = &[
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.3", "Attribute Type Description", SyntaxCheck::AcceptAny),
    Syntax::new(BIT_STRING, "Bit String", SyntaxCheck::Validate(is_bit_string)),
    Syntax::new(BOOLEAN, "Boolean", SyntaxCheck::Validate(is_boolean)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.8", "Certificate", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.9", "Certificate List", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.10", "Certificate Pair", SyntaxCheck::AcceptAny),
    Syntax::new(COUNTRY_STRING, "Country String", SyntaxCheck::Validate(is_country_string)),
    Syntax::new(DN, "DN", SyntaxCheck::Validate(is_dn_string)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.14", "Delivery Method", SyntaxCheck::Unimplemented),
    Syntax::new(DIRECTORY_STRING, "Directory String", SyntaxCheck::Validate(is_directory_string)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.16", "DIT Content Rule Description", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.17", "DIT Structure Rule Description", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.21", "Enhanced Guide", SyntaxCheck::Unimplemented),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.22", "Facsimile Telephone Number", SyntaxCheck::Unimplemented),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.23", "Fax", SyntaxCheck::Unimplemented),
    Syntax::new(GENERALIZED_TIME, "Generalized Time", SyntaxCheck::Validate(is_generalized_time)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.25", "Guide", SyntaxCheck::Unimplemented),
    Syntax::new(IA5_STRING, "IA5 String", SyntaxCheck::Validate(is_ia5_string)),
    Syntax::new(INTEGER, "INTEGER", SyntaxCheck::Validate(is_integer)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.28", "JPEG", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.30", "Matching Rule Description", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.31", "Matching Rule Use Description", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.34", "Name And Optional UID", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.35", "Name Form Description", SyntaxCheck::AcceptAny),
    Syntax::new(NUMERIC_STRING, "Numeric String", SyntaxCheck::Validate(is_numeric_string)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.37", "Object Class Description", SyntaxCheck::AcceptAny),
    Syntax::new(OID, "OID", SyntaxCheck::Validate(is_oid)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.39", "Other Mailbox", SyntaxCheck::Unimplemented),
    Syntax::new(OCTET_STRING, "Octet String", SyntaxCheck::AcceptAny),
    Syntax::new(POSTAL_ADDRESS, "Postal Address", SyntaxCheck::Validate(is_directory_string)),
    Syntax::new(PRINTABLE_STRING, "Printable String", SyntaxCheck::Validate(is_printable_string)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.45", "Subtree Specification", SyntaxCheck::Unimplemented),
    Syntax::new(TELEPHONE_NUMBER, "Telephone Number", SyntaxCheck::Validate(is_printable_string)),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.51", "Teletex Terminal Identifier", SyntaxCheck::Unimplemented),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.52", "Telex Number", SyntaxCheck::Unimplemented),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.53", "UTC Time", SyntaxCheck::Unimplemented),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.54", "LDAP Syntax Description", SyntaxCheck::AcceptAny),
    Syntax::new("1.3.6.1.4.1.1466.115.121.1.58", "Substring Assertion", SyntaxCheck::AcceptAny),
    Syntax::new(UUID, "UUID", SyntaxCheck::Validate(is_uuid)),
];

static SYNTAX_INDEX: LazyLock<HashMap<&'static str, &'static Syntax>> =
    LazyLock::new(|| SYNTAXES.iter().map(|s| (s.oid, s)).collect());

/// Look a syntax up by OID.
pub fn syntax(oid: &str) -> Option<&'static Syntax> {
    SYNTAX_INDEX.get(oid.trim()).copied()
}

/// Every catalogued syntax.
pub fn all_syntaxes() -> &'static [Syntax] {
    SYNTAXES
}

fn is_bit_string(value: &str) -> bool {
    value
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix("'B"))
        .is_some_and(|bits| bits.chars().all(|c| c == '0' || c == '1'))
}

fn is_boolean(value: &str) -> bool {
    value == "TRUE" || value == "FALSE"
}

fn is_country_string(value: &str) -> bool {
    value.chars().count() == 2 && is_printable_string(value)
}

/// Structural check only; attribute names are resolved when the DN is used.
fn is_dn_string(value: &str) -> bool {
    value.trim().is_empty()
        || value
            .split(',')
            .all(|rdn| rdn.split('+').all(|ava| ava.split_once('=').is_some_and(|(t, _)| !t.trim().is_empty())))
}

fn is_directory_string(value: &str) -> bool {
    !value.is_empty()
}

/// Parse an RFC 4517 Generalized Time, normalised to UTC.
///
/// The zone is `Z` or a differential of the form `+HH` or `+HHMM`.
pub(crate) fn parse_generalized_time(value: &str) -> Option<NaiveDateTime> {
    let (body, offset) = match value.strip_suffix('Z') {
        Some(body) => (body, "+0000".to_string()),
        None => {
            let (body, differential) = value.split_at(value.rfind(['+', '-'])?);
            let offset = match differential.len() {
                3 => format!("{differential}00"),
                5 => differential.to_string(),
                _ => return None,
            };
            (body, offset)
        }
    };
    let (whole, fraction) = match body.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };
    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let padded = match whole.len() {
        10 => format!("{whole}0000"),
        12 => format!("{whole}00"),
        14 => whole.to_string(),
        _ => return None,
    };
    let time = DateTime::parse_from_str(&format!("{padded}{offset}"), "%Y%m%d%H%M%S%z")
        .ok()?
        .naive_utc();
    match fraction {
        Some(f) if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) => None,
        Some(f) => {
            let digits: String = f.chars().chain(std::iter::repeat('0')).take(9).collect();
            let nanos: u32 = digits.parse().ok()?;
            time.checked_add_signed(chrono::Duration::nanoseconds(i64::from(nanos)))
        }
        None => Some(time),
    }
}

fn is_generalized_time(value: &str) -> bool {
    parse_generalized_time(value).is_some()
}

fn is_ia5_string(value: &str) -> bool {
    value.is_ascii()
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && value != "-0"
}

fn is_numeric_string(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == ' ')
}

pub(crate) fn is_numeric_oid(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|arc| {
            !arc.is_empty()
                && arc.chars().all(|c| c.is_ascii_digit())
                && (arc == "0" || !arc.starts_with('0'))
        })
}

pub(crate) fn is_descr(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_oid(value: &str) -> bool {
    is_numeric_oid(value) || is_descr(value)
}

fn is_printable_string(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "'()+,-./:? =".contains(c))
}

/// RFC 4530 allows only the hyphenated form.
fn is_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::parse_str(value).is_ok()
}
