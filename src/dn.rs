//! Distinguished names (RFC 4514).
//!
//! A [`Dn`] is an ordered sequence of [`Rdn`]s stored root first: index 0 is
//! the outermost RDN, which appears last in the conventional string form, and
//! the final element names the entry itself. Each RDN is a set of
//! attribute-value assertions ([`Ava`]s) whose attribute has been resolved
//! against the [`Schema`].
//!
//! Two names are the same when their RDNs compare equal under each
//! attribute's equality rule, not when their strings are identical; see
//! [`Dn::matches`].

use crate::error::{DirectoryError, DirectoryResult, ValidationResult};
use crate::schema::{MatchOutcome, Oid, Schema};
use serde::Serialize;
use std::fmt;

/// One `attribute=value` pair of an RDN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ava {
    /// OID of the resolved attribute type
    pub attribute: Oid,
    /// The attribute name as written
    pub name: String,
    /// The unescaped value
    pub value: String,
}

impl Ava {
    /// Create an AVA, resolving `name` against the schema.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedAttributeType` if the schema has no such attribute.
    pub fn new(schema: &Schema, name: &str, value: impl Into<String>) -> ValidationResult<Self> {
        let attribute = schema.require_attribute(name)?;
        Ok(Self {
            attribute: attribute.oid.clone(),
            name: name.trim().to_string(),
            value: value.into(),
        })
    }

    /// Compare under the attribute's equality rule, failing closed.
    ///
    /// A missing or unimplemented rule is logged and treated as unequal, as
    /// is an undefined comparison.
    pub fn matches(&self, other: &Ava, schema: &Schema) -> bool {
        if self.attribute != other.attribute {
            return false;
        }
        match schema.values_match(&self.attribute, &self.value, &other.value) {
            Ok(outcome) => outcome == MatchOutcome::Match,
            Err(e) => {
                log::warn!(
                    "Cannot compare RDN values of '{}', treating as unequal: {}",
                    self.name,
                    e
                );
                false
            }
        }
    }
}

impl fmt::Display for Ava {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, escape_value(&self.value))
    }
}

/// A relative distinguished name: one or more AVAs joined by `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rdn {
    avas: Vec<Ava>,
}

impl Rdn {
    /// Create an RDN from its AVAs.
    pub fn new(avas: Vec<Ava>) -> DirectoryResult<Self> {
        if avas.is_empty() {
            return Err(DirectoryError::invalid_dn("", "an RDN needs at least one AVA"));
        }
        Ok(Self { avas })
    }

    /// Parse a single RDN such as `cn=Test1` or `cn=x+ou=y`.
    pub fn parse(schema: &Schema, text: &str) -> DirectoryResult<Self> {
        let components = split_unescaped(text, &[','])
            .map_err(|details| DirectoryError::invalid_dn(text, details))?;
        if components.len() != 1 {
            return Err(DirectoryError::invalid_dn(text, "expected exactly one RDN"));
        }
        parse_rdn(schema, &components[0], text)
    }

    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// Two RDNs match when they have the same attribute set and every value
    /// matches under its attribute's equality rule.
    pub fn matches(&self, other: &Rdn, schema: &Schema) -> bool {
        if self.avas.len() != other.avas.len() {
            return false;
        }
        // each AVA of `other` pairs with at most one of ours
        let mut unpaired: Vec<&Ava> = other.avas.iter().collect();
        self.avas.iter().all(|ava| {
            match unpaired.iter().position(|candidate| ava.matches(candidate, schema)) {
                Some(index) => {
                    unpaired.swap_remove(index);
                    true
                }
                None => false,
            }
        })
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{ava}")?;
        }
        Ok(())
    }
}

/// A distinguished name, stored root first.
///
/// # Examples
///
/// ```rust
/// use ldap_dit::{Dn, Schema};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = Schema::core()?;
/// let dn = Dn::parse(&schema, "cn=Test1,dc=georgiboy,dc=dev")?;
/// assert_eq!(dn.len(), 3);
/// assert_eq!(dn.parent().to_string(), "dc=georgiboy,dc=dev");
///
/// let shouted = Dn::parse(&schema, "CN=test1, DC=GeorgiBoy, DC=dev")?;
/// assert!(dn.matches(&shouted, &schema));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty name of the tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a DN from RDNs in root-first order.
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// Parse and normalise DN text against the schema.
    ///
    /// RDNs are separated by unescaped `,` and AVAs within an RDN by
    /// unescaped `+`. Values may use RFC 4514 escapes (`\,`, `\+`, `\2C`).
    ///
    /// # Errors
    ///
    /// * `InvalidDnSyntax` for malformed text
    /// * `UndefinedAttributeType` for an attribute the schema does not define
    pub fn parse(schema: &Schema, text: &str) -> DirectoryResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::root());
        }
        let components = split_unescaped(text, &[','])
            .map_err(|details| DirectoryError::invalid_dn(text, details))?;
        let mut rdns = components
            .iter()
            .map(|component| parse_rdn(schema, component, text))
            .collect::<DirectoryResult<Vec<_>>>()?;
        rdns.reverse();
        Ok(Self { rdns })
    }

    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Number of RDNs.
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// The RDNs, outermost first.
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The RDN naming the entry itself; `None` for the root.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.last()
    }

    /// The DN with its naming RDN dropped. The root is its own parent.
    pub fn parent(&self) -> Dn {
        let mut rdns = self.rdns.clone();
        rdns.pop();
        Dn { rdns }
    }

    /// The DN of a child named `rdn`.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = self.rdns.clone();
        rdns.push(rdn);
        Dn { rdns }
    }

    /// The DN with its naming RDN replaced.
    pub fn with_rdn(&self, rdn: Rdn) -> Dn {
        self.parent().child(rdn)
    }

    /// The first `count` RDNs from the root.
    pub fn prefix(&self, count: usize) -> Dn {
        Dn {
            rdns: self.rdns[..count.min(self.rdns.len())].to_vec(),
        }
    }

    /// Whether both names have the same length and pairwise matching RDNs.
    pub fn matches(&self, other: &Dn, schema: &Schema) -> bool {
        self.rdns.len() == other.rdns.len()
            && self
                .rdns
                .iter()
                .zip(&other.rdns)
                .all(|(a, b)| a.matches(b, schema))
    }
}

/// Renders the conventional leaf-first form.
impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

fn parse_rdn(schema: &Schema, component: &str, dn: &str) -> DirectoryResult<Rdn> {
    let avas = split_unescaped(component, &['+'])
        .map_err(|details| DirectoryError::invalid_dn(dn, details))?
        .iter()
        .map(|ava| parse_ava(schema, ava, dn))
        .collect::<DirectoryResult<Vec<_>>>()?;
    Rdn::new(avas).map_err(|_| DirectoryError::invalid_dn(dn, "empty RDN"))
}

fn parse_ava(schema: &Schema, text: &str, dn: &str) -> DirectoryResult<Ava> {
    let (name, raw_value) = split_first_equals(text)
        .ok_or_else(|| DirectoryError::invalid_dn(dn, format!("'{}' is not of the form attribute=value", text.trim())))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(DirectoryError::invalid_dn(dn, "missing attribute name"));
    }
    let value = unescape_value(raw_value).map_err(|details| DirectoryError::invalid_dn(dn, details))?;
    Ok(Ava::new(schema, name, value)?)
}

/// Split on unescaped separators outside double quotes.
fn split_unescaped(text: &str, separators: &[char]) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    let mut quoted = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or("trailing backslash")?;
                current.push('\\');
                current.push(escaped);
            }
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if !quoted && separators.contains(&c) => {
                if current.trim().is_empty() {
                    return Err(format!("empty component before '{c}'"));
                }
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted value".to_string());
    }
    if current.trim().is_empty() {
        return Err("empty trailing component".to_string());
    }
    parts.push(current);
    Ok(parts)
}

fn split_first_equals(text: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' if !escaped => return Some((&text[..index], &text[index + 1..])),
            _ => escaped = false,
        }
    }
    None
}

fn hex_value(c: char) -> Option<u8> {
    c.to_digit(16).and_then(|d| u8::try_from(d).ok())
}

fn unescape_value(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim_start();
    // An escaped trailing space is significant
    let trimmed = if trimmed.ends_with("\\ ") {
        trimmed
    } else {
        trimmed.trim_end()
    };
    if let Some(inner) = trimmed.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return Ok(inner.to_string());
    }

    let mut bytes = Vec::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buffer = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            continue;
        }
        let first = chars.next().ok_or("trailing backslash")?;
        match (hex_value(first), chars.peek().copied().and_then(hex_value)) {
            (Some(high), Some(low)) => {
                chars.next();
                bytes.push(high << 4 | low);
            }
            _ if " \"#+,;<=>\\".contains(first) => {
                let mut buffer = [0u8; 4];
                bytes.extend_from_slice(first.encode_utf8(&mut buffer).as_bytes());
            }
            _ => return Err(format!("invalid escape '\\{first}'")),
        }
    }
    String::from_utf8(bytes).map_err(|_| "escaped bytes are not valid UTF-8".to_string())
}

/// Escape a value for the string form of a DN.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '#' if i == 0 => escaped.push_str("\\#"),
            ' ' if i == 0 || i == last => escaped.push_str("\\ "),
            c if c.is_control() => {
                let mut buffer = [0u8; 4];
                for byte in c.encode_utf8(&mut buffer).bytes() {
                    escaped.push_str(&format!("\\{byte:02X}"));
                }
            }
            c => escaped.push(c),
        }
    }
    escaped
}
