//! Core schema type definitions.
//!
//! Attribute types and object classes as described by RFC 4512 §4.1. All
//! cross-references (superiors, matching rules, MUST/MAY lists) are stored as
//! OID strings and resolved through the owning [`Schema`](super::Schema).

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Dotted-decimal object identifier.
pub type Oid = String;

/// OID of the built-in root object class.
pub const TOP_OID: &str = "2.5.6.0";

/// Attribute usage category (RFC 4512 §4.1.2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Usage {
    #[default]
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    DsaOperation,
}

impl Usage {
    pub fn from_descr(descr: &str) -> Option<Self> {
        match descr {
            "userApplications" => Some(Usage::UserApplications),
            "directoryOperation" => Some(Usage::DirectoryOperation),
            "distributedOperation" => Some(Usage::DistributedOperation),
            "dSAOperation" => Some(Usage::DsaOperation),
            _ => None,
        }
    }

    pub fn as_descr(self) -> &'static str {
        match self {
            Usage::UserApplications => "userApplications",
            Usage::DirectoryOperation => "directoryOperation",
            Usage::DistributedOperation => "distributedOperation",
            Usage::DsaOperation => "dSAOperation",
        }
    }

    /// Operational attributes are maintained by the directory itself.
    pub fn is_operational(self) -> bool {
        self != Usage::UserApplications
    }
}

/// Object class kind (RFC 4512 §2.4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectClassKind {
    Abstract,
    #[default]
    Structural,
    Auxiliary,
}

impl ObjectClassKind {
    pub fn as_keyword(self) -> &'static str {
        match self {
            ObjectClassKind::Abstract => "ABSTRACT",
            ObjectClassKind::Structural => "STRUCTURAL",
            ObjectClassKind::Auxiliary => "AUXILIARY",
        }
    }
}

/// An attribute type definition.
///
/// Rules and syntax left empty here are inherited from the superior chain;
/// see [`Schema::equality_rule`](super::Schema::equality_rule) and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeType {
    pub oid: Oid,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub sup: Option<Oid>,
    pub equality: Option<Oid>,
    pub ordering: Option<Oid>,
    pub substr: Option<Oid>,
    pub syntax: Option<Oid>,
    pub max_length: Option<u32>,
    pub single_value: bool,
    pub collective: bool,
    pub no_user_modification: bool,
    pub usage: Usage,
    pub extensions: BTreeMap<String, Vec<String>>,
}

impl AttributeType {
    /// The display name: the first declared name, or the OID.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }

    /// Whether `name` is the OID or one of the names, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.oid == name || self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

/// An object class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClass {
    pub oid: Oid,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub sup: Vec<Oid>,
    pub kind: ObjectClassKind,
    pub must: Vec<Oid>,
    pub may: Vec<Oid>,
    pub extensions: BTreeMap<String, Vec<String>>,
}

impl ObjectClass {
    /// The built-in root class every hierarchy ends in.
    pub fn top() -> Self {
        Self {
            oid: TOP_OID.to_string(),
            names: vec!["top".to_string()],
            description: None,
            obsolete: false,
            sup: Vec::new(),
            kind: ObjectClassKind::Abstract,
            must: Vec::new(),
            may: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.oid == name || self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

fn write_qdescrs(f: &mut fmt::Formatter<'_>, keyword: &str, names: &[String]) -> fmt::Result {
    match names {
        [] => Ok(()),
        [name] => write!(f, " {keyword} '{name}'"),
        names => {
            write!(f, " {keyword} (")?;
            for name in names {
                write!(f, " '{name}'")?;
            }
            write!(f, " )")
        }
    }
}

fn write_oids(f: &mut fmt::Formatter<'_>, keyword: &str, oids: &[Oid]) -> fmt::Result {
    match oids {
        [] => Ok(()),
        [oid] => write!(f, " {keyword} {oid}"),
        oids => write!(f, " {keyword} ( {} )", oids.join(" $ ")),
    }
}

fn write_qdstring(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "'{}'", value.replace('\\', "\\5C").replace('\'', "\\27"))
}

fn write_extensions(f: &mut fmt::Formatter<'_>, extensions: &BTreeMap<String, Vec<String>>) -> fmt::Result {
    for (keyword, values) in extensions {
        write!(f, " {keyword}")?;
        if let [value] = values.as_slice() {
            write!(f, " ")?;
            write_qdstring(f, value)?;
        } else {
            write!(f, " (")?;
            for value in values {
                write!(f, " ")?;
                write_qdstring(f, value)?;
            }
            write!(f, " )")?;
        }
    }
    Ok(())
}

/// Renders the RFC 4512 `AttributeTypeDescription` form.
impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "( {}", self.oid)?;
        write_qdescrs(f, "NAME", &self.names)?;
        if let Some(desc) = &self.description {
            write!(f, " DESC ")?;
            write_qdstring(f, desc)?;
        }
        if self.obsolete {
            write!(f, " OBSOLETE")?;
        }
        if let Some(sup) = &self.sup {
            write!(f, " SUP {sup}")?;
        }
        if let Some(rule) = &self.equality {
            write!(f, " EQUALITY {rule}")?;
        }
        if let Some(rule) = &self.ordering {
            write!(f, " ORDERING {rule}")?;
        }
        if let Some(rule) = &self.substr {
            write!(f, " SUBSTR {rule}")?;
        }
        if let Some(syntax) = &self.syntax {
            write!(f, " SYNTAX {syntax}")?;
            if let Some(len) = self.max_length {
                write!(f, "{{{len}}}")?;
            }
        }
        if self.single_value {
            write!(f, " SINGLE-VALUE")?;
        }
        if self.collective {
            write!(f, " COLLECTIVE")?;
        }
        if self.no_user_modification {
            write!(f, " NO-USER-MODIFICATION")?;
        }
        if self.usage != Usage::UserApplications {
            write!(f, " USAGE {}", self.usage.as_descr())?;
        }
        write_extensions(f, &self.extensions)?;
        write!(f, " )")
    }
}

/// Renders the RFC 4512 `ObjectClassDescription` form.
impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "( {}", self.oid)?;
        write_qdescrs(f, "NAME", &self.names)?;
        if let Some(desc) = &self.description {
            write!(f, " DESC ")?;
            write_qdstring(f, desc)?;
        }
        if self.obsolete {
            write!(f, " OBSOLETE")?;
        }
        write_oids(f, "SUP", &self.sup)?;
        write!(f, " {}", self.kind.as_keyword())?;
        write_oids(f, "MUST", &self.must)?;
        write_oids(f, "MAY", &self.may)?;
        write_extensions(f, &self.extensions)?;
        write!(f, " )")
    }
}
