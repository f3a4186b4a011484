//! Directory entries.
//!
//! An [`Entry`] is its DN, one structural object class, any number of
//! auxiliary classes and a map from attribute OID to values. Entries are
//! values: every mutation builds a modified copy, validates the whole copy
//! against the schema and only then replaces the original, so a failed
//! change never leaves a half-applied entry behind.

mod change;
mod ldif;

#[cfg(test)]
mod tests;

pub use change::ChangeOperation;

use crate::dn::{Dn, Rdn};
use crate::error::{DirectoryResult, ValidationError};
use crate::schema::{AttributeType, MatchOutcome, Oid, RuleKind, Schema};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Construction parameters for [`Entry::new`].
///
/// # Examples
///
/// ```rust
/// use ldap_dit::EntryOptions;
///
/// let options = EntryOptions::new("inetOrgPerson")
///     .auxiliary("posixAccount")
///     .attribute("sn", ["Tester"])
///     .attribute("cn", ["Test One"]);
/// assert_eq!(options.attributes.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOptions {
    /// Structural object class by name or OID
    pub structural: String,
    /// Auxiliary object classes by name or OID
    pub auxiliary: Vec<String>,
    /// Attribute names with their values
    pub attributes: Vec<(String, Vec<String>)>,
}

impl EntryOptions {
    pub fn new(structural: impl Into<String>) -> Self {
        Self {
            structural: structural.into(),
            auxiliary: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn auxiliary(mut self, class: impl Into<String>) -> Self {
        self.auxiliary.push(class.into());
        self
    }

    pub fn attribute<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.attributes
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }
}

/// A schema-validated directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    dn: Dn,
    structural: Oid,
    auxiliary: BTreeSet<Oid>,
    attributes: BTreeMap<Oid, Vec<String>>,
}

impl Entry {
    /// Create and validate an entry.
    ///
    /// The AVAs of the DN's own RDN are added as attribute values. No entry
    /// is returned unless the result satisfies the schema.
    ///
    /// # Errors
    ///
    /// * `UnknownObjectClass`, `NotStructural`, `NotAuxiliary` for bad classes
    /// * `UndefinedAttributeType` for attributes the schema does not define
    /// * `NoUserModification` for attributes maintained by the directory
    /// * any entry validation failure, see [`Schema::validate_entry`]
    pub fn new(schema: &Schema, dn: Dn, options: EntryOptions) -> DirectoryResult<Self> {
        let structural = schema.require_object_class(&options.structural)?.oid.clone();
        let auxiliary = options
            .auxiliary
            .iter()
            .map(|class| schema.require_object_class(class).map(|c| c.oid.clone()))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut entry = Self {
            dn,
            structural,
            auxiliary,
            attributes: BTreeMap::new(),
        };
        for (name, values) in &options.attributes {
            let attribute = user_modifiable(schema, name)?;
            entry.insert_values(schema, attribute, values);
        }
        entry.include_rdn_values(schema);
        schema.validate_entry(&entry)?;
        Ok(entry)
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    /// OID of the structural object class.
    pub fn structural_class(&self) -> &str {
        &self.structural
    }

    /// OIDs of the auxiliary object classes.
    pub fn auxiliary_classes(&self) -> impl Iterator<Item = &str> {
        self.auxiliary.iter().map(String::as_str)
    }

    /// Names of every object class of the entry, superclasses included.
    pub fn object_classes<'a>(&self, schema: &'a Schema) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = Vec::new();
        for class in std::iter::once(&self.structural).chain(&self.auxiliary) {
            for c in schema.superclasses(class) {
                if !names.contains(&c.name()) {
                    names.push(c.name());
                }
            }
        }
        names
    }

    /// All attributes as `(oid, values)` pairs.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes.iter().map(|(oid, values)| (oid.as_str(), values.as_slice()))
    }

    /// Values of an attribute looked up by name or OID.
    pub fn values(&self, schema: &Schema, name: &str) -> Option<&[String]> {
        let attribute = schema.attribute(name)?;
        self.attributes.get(&attribute.oid).map(Vec::as_slice)
    }

    pub fn has_attribute(&self, schema: &Schema, name: &str) -> bool {
        self.values(schema, name).is_some()
    }

    /// Whether the attribute holds a value equal to `value` under its
    /// effective equality rule.
    ///
    /// An undefined comparison counts as "not present".
    ///
    /// # Errors
    ///
    /// * `UndefinedAttributeType` if the attribute is unknown
    /// * `InappropriateMatching` if it has no equality rule
    /// * `UnwillingToPerform` if the rule is not implemented
    pub fn contains_attr_val(&self, schema: &Schema, name: &str, value: &str) -> DirectoryResult<bool> {
        let attribute = schema.require_attribute(name)?;
        Ok(self.position_of(schema, attribute, value)?.is_some())
    }

    fn position_of(&self, schema: &Schema, attribute: &AttributeType, value: &str) -> DirectoryResult<Option<usize>> {
        let Some(values) = self.attributes.get(&attribute.oid) else {
            return Ok(None);
        };
        let rule = schema.rule_for(&attribute.oid, RuleKind::Equality)?;
        for (index, existing) in values.iter().enumerate() {
            if rule.equality(existing, value)? == MatchOutcome::Match {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Like `position_of`, falling back to literal comparison when the
    /// attribute has no usable equality rule. Every mutator locates values
    /// this way so that values it can add it can also remove.
    fn position_or_literal(&self, schema: &Schema, attribute: &AttributeType, value: &str) -> Option<usize> {
        self.position_of(schema, attribute, value).unwrap_or_else(|_| {
            self.attributes
                .get(&attribute.oid)
                .and_then(|values| values.iter().position(|v| v == value))
        })
    }

    fn insert_values(&mut self, schema: &Schema, attribute: &AttributeType, values: &[String]) {
        for value in values {
            if self.position_or_literal(schema, attribute, value).is_none() {
                self.attributes
                    .entry(attribute.oid.clone())
                    .or_default()
                    .push(value.clone());
            }
        }
    }

    fn include_rdn_values(&mut self, schema: &Schema) {
        let Some(rdn) = self.dn.rdn().cloned() else {
            return;
        };
        for ava in rdn.avas() {
            if let Some(attribute) = schema.attribute(&ava.attribute) {
                self.insert_values(schema, attribute, std::slice::from_ref(&ava.value));
            }
        }
    }

    fn apply(&mut self, schema: &Schema, change: &ChangeOperation) -> DirectoryResult<()> {
        let attribute = user_modifiable(schema, change.attribute())?;
        match change {
            ChangeOperation::Add { values, .. } => {
                if values.is_empty() {
                    return Err(ValidationError::EmptyValues {
                        attribute: attribute.name().to_string(),
                    }
                    .into());
                }
                self.insert_values(schema, attribute, values);
            }
            ChangeOperation::Delete { values, .. } if values.is_empty() => {
                self.attributes.remove(&attribute.oid);
            }
            ChangeOperation::Delete { values, .. } => {
                if !self.attributes.contains_key(&attribute.oid) {
                    return Err(ValidationError::NoSuchAttribute {
                        attribute: attribute.name().to_string(),
                    }
                    .into());
                }
                for value in values {
                    let index = self.position_or_literal(schema, attribute, value).ok_or_else(|| {
                        ValidationError::NoSuchValue {
                            attribute: attribute.name().to_string(),
                            value: value.clone(),
                        }
                    })?;
                    if let Some(existing) = self.attributes.get_mut(&attribute.oid) {
                        existing.remove(index);
                    }
                }
            }
            ChangeOperation::Replace { values, .. } => {
                self.attributes.remove(&attribute.oid);
                self.insert_values(schema, attribute, values);
            }
        }
        if self.attributes.get(&attribute.oid).is_some_and(Vec::is_empty) {
            self.attributes.remove(&attribute.oid);
        }
        Ok(())
    }

    /// Apply every change to a copy and validate the result once.
    ///
    /// `self` is left untouched; on success the modified copy is returned.
    pub fn modify(&self, schema: &Schema, changes: &[ChangeOperation]) -> DirectoryResult<Entry> {
        let mut copy = self.clone();
        for change in changes {
            copy.apply(schema, change)?;
        }
        schema.validate_entry(&copy)?;
        Ok(copy)
    }

    /// Add values to an attribute.
    pub fn add_attr<I, V>(&mut self, schema: &Schema, name: &str, values: I) -> DirectoryResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        *self = self.modify(schema, &[ChangeOperation::add(name, values)])?;
        Ok(())
    }

    /// Remove an attribute with all its values; absent attributes are ignored.
    pub fn remove_attr(&mut self, schema: &Schema, name: &str) -> DirectoryResult<()> {
        *self = self.modify(schema, &[ChangeOperation::delete_all(name)])?;
        Ok(())
    }

    pub fn remove_attr_val(&mut self, schema: &Schema, name: &str, value: &str) -> DirectoryResult<()> {
        self.remove_attr_vals(schema, name, [value])
    }

    pub fn remove_attr_vals<I, V>(&mut self, schema: &Schema, name: &str, values: I) -> DirectoryResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Ok(());
        }
        *self = self.modify(schema, &[ChangeOperation::delete(name, values)])?;
        Ok(())
    }

    /// Rename the entry in place; see [`renamed`](Self::renamed).
    pub fn set_rdn(&mut self, schema: &Schema, rdn: Rdn, delete_old: bool) -> DirectoryResult<()> {
        *self = self.renamed(schema, rdn, delete_old)?;
        Ok(())
    }

    /// A copy named by `rdn` under the same parent.
    ///
    /// The new RDN's values are added unless an equal value is already
    /// present. With `delete_old`, values of the old RDN that the new RDN
    /// does not repeat are removed.
    pub fn renamed(&self, schema: &Schema, rdn: Rdn, delete_old: bool) -> DirectoryResult<Entry> {
        let mut copy = self.clone();
        if delete_old {
            if let Some(old) = self.dn.rdn() {
                for ava in old.avas() {
                    if rdn.avas().iter().any(|new| new.matches(ava, schema)) {
                        continue;
                    }
                    let Some(attribute) = schema.attribute(&ava.attribute) else {
                        continue;
                    };
                    if let Some(index) = copy.position_or_literal(schema, attribute, &ava.value) {
                        if let Some(values) = copy.attributes.get_mut(&attribute.oid) {
                            values.remove(index);
                            if values.is_empty() {
                                copy.attributes.remove(&attribute.oid);
                            }
                        }
                    }
                }
            }
        }
        copy.dn = self.dn.with_rdn(rdn);
        copy.include_rdn_values(schema);
        schema.validate_entry(&copy)?;
        Ok(copy)
    }

    /// The same entry under a different DN; attribute values are unchanged.
    pub(crate) fn relocated(&self, dn: Dn) -> Entry {
        Entry { dn, ..self.clone() }
    }

    /// A copy named `dn`, carrying that DN's naming values.
    ///
    /// Only re-validated when naming values had to be added.
    pub(crate) fn placed_at(&self, schema: &Schema, dn: Dn) -> DirectoryResult<Entry> {
        let mut copy = self.relocated(dn);
        let before = copy.attributes.clone();
        copy.include_rdn_values(schema);
        if copy.attributes != before {
            schema.validate_entry(&copy)?;
        }
        Ok(copy)
    }

    /// The anchor entry at the top of the tree.
    pub(crate) fn root() -> Entry {
        Entry {
            dn: Dn::root(),
            structural: crate::schema::TOP_OID.to_string(),
            auxiliary: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an operational attribute maintained by the directory itself.
    pub(crate) fn stamp(&mut self, attribute: &str, value: String) {
        self.attributes.insert(attribute.to_string(), vec![value]);
    }
}

fn user_modifiable<'a>(schema: &'a Schema, name: &str) -> DirectoryResult<&'a AttributeType> {
    let attribute = schema.require_attribute(name)?;
    if attribute.no_user_modification {
        return Err(ValidationError::NoUserModification {
            attribute: attribute.name().to_string(),
        }
        .into());
    }
    Ok(attribute)
}
