//! The schema registry: an arena of attribute types and object classes
//! addressed by OID.
//!
//! A [`Schema`] is built once at startup and is read-only afterwards, so it
//! is shared between the DIT worker and request normalisers behind an `Arc`
//! without further synchronisation.

use super::builder::{AttributeTypeBuilder, ObjectClassBuilder};
use super::matching::{MatchOutcome, MatchingRule, RuleKind, matching_rule};
use super::syntax::{self, Syntax};
use super::types::{AttributeType, ObjectClass, Oid, TOP_OID};
use super::{embedded, loader};
use crate::error::{DirectoryError, DirectoryResult, SchemaError, SchemaResult, ValidationError, ValidationResult};

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// The directory schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    attribute_types: BTreeMap<Oid, AttributeType>,
    object_classes: BTreeMap<Oid, ObjectClass>,
    #[serde(skip)]
    attribute_names: HashMap<String, Oid>,
    #[serde(skip)]
    object_class_names: HashMap<String, Oid>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

impl Schema {
    /// A schema holding only the built-in `top` class.
    pub fn empty() -> Self {
        let mut schema = Self {
            attribute_types: BTreeMap::new(),
            object_classes: BTreeMap::new(),
            attribute_names: HashMap::new(),
            object_class_names: HashMap::new(),
        };
        let top = ObjectClass::top();
        for name in &top.names {
            schema.object_class_names.insert(name.to_ascii_lowercase(), top.oid.clone());
        }
        schema.object_classes.insert(top.oid.clone(), top);
        schema
    }

    /// The embedded core schema (RFC 4519, RFC 4524, RFC 2798 and RFC 2307
    /// definitions commonly needed by a directory).
    pub fn core() -> SchemaResult<Self> {
        Self::from_text(embedded::core_attribute_types(), embedded::core_object_classes())
    }

    /// Load a schema from attribute type text and object class text.
    pub fn from_text(attribute_types: &str, object_classes: &str) -> SchemaResult<Self> {
        let attributes = loader::parse_attribute_types(attribute_types)?;
        let classes = loader::parse_object_classes(object_classes)?;
        Self::from_builders(attributes, classes)
    }

    /// Load a schema from an attribute type file and an object class file.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(attribute_types: P, object_classes: Q) -> SchemaResult<Self> {
        let attribute_text = fs::read_to_string(attribute_types)?;
        let class_text = fs::read_to_string(object_classes)?;
        Self::from_text(&attribute_text, &class_text)
    }

    /// Resolve and cross-reference a batch of definitions.
    ///
    /// Attribute types are resolved among themselves first; object classes
    /// then resolve their superiors among themselves and their MUST/MAY lists
    /// against the attribute types.
    pub fn from_builders(
        mut attribute_types: Vec<AttributeTypeBuilder>,
        mut object_classes: Vec<ObjectClassBuilder>,
    ) -> SchemaResult<Self> {
        let mut schema = Self::empty();

        let snapshot = attribute_types.clone();
        for builder in &mut attribute_types {
            builder.resolve(&snapshot)?;
        }
        for builder in &attribute_types {
            schema.insert_attribute_type(builder.build()?)?;
        }
        schema.check_attribute_cycles()?;

        object_classes.retain(|builder| {
            if builder.is_top() {
                log::debug!("Ignoring textual definition of top in favour of the built-in class");
            }
            !builder.is_top()
        });
        let snapshot = object_classes.clone();
        for builder in &mut object_classes {
            builder.resolve(&snapshot, |name| schema.attribute(name).map(|a| a.oid.clone()))?;
        }
        for builder in &object_classes {
            schema.insert_object_class(builder.build()?)?;
        }
        schema.check_object_class_cycles()?;

        log::info!(
            "Loaded schema with {} attribute types and {} object classes",
            schema.attribute_types.len(),
            schema.object_classes.len()
        );
        Ok(schema)
    }

    fn insert_attribute_type(&mut self, attribute: AttributeType) -> SchemaResult<()> {
        if self.attribute_types.contains_key(&attribute.oid) {
            return Err(SchemaError::DuplicateDefinition { name: attribute.oid });
        }
        for name in &attribute.names {
            let key = name.to_ascii_lowercase();
            if self.attribute_names.contains_key(&key) {
                return Err(SchemaError::DuplicateDefinition { name: name.clone() });
            }
            self.attribute_names.insert(key, attribute.oid.clone());
        }
        self.attribute_types.insert(attribute.oid.clone(), attribute);
        Ok(())
    }

    fn insert_object_class(&mut self, class: ObjectClass) -> SchemaResult<()> {
        if self.object_classes.contains_key(&class.oid) {
            return Err(SchemaError::DuplicateDefinition { name: class.oid });
        }
        for name in &class.names {
            let key = name.to_ascii_lowercase();
            if self.object_class_names.contains_key(&key) {
                return Err(SchemaError::DuplicateDefinition { name: name.clone() });
            }
            self.object_class_names.insert(key, class.oid.clone());
        }
        self.object_classes.insert(class.oid.clone(), class);
        Ok(())
    }

    fn check_attribute_cycles(&self) -> SchemaResult<()> {
        for attribute in self.attribute_types.values() {
            let mut seen = HashSet::new();
            let mut current = Some(attribute);
            while let Some(at) = current {
                if !seen.insert(at.oid.as_str()) {
                    return Err(SchemaError::SuperiorCycle {
                        definition: attribute.oid.clone(),
                    });
                }
                current = at.sup.as_deref().and_then(|sup| self.attribute_types.get(sup));
            }
        }
        Ok(())
    }

    fn check_object_class_cycles(&self) -> SchemaResult<()> {
        fn visit<'a>(
            schema: &'a Schema,
            oid: &'a str,
            path: &mut Vec<&'a str>,
            done: &mut HashSet<&'a str>,
        ) -> SchemaResult<()> {
            if done.contains(oid) {
                return Ok(());
            }
            if path.contains(&oid) {
                return Err(SchemaError::SuperiorCycle {
                    definition: oid.to_string(),
                });
            }
            path.push(oid);
            if let Some(class) = schema.object_classes.get(oid) {
                for sup in &class.sup {
                    visit(schema, sup, path, done)?;
                }
            }
            path.pop();
            done.insert(oid);
            Ok(())
        }

        let mut done = HashSet::new();
        for oid in self.object_classes.keys() {
            visit(self, oid, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }

    /// Look an attribute type up by OID or by any of its names.
    pub fn attribute(&self, name_or_oid: &str) -> Option<&AttributeType> {
        let key = name_or_oid.trim();
        self.attribute_types.get(key).or_else(|| {
            self.attribute_names
                .get(&key.to_ascii_lowercase())
                .and_then(|oid| self.attribute_types.get(oid))
        })
    }

    /// Like [`attribute`](Self::attribute), failing with `undefinedAttributeType`.
    pub fn require_attribute(&self, name_or_oid: &str) -> ValidationResult<&AttributeType> {
        self.attribute(name_or_oid)
            .ok_or_else(|| ValidationError::undefined_attribute(name_or_oid))
    }

    /// Look an object class up by OID or by any of its names.
    pub fn object_class(&self, name_or_oid: &str) -> Option<&ObjectClass> {
        let key = name_or_oid.trim();
        self.object_classes.get(key).or_else(|| {
            self.object_class_names
                .get(&key.to_ascii_lowercase())
                .and_then(|oid| self.object_classes.get(oid))
        })
    }

    pub fn require_object_class(&self, name_or_oid: &str) -> ValidationResult<&ObjectClass> {
        self.object_class(name_or_oid)
            .ok_or_else(|| ValidationError::unknown_object_class(name_or_oid))
    }

    pub fn attribute_types(&self) -> impl Iterator<Item = &AttributeType> {
        self.attribute_types.values()
    }

    pub fn object_classes(&self) -> impl Iterator<Item = &ObjectClass> {
        self.object_classes.values()
    }

    /// Display name of an attribute OID, or the OID itself if unknown.
    pub fn attribute_name<'a>(&'a self, oid: &'a str) -> &'a str {
        self.attribute_types.get(oid).map(AttributeType::name).unwrap_or(oid)
    }

    /// The attribute followed by its superiors, nearest first.
    pub fn superior_chain<'a>(&'a self, attribute: &'a AttributeType) -> impl Iterator<Item = &'a AttributeType> {
        std::iter::successors(Some(attribute), |at| {
            at.sup.as_deref().and_then(|sup| self.attribute_types.get(sup))
        })
        .take(self.attribute_types.len().max(1))
    }

    fn effective_rule(
        &self,
        name_or_oid: &str,
        clause: fn(&AttributeType) -> Option<&Oid>,
    ) -> Option<&'static MatchingRule> {
        let attribute = self.attribute(name_or_oid)?;
        self.superior_chain(attribute)
            .find_map(clause)
            .and_then(|oid| matching_rule(oid))
    }

    /// The equality rule of the attribute or its nearest superior declaring one.
    pub fn equality_rule(&self, name_or_oid: &str) -> Option<&'static MatchingRule> {
        self.effective_rule(name_or_oid, |at| at.equality.as_ref())
    }

    pub fn ordering_rule(&self, name_or_oid: &str) -> Option<&'static MatchingRule> {
        self.effective_rule(name_or_oid, |at| at.ordering.as_ref())
    }

    pub fn substr_rule(&self, name_or_oid: &str) -> Option<&'static MatchingRule> {
        self.effective_rule(name_or_oid, |at| at.substr.as_ref())
    }

    /// The effective syntax and its length bound, inherited as a pair.
    pub fn effective_syntax(&self, name_or_oid: &str) -> Option<(&'static Syntax, Option<u32>)> {
        let attribute = self.attribute(name_or_oid)?;
        self.superior_chain(attribute).find_map(|at| {
            at.syntax
                .as_deref()
                .and_then(syntax::syntax)
                .map(|s| (s, at.max_length))
        })
    }

    /// Compare two values of an attribute under its effective equality rule.
    pub fn values_match(&self, name_or_oid: &str, a: &str, b: &str) -> DirectoryResult<MatchOutcome> {
        let rule = self.rule_for(name_or_oid, RuleKind::Equality)?;
        rule.equality(a, b)
    }

    /// The effective rule of `kind`, failing with `inappropriateMatching`.
    pub fn rule_for(&self, name_or_oid: &str, kind: RuleKind) -> DirectoryResult<&'static MatchingRule> {
        let attribute = self.require_attribute(name_or_oid)?;
        let rule = match kind {
            RuleKind::Equality => self.equality_rule(&attribute.oid),
            RuleKind::Ordering => self.ordering_rule(&attribute.oid),
            RuleKind::Substrings => self.substr_rule(&attribute.oid),
        };
        rule.ok_or_else(|| DirectoryError::inappropriate_matching(attribute.name(), kind.to_string()))
    }

    /// The class and every class it inherits from, `top` included.
    pub fn superclasses(&self, name_or_oid: &str) -> Vec<&ObjectClass> {
        let mut closure: Vec<&ObjectClass> = Vec::new();
        let mut pending: Vec<&ObjectClass> = self.object_class(name_or_oid).into_iter().collect();
        while let Some(class) = pending.pop() {
            if closure.iter().any(|c| c.oid == class.oid) {
                continue;
            }
            pending.extend(class.sup.iter().filter_map(|sup| self.object_classes.get(sup)));
            closure.push(class);
        }
        if !closure.is_empty() && !closure.iter().any(|c| c.oid == TOP_OID) {
            closure.extend(self.object_classes.get(TOP_OID));
        }
        closure
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        let Some(ancestor) = self.object_class(ancestor) else {
            return false;
        };
        self.superclasses(class).iter().any(|c| c.oid == ancestor.oid)
    }
}
