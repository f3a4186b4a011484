//! Builders for schema definitions.
//!
//! A builder accumulates the clauses of one definition as they are parsed.
//! Superior references may name definitions that have not been seen yet, so
//! they are resolved in a second pass with [`AttributeTypeBuilder::resolve`]
//! once the whole batch is known. [`build`](AttributeTypeBuilder::build) is
//! side-effect free and may be called before resolving, in which case the
//! superior is kept exactly as written.

use super::matching::{self, RuleKind};
use super::syntax;
use super::types::{AttributeType, ObjectClass, ObjectClassKind, Oid, TOP_OID, Usage};
use crate::error::{SchemaError, SchemaResult};
use std::collections::BTreeMap;

/// Accumulates an attribute type definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTypeBuilder {
    pub(crate) oid: Option<String>,
    pub(crate) names: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) obsolete: bool,
    pub(crate) sup: Option<String>,
    pub(crate) equality: Option<String>,
    pub(crate) ordering: Option<String>,
    pub(crate) substr: Option<String>,
    pub(crate) syntax: Option<String>,
    pub(crate) max_length: Option<u32>,
    pub(crate) single_value: bool,
    pub(crate) collective: bool,
    pub(crate) no_user_modification: bool,
    pub(crate) usage: Option<Usage>,
    pub(crate) extensions: BTreeMap<String, Vec<String>>,
    resolved_sup: Option<Oid>,
}

impl AttributeTypeBuilder {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: Some(oid.into()),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn obsolete(mut self) -> Self {
        self.obsolete = true;
        self
    }

    /// Superior by name or OID.
    pub fn sup(mut self, sup: impl Into<String>) -> Self {
        self.sup = Some(sup.into());
        self
    }

    pub fn equality(mut self, rule: impl Into<String>) -> Self {
        self.equality = Some(rule.into());
        self
    }

    pub fn ordering(mut self, rule: impl Into<String>) -> Self {
        self.ordering = Some(rule.into());
        self
    }

    pub fn substr(mut self, rule: impl Into<String>) -> Self {
        self.substr = Some(rule.into());
        self
    }

    pub fn syntax(mut self, oid: impl Into<String>, max_length: Option<u32>) -> Self {
        self.syntax = Some(oid.into());
        self.max_length = max_length;
        self
    }

    pub fn single_value(mut self) -> Self {
        self.single_value = true;
        self
    }

    pub fn collective(mut self) -> Self {
        self.collective = true;
        self
    }

    pub fn no_user_modification(mut self) -> Self {
        self.no_user_modification = true;
        self
    }

    pub fn usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    fn label(&self) -> String {
        self.oid.clone().unwrap_or_else(|| "<no oid>".to_string())
    }

    fn answers_to(&self, reference: &str) -> bool {
        self.oid.as_deref() == Some(reference)
            || self.names.iter().any(|n| n.eq_ignore_ascii_case(reference))
    }

    /// Resolve the superior reference against every definition in the batch.
    ///
    /// The superior is looked up by OID first, then by any declared name.
    pub fn resolve(&mut self, batch: &[AttributeTypeBuilder]) -> SchemaResult<()> {
        let Some(sup) = self.sup.as_deref() else {
            self.resolved_sup = None;
            return Ok(());
        };
        let found = batch
            .iter()
            .find(|b| b.oid.as_deref() == Some(sup))
            .or_else(|| batch.iter().find(|b| b.answers_to(sup)))
            .and_then(|b| b.oid.clone());
        match found {
            Some(oid) => {
                self.resolved_sup = Some(oid);
                Ok(())
            }
            None => Err(SchemaError::UnknownSuperior {
                definition: self.label(),
                superior: sup.to_string(),
            }),
        }
    }

    fn rule(&self, name: Option<&String>, kind: RuleKind) -> SchemaResult<Option<Oid>> {
        let Some(name) = name else {
            return Ok(None);
        };
        let rule = matching::matching_rule(name).ok_or_else(|| SchemaError::UnknownMatchingRule {
            definition: self.label(),
            rule: name.clone(),
        })?;
        if rule.kind() != kind {
            return Err(SchemaError::WrongRuleKind {
                definition: self.label(),
                rule: name.clone(),
                expected: kind.to_string(),
            });
        }
        Ok(Some(rule.oid().to_string()))
    }

    /// Produce the attribute type; rule names are replaced by their OIDs.
    pub fn build(&self) -> SchemaResult<AttributeType> {
        let oid = self.oid.clone().ok_or(SchemaError::MissingOid)?;
        let syntax = match &self.syntax {
            Some(oid) => Some(
                syntax::syntax(oid)
                    .map(|s| s.oid().to_string())
                    .ok_or_else(|| SchemaError::UnknownSyntax {
                        definition: self.label(),
                        syntax: oid.clone(),
                    })?,
            ),
            None => None,
        };
        Ok(AttributeType {
            oid,
            names: self.names.clone(),
            description: self.description.clone(),
            obsolete: self.obsolete,
            sup: self.resolved_sup.clone().or_else(|| self.sup.clone()),
            equality: self.rule(self.equality.as_ref(), RuleKind::Equality)?,
            ordering: self.rule(self.ordering.as_ref(), RuleKind::Ordering)?,
            substr: self.rule(self.substr.as_ref(), RuleKind::Substrings)?,
            syntax,
            max_length: self.max_length,
            single_value: self.single_value,
            collective: self.collective,
            no_user_modification: self.no_user_modification,
            usage: self.usage.unwrap_or_default(),
            extensions: self.extensions.clone(),
        })
    }
}

/// Accumulates an object class definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectClassBuilder {
    pub(crate) oid: Option<String>,
    pub(crate) names: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) obsolete: bool,
    pub(crate) sup: Vec<String>,
    pub(crate) kind: Option<ObjectClassKind>,
    pub(crate) must: Vec<String>,
    pub(crate) may: Vec<String>,
    pub(crate) extensions: BTreeMap<String, Vec<String>>,
    resolved: Option<ResolvedReferences>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedReferences {
    sup: Vec<Oid>,
    must: Vec<Oid>,
    may: Vec<Oid>,
}

fn is_top(reference: &str) -> bool {
    reference == TOP_OID || reference.eq_ignore_ascii_case("top")
}

impl ObjectClassBuilder {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: Some(oid.into()),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sup(mut self, sup: impl Into<String>) -> Self {
        self.sup.push(sup.into());
        self
    }

    pub fn kind(mut self, kind: ObjectClassKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn must(mut self, attribute: impl Into<String>) -> Self {
        self.must.push(attribute.into());
        self
    }

    pub fn may(mut self, attribute: impl Into<String>) -> Self {
        self.may.push(attribute.into());
        self
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    /// Whether this definition is the root class `top`.
    pub fn is_top(&self) -> bool {
        self.oid.as_deref().is_some_and(is_top)
    }

    fn label(&self) -> String {
        self.oid.clone().unwrap_or_else(|| "<no oid>".to_string())
    }

    fn answers_to(&self, reference: &str) -> bool {
        self.oid.as_deref() == Some(reference)
            || self.names.iter().any(|n| n.eq_ignore_ascii_case(reference))
    }

    /// Resolve superiors against the batch and MUST/MAY against `attribute`.
    ///
    /// `top` and `2.5.6.0` always resolve to the built-in root class.
    pub fn resolve<F>(&mut self, batch: &[ObjectClassBuilder], attribute: F) -> SchemaResult<()>
    where
        F: Fn(&str) -> Option<Oid>,
    {
        let mut sup = Vec::with_capacity(self.sup.len());
        for reference in &self.sup {
            if is_top(reference) {
                sup.push(TOP_OID.to_string());
                continue;
            }
            let found = batch
                .iter()
                .find(|b| b.oid.as_deref() == Some(reference.as_str()))
                .or_else(|| batch.iter().find(|b| b.answers_to(reference)))
                .and_then(|b| b.oid.clone());
            match found {
                Some(oid) => sup.push(oid),
                None => {
                    return Err(SchemaError::UnknownSuperior {
                        definition: self.label(),
                        superior: reference.clone(),
                    });
                }
            }
        }
        let lookup = |references: &[String]| -> SchemaResult<Vec<Oid>> {
            references
                .iter()
                .map(|reference| {
                    attribute(reference).ok_or_else(|| SchemaError::UnknownAttribute {
                        definition: self.label(),
                        attribute: reference.clone(),
                    })
                })
                .collect()
        };
        let must = lookup(&self.must)?;
        let may = lookup(&self.may)?;
        self.resolved = Some(ResolvedReferences { sup, must, may });
        Ok(())
    }

    /// Produce the object class; unresolved references are kept as written.
    pub fn build(&self) -> SchemaResult<ObjectClass> {
        let oid = self.oid.clone().ok_or(SchemaError::MissingOid)?;
        let (sup, must, may) = match &self.resolved {
            Some(r) => (r.sup.clone(), r.must.clone(), r.may.clone()),
            None => (self.sup.clone(), self.must.clone(), self.may.clone()),
        };
        Ok(ObjectClass {
            oid,
            names: self.names.clone(),
            description: self.description.clone(),
            obsolete: self.obsolete,
            sup,
            kind: self.kind.unwrap_or_default(),
            must,
            may,
            extensions: self.extensions.clone(),
        })
    }
}
