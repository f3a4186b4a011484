//! Entry validation against the schema.
//!
//! Checks run in a fixed order so the first reported failure is stable:
//! object classes, required attributes, permitted attributes, value
//! constraints and finally the naming values of the RDN.

use super::matching::MatchOutcome;
use super::registry::Schema;
use super::types::{ObjectClassKind, Oid};
use crate::entry::Entry;
use crate::error::{ValidationError, ValidationResult};
use std::collections::HashSet;

impl Schema {
    /// Validate a complete entry.
    ///
    /// Operational attributes are exempt from the MUST/MAY check but not from
    /// value constraints.
    ///
    /// # Errors
    ///
    /// * `UnknownObjectClass`, `NotStructural`, `NotAuxiliary`
    /// * `MissingRequiredAttribute`, `AttributeNotAllowed`
    /// * `UndefinedAttributeType`
    /// * `SingleValueViolation`, `InvalidAttributeSyntax`, `ValueTooLong`,
    ///   `UnimplementedSyntax`
    /// * `NotAllowedOnRdn` when a naming value is missing
    pub fn validate_entry(&self, entry: &Entry) -> ValidationResult<()> {
        let (required, allowed) = self.class_attributes(entry)?;

        for (attribute, class) in &required {
            if !entry.attributes().any(|(oid, values)| oid == attribute.as_str() && !values.is_empty()) {
                return Err(ValidationError::MissingRequiredAttribute {
                    attribute: self.attribute_name(attribute).to_string(),
                    object_class: class.clone(),
                });
            }
        }

        for (oid, values) in entry.attributes() {
            let attribute = self.require_attribute(oid)?;
            if !attribute.usage.is_operational() && !allowed.contains(oid) {
                return Err(ValidationError::AttributeNotAllowed {
                    attribute: attribute.name().to_string(),
                });
            }
            if attribute.single_value && values.len() > 1 {
                return Err(ValidationError::SingleValueViolation {
                    attribute: attribute.name().to_string(),
                });
            }
            self.validate_values(oid, values)?;
        }

        self.validate_rdn_values(entry)
    }

    /// Required attributes (with the class demanding each) and the set of
    /// permitted attributes for the entry's classes.
    fn class_attributes(&self, entry: &Entry) -> ValidationResult<(Vec<(Oid, String)>, HashSet<Oid>)> {
        let structural = self.require_object_class(entry.structural_class())?;
        if structural.kind != ObjectClassKind::Structural {
            return Err(ValidationError::NotStructural {
                object_class: structural.name().to_string(),
            });
        }
        let mut roots = vec![structural];
        for oid in entry.auxiliary_classes() {
            let class = self.require_object_class(oid)?;
            if class.kind != ObjectClassKind::Auxiliary {
                return Err(ValidationError::NotAuxiliary {
                    object_class: class.name().to_string(),
                });
            }
            roots.push(class);
        }

        let mut required: Vec<(Oid, String)> = Vec::new();
        let mut allowed = HashSet::new();
        for root in roots {
            for class in self.superclasses(&root.oid) {
                for must in &class.must {
                    if !required.iter().any(|(oid, _)| oid == must) {
                        required.push((must.clone(), class.name().to_string()));
                    }
                    allowed.insert(must.clone());
                }
                allowed.extend(class.may.iter().cloned());
            }
        }
        Ok((required, allowed))
    }

    fn validate_values(&self, oid: &str, values: &[String]) -> ValidationResult<()> {
        let Some((syntax, max_length)) = self.effective_syntax(oid) else {
            return Ok(());
        };
        let name = self.attribute_name(oid);
        for value in values {
            match syntax.validate(value) {
                Ok(true) => {}
                Ok(false) => {
                    return Err(ValidationError::InvalidAttributeSyntax {
                        attribute: name.to_string(),
                        value: value.clone(),
                        syntax: syntax.description().to_string(),
                    });
                }
                Err(_) => {
                    return Err(ValidationError::UnimplementedSyntax {
                        attribute: name.to_string(),
                        syntax: syntax.description().to_string(),
                    });
                }
            }
            if let Some(max) = max_length {
                if value.chars().count() > max as usize {
                    return Err(ValidationError::ValueTooLong {
                        attribute: name.to_string(),
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_rdn_values(&self, entry: &Entry) -> ValidationResult<()> {
        let Some(rdn) = entry.dn().rdn() else {
            return Ok(());
        };
        for ava in rdn.avas() {
            let values = entry
                .attributes()
                .find(|(oid, _)| *oid == ava.attribute)
                .map(|(_, values)| values)
                .unwrap_or_default();
            let present = values.iter().any(|value| match self.values_match(&ava.attribute, value, &ava.value) {
                Ok(outcome) => outcome == MatchOutcome::Match,
                Err(_) => *value == ava.value,
            });
            if !present {
                return Err(ValidationError::NotAllowedOnRdn {
                    attribute: ava.name.clone(),
                    value: ava.value.clone(),
                });
            }
        }
        Ok(())
    }
}
