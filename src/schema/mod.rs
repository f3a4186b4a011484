//! The directory schema: syntaxes, matching rules, attribute types and
//! object classes.
//!
//! This module provides the schema model and its RFC 4512 text loader. A
//! [`Schema`] is loaded once at startup and shared read-only by the DIT and
//! by anything that normalises DNs before submitting requests.
//!
//! # Key Types
//!
//! - [`Schema`] - the registry of attribute types and object classes
//! - [`AttributeType`] / [`ObjectClass`] - individual definitions
//! - [`MatchingRule`] / [`Syntax`] - the fixed RFC 4517 catalog
//!
//! # Examples
//!
//! ```rust
//! use ldap_dit::schema::Schema;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::core()?;
//! let cn = schema.attribute("commonName").expect("cn is a core attribute");
//! assert_eq!(cn.oid, "2.5.4.3");
//! // cn inherits its equality rule from name
//! assert_eq!(schema.equality_rule("cn").map(|r| r.name()), Some("caseIgnoreMatch"));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod embedded;
pub mod loader;
pub mod matching;
pub mod registry;
pub mod syntax;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;

// Re-export the main types for convenience
pub use builder::{AttributeTypeBuilder, ObjectClassBuilder};
pub use matching::{MatchOutcome, MatchingRule, RuleKind, SubstringAssertion, matching_rule};
pub use registry::Schema;
pub use syntax::Syntax;
pub use types::{AttributeType, ObjectClass, ObjectClassKind, Oid, TOP_OID, Usage};
