//! Schema-governed LDAP directory core for Rust.
//!
//! Provides the in-memory directory information tree of an LDAP server: the
//! schema model and its RFC 4512 text loader, distinguished names, validated
//! entries, scoped search with RFC 4515 filters, and a single-writer
//! scheduler that serializes every operation on the tree.
//!
//! # Core Components
//!
//! - [`Schema`] - Attribute types, object classes, syntaxes and matching rules
//! - [`Dn`] / [`Entry`] - Normalised names and schema-validated entries
//! - [`Dit`] - The tree engine: lookup, insert, modify, rename, delete, search
//! - [`DirectoryServer`] - Async handle to the scheduler owning the tree
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ldap_dit::{DirectoryServerBuilder, Dn, Entry, EntryOptions, Filter, Schema, SearchScope};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::core()?);
//! let server = DirectoryServerBuilder::new(schema.clone()).build()?;
//!
//! let base = Dn::parse(&schema, "dc=example")?;
//! server.add_entry(Entry::new(&schema, base.clone(), EntryOptions::new("domain"))?).await?;
//!
//! let people = server
//!     .search(&base, SearchScope::WholeSubtree, Filter::parse("(objectClass=person)")?)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! The protocol codec, networking and authentication are left to the caller;
//! [`DirectoryServer::execute`] is the boundary it talks to.

pub mod directory_server;
pub mod dit;
pub mod dn;
pub mod entry;
pub mod error;
pub mod schema;

// Core re-exports
pub use directory_server::{
    DirectoryConfig, DirectoryOperation, DirectoryServer, DirectoryServerBuilder, OperationOutcome,
    SchedulerState,
};
pub use dit::{Dit, Filter, SearchScope};
pub use dn::{Ava, Dn, Rdn};
pub use entry::{ChangeOperation, Entry, EntryOptions};
pub use error::{
    DirectoryError, DirectoryResult, LdapError, ResultCode, SchemaError, SchemaResult, ValidationError,
    ValidationResult,
};
pub use schema::Schema;
