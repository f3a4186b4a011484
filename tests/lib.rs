//! LDAP Directory Core Integration Test Suite
//!
//! These tests drive the crate through its public API only.
//!
//! ## Test Organization
//!
//! - `integration/` - End-to-end behaviour
//!   - `dit_scenarios` - Lookup, modify, rename and search over a small tree
//!   - `scheduler` - Concurrent submission and shutdown of the directory server
//!   - `schema_loading` - Loading schema text from files and strings
//!   - `properties` - Property tests for DN escaping and the schema tokenizer
//!
//! - `common/` - Shared fixtures: the core schema and the sample tree
//!
//! ## Usage
//!
//! ```bash
//! cargo test
//! cargo test integration::scheduler
//! RUST_LOG=trace cargo test -- --nocapture
//! ```

extern crate ldap_dit;

pub mod common;
pub mod integration;
