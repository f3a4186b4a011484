//! Integration tests for the directory core.

pub mod dit_scenarios;
pub mod properties;
pub mod scheduler;
pub mod schema_loading;
