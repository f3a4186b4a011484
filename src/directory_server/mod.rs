//! Directory server: the single-writer scheduler in front of the tree.
//!
//! # Module Organization
//!
//! * `core` - The `DirectoryServer` handle and its worker task
//! * [`builder`] - Configuration and the server builder
//! * [`operations`] - The request boundary used by the protocol layer

pub mod builder;
pub mod core;
pub mod operations;


pub use builder::{DirectoryConfig, DirectoryServerBuilder};
pub use self::core::{DirectoryServer, SchedulerState};
pub use operations::{DirectoryOperation, OperationOutcome};
