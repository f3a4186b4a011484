//! Shared fixtures for the integration tests.
//!
//! The sample tree used throughout is
//!
//! ```text
//! dc=dev
//! └── dc=georgiboy
//!     ├── cn=Test1          (inetOrgPerson, sn=Tester)
//!     └── ou=TestOu
//!         ├── cn=Test2      (person, sn=Tester)
//!         └── cn=Test3      (person, sn=Tester)
//! ```

use ldap_dit::{DirectoryServer, DirectoryServerBuilder, Dit, Dn, Entry, EntryOptions, Schema};
use std::sync::{Arc, LazyLock};

static CORE_SCHEMA: LazyLock<Arc<Schema>> =
    LazyLock::new(|| Arc::new(Schema::core().expect("Failed to load core schema")));

/// Route library logs to the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn core_schema() -> Arc<Schema> {
    CORE_SCHEMA.clone()
}

pub fn dn(schema: &Schema, text: &str) -> Dn {
    Dn::parse(schema, text).unwrap_or_else(|e| panic!("invalid DN '{text}': {e}"))
}

/// The sample tree's entries, parents before children.
pub fn scenario_entries(schema: &Schema) -> Vec<Entry> {
    let entry = |text: &str, options: EntryOptions| {
        Entry::new(schema, dn(schema, text), options).unwrap_or_else(|e| panic!("invalid entry '{text}': {e}"))
    };
    let tester = |class: &str| EntryOptions::new(class).attribute("sn", ["Tester"]);
    vec![
        entry("dc=dev", EntryOptions::new("domain")),
        entry("dc=georgiboy,dc=dev", EntryOptions::new("domain")),
        entry(
            "cn=Test1,dc=georgiboy,dc=dev",
            tester("inetOrgPerson").attribute("mail", ["test1@georgiboy.dev"]),
        ),
        entry("ou=TestOu,dc=georgiboy,dc=dev", EntryOptions::new("organizationalUnit")),
        entry("cn=Test2,ou=TestOu,dc=georgiboy,dc=dev", tester("person")),
        entry("cn=Test3,ou=TestOu,dc=georgiboy,dc=dev", tester("person")),
    ]
}

pub fn scenario_dit() -> Dit {
    let schema = core_schema();
    let mut dit = Dit::new(schema.clone());
    for entry in scenario_entries(&schema) {
        let name = entry.dn().clone();
        dit.insert_entry(&name, entry).expect("Failed to insert sample entry");
    }
    dit
}

/// A running server over the sample tree. Must be called inside a Tokio runtime.
pub fn scenario_server() -> DirectoryServer {
    let schema = core_schema();
    DirectoryServerBuilder::new(schema.clone())
        .with_entries(scenario_entries(&schema))
        .build()
        .expect("Failed to build directory server")
}
