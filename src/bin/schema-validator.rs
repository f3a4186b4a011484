//! # LDAP Schema Validator
//!
//! A command-line utility for checking RFC 4512 schema text before it is
//! handed to the directory at startup.
//!
//! ## Overview
//!
//! The validator runs the same loader the directory uses, so a schema that
//! passes here will bootstrap. It reports:
//! - Tokenizer and grammar errors, with the offending token and line
//! - Unknown superiors, matching rules, syntaxes and MUST/MAY attributes
//! - Duplicate definitions and superior cycles
//!
//! ## Usage
//!
//! ### Validate a Pair of Files
//!
//! ```bash
//! cargo run --bin schema-validator attributetypes.schema objectclasses.schema
//! ```
//!
//! ### Validate a Schema Directory
//!
//! The directory must hold `attributetypes.schema` and `objectclasses.schema`.
//!
//! ```bash
//! cargo run --bin schema-validator ./schema/
//! ```
//!
//! ## Output Examples
//!
//! ```text
//! Validating schema: attributetypes.schema + objectclasses.schema
//! ✓ Schema is valid!
//!
//! Schema Summary:
//!   Attribute types: 37
//!     Single-valued: 9
//!     Operational: 2
//!   Object classes: 16
//!     Structural: 11, Auxiliary: 3, Abstract: 1
//!   Unimplemented rules in use: uniqueMemberMatch
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: The schema loaded
//! - `1`: Bad arguments or the schema failed to load

use ldap_dit::schema::{ObjectClassKind, Schema};
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

const ATTRIBUTE_FILE: &str = "attributetypes.schema";
const OBJECT_CLASS_FILE: &str = "objectclasses.schema";

fn main() {
    let args: Vec<String> = env::args().collect();

    let (attributes, classes) = match args.len() {
        2 => {
            let dir = Path::new(&args[1]);
            if !dir.is_dir() {
                eprintln!("Error: '{}' is not a directory", dir.display());
                process::exit(1);
            }
            (dir.join(ATTRIBUTE_FILE), dir.join(OBJECT_CLASS_FILE))
        }
        3 => (PathBuf::from(&args[1]), PathBuf::from(&args[2])),
        _ => {
            eprintln!("Usage: {} <attribute-file> <objectclass-file>", args[0]);
            eprintln!("       {} <schema-directory>", args[0]);
            process::exit(1);
        }
    };

    println!(
        "Validating schema: {} + {}",
        attributes.display(),
        classes.display()
    );
    match Schema::from_files(&attributes, &classes) {
        Ok(schema) => {
            println!("✓ Schema is valid!");
            print_schema_summary(&schema);
        }
        Err(e) => {
            eprintln!("❌ Schema validation failed: {}", e);
            process::exit(1);
        }
    }
}

fn print_schema_summary(schema: &Schema) {
    let attributes: Vec<_> = schema.attribute_types().collect();
    let single_valued = attributes.iter().filter(|at| at.single_value).count();
    let operational = attributes.iter().filter(|at| at.usage.is_operational()).count();

    let mut structural = 0;
    let mut auxiliary = 0;
    let mut abstract_classes = 0;
    for class in schema.object_classes() {
        match class.kind {
            ObjectClassKind::Structural => structural += 1,
            ObjectClassKind::Auxiliary => auxiliary += 1,
            ObjectClassKind::Abstract => abstract_classes += 1,
        }
    }

    println!();
    println!("Schema Summary:");
    println!("  Attribute types: {}", attributes.len());
    println!("    Single-valued: {}", single_valued);
    println!("    Operational: {}", operational);
    println!("  Object classes: {}", structural + auxiliary + abstract_classes);
    println!(
        "    Structural: {}, Auxiliary: {}, Abstract: {}",
        structural, auxiliary, abstract_classes
    );

    // rules and syntaxes that will refuse to run
    let mut unimplemented_rules = BTreeSet::new();
    let mut unimplemented_syntaxes = BTreeSet::new();
    for at in &attributes {
        for rule in [
            schema.equality_rule(&at.oid),
            schema.ordering_rule(&at.oid),
            schema.substr_rule(&at.oid),
        ]
        .into_iter()
        .flatten()
        {
            if !rule.is_implemented() {
                unimplemented_rules.insert(rule.name());
            }
        }
        if let Some((syntax, _)) = schema.effective_syntax(&at.oid) {
            if !syntax.is_implemented() {
                unimplemented_syntaxes.insert(syntax.description());
            }
        }
    }
    if !unimplemented_rules.is_empty() {
        let names: Vec<&str> = unimplemented_rules.into_iter().collect();
        println!("  Unimplemented rules in use: {}", names.join(", "));
    }
    if !unimplemented_syntaxes.is_empty() {
        let names: Vec<&str> = unimplemented_syntaxes.into_iter().collect();
        println!("  Unimplemented syntaxes in use: {}", names.join(", "));
    }
}
