//! Loading schema text from strings and files.

use ldap_dit::schema::loader::{parse_attribute_types, parse_object_classes};
use ldap_dit::schema::{ObjectClassKind, Schema, Usage};
use ldap_dit::{Dn, Entry, EntryOptions, ResultCode, SchemaError};
use std::fs;
use std::path::PathBuf;

const ATTRIBUTES: &str = r#"
# Site attributes
( 1.3.6.1.4.1.99999.1.1 NAME ( 'badgeNumber' 'badge' )
  DESC 'Number printed on the site badge'
  EQUALITY integerMatch
  ORDERING integerOrderingMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.27
  SINGLE-VALUE )
( 1.3.6.1.4.1.99999.1.2 NAME 'siteCode'
  SUP name
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{8}
  X-ORIGIN 'site' )
( 1.3.6.1.4.1.99999.1.3 NAME 'lastAudit'
  EQUALITY generalizedTimeMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.24
  NO-USER-MODIFICATION
  USAGE directoryOperation )
( 2.5.4.41 NAME 'name'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{32768} )
( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name )
"#;

const CLASSES: &str = r#"
( 1.3.6.1.4.1.99999.2.1 NAME 'siteMember'
  DESC 'Someone with a badge'
  SUP top STRUCTURAL
  MUST ( cn $ badgeNumber )
  MAY siteCode )
"#;

struct TempSchemaDir(PathBuf);

impl TempSchemaDir {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("ldap-dit-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("Failed to create temp dir");
        Self(dir)
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.0.join(name);
        fs::write(&path, text).expect("Failed to write schema file");
        path
    }
}

impl Drop for TempSchemaDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn test_load_from_files() {
    let dir = TempSchemaDir::new("files");
    let attributes = dir.write("attributetypes.schema", ATTRIBUTES);
    let classes = dir.write("objectclasses.schema", CLASSES);

    let schema = Schema::from_files(&attributes, &classes).unwrap();
    let badge = schema.attribute("badge").unwrap();
    assert_eq!(badge.oid, "1.3.6.1.4.1.99999.1.1");
    assert!(badge.single_value);
    assert_eq!(schema.attribute("lastAudit").unwrap().usage, Usage::DirectoryOperation);

    let member = schema.object_class("siteMember").unwrap();
    assert_eq!(member.kind, ObjectClassKind::Structural);
    assert_eq!(member.must.len(), 2);

    // siteCode inherits name's rules but keeps its own length bound
    assert_eq!(schema.equality_rule("siteCode").unwrap().name(), "caseIgnoreMatch");
    assert_eq!(schema.effective_syntax("siteCode").unwrap().1, Some(8));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempSchemaDir::new("missing");
    let classes = dir.write("objectclasses.schema", CLASSES);
    let result = Schema::from_files(dir.0.join("nope.schema"), &classes);
    assert!(matches!(result, Err(SchemaError::Io(_))));
}

#[test]
fn test_loaded_schema_validates_entries() {
    let schema = Schema::from_text(ATTRIBUTES, CLASSES).unwrap();
    let dn = Dn::parse(&schema, "cn=Kim").unwrap();

    let entry = Entry::new(
        &schema,
        dn.clone(),
        EntryOptions::new("siteMember").attribute("badge", ["1042"]),
    );
    assert!(entry.is_ok());

    let too_long = Entry::new(
        &schema,
        dn.clone(),
        EntryOptions::new("siteMember")
            .attribute("badge", ["1042"])
            .attribute("siteCode", ["WAY-TOO-LONG"]),
    );
    assert_eq!(too_long.unwrap_err().result_code(), ResultCode::ConstraintViolation);

    let not_a_number = Entry::new(&schema, dn, EntryOptions::new("siteMember").attribute("badge", ["ten"]));
    assert_eq!(not_a_number.unwrap_err().result_code(), ResultCode::InvalidAttributeSyntax);
}

#[test]
fn test_definitions_survive_display_round_trip() {
    let builders = parse_attribute_types(ATTRIBUTES).unwrap();
    let classes = parse_object_classes(CLASSES).unwrap();
    assert_eq!(builders.len(), 5);
    assert_eq!(classes.len(), 1);

    let schema = Schema::from_text(ATTRIBUTES, CLASSES).unwrap();
    let rendered_attributes: String = schema.attribute_types().map(|at| format!("{at}\n")).collect();
    let rendered_classes: String = schema
        .object_classes()
        .filter(|oc| oc.name() != "top")
        .map(|oc| format!("{oc}\n"))
        .collect();
    let reloaded = Schema::from_text(&rendered_attributes, &rendered_classes).unwrap();

    for at in schema.attribute_types() {
        assert_eq!(reloaded.attribute(&at.oid), Some(at), "{}", at.name());
    }
    for oc in schema.object_classes() {
        assert_eq!(reloaded.object_class(&oc.oid), Some(oc), "{}", oc.name());
    }
}

#[test]
fn test_bootstrap_errors_name_the_problem() {
    let error = Schema::from_text("( 1.1.1 NAME 'a' FROBNICATE )", "").unwrap_err();
    assert!(matches!(error, SchemaError::UnknownKeyword { ref keyword, line: 1 } if keyword == "FROBNICATE"));

    let error = Schema::from_text("( 1.1.1 NAME 'a' EQUALITY noSuchMatch )", "").unwrap_err();
    assert!(matches!(error, SchemaError::UnknownMatchingRule { .. }));

    let error = Schema::from_text("( 1.1.1 NAME 'a' EQUALITY caseIgnoreOrderingMatch )", "").unwrap_err();
    assert!(matches!(error, SchemaError::WrongRuleKind { .. }));

    let error = Schema::from_text("( 1.1.1 NAME 'a' SYNTAX 9.9.9 )", "").unwrap_err();
    assert!(matches!(error, SchemaError::UnknownSyntax { .. }));

    let error = Schema::from_text("( 1.1.1 NAME 'a'", "").unwrap_err();
    assert!(matches!(error, SchemaError::UnbalancedParentheses { .. }));
}
