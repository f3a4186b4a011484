//! Tests for schema loading, resolution and entry validation.

use super::registry::Schema;
use super::types::{ObjectClassKind, TOP_OID};
use crate::dn::Dn;
use crate::entry::{Entry, EntryOptions};
use crate::error::{DirectoryError, ResultCode, SchemaError, ValidationError};

fn core() -> Schema {
    Schema::core().expect("Failed to load core schema")
}

fn validation_error(result: Result<Entry, DirectoryError>) -> ValidationError {
    match result {
        Err(DirectoryError::Validation(e)) => e,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_core_schema_loads() {
    let schema = core();
    assert!(schema.attribute("cn").is_some());
    assert!(schema.attribute("COMMONNAME").is_some());
    assert!(schema.attribute("2.5.4.3").is_some());
    assert!(schema.attribute("nosuch").is_none());
    assert_eq!(schema.object_class("inetOrgPerson").unwrap().oid, "2.16.840.1.113730.3.2.2");
}

#[test]
fn test_textual_top_is_replaced_by_builtin() {
    let schema = core();
    let top = schema.object_class("top").unwrap();
    assert_eq!(top.oid, TOP_OID);
    assert_eq!(top.kind, ObjectClassKind::Abstract);
    assert!(top.must.is_empty());
}

#[test]
fn test_rules_and_syntax_are_inherited() {
    let schema = core();
    assert_eq!(schema.equality_rule("sn").unwrap().name(), "caseIgnoreMatch");
    assert_eq!(schema.substr_rule("givenName").unwrap().name(), "caseIgnoreSubstringsMatch");
    assert!(schema.ordering_rule("cn").is_none());
    let (syntax, max) = schema.effective_syntax("cn").unwrap();
    assert_eq!(syntax.description(), "Directory String");
    assert_eq!(max, Some(32768));

    // c overrides the syntax of name but keeps its rules
    let (syntax, max) = schema.effective_syntax("c").unwrap();
    assert_eq!(syntax.description(), "Country String");
    assert_eq!(max, None);
    assert_eq!(schema.equality_rule("c").unwrap().name(), "caseIgnoreMatch");
}

#[test]
fn test_values_match_without_rule() {
    let text = "( 1.1.1 NAME 'opaque' SYNTAX 1.3.6.1.4.1.1466.115.121.1.40 )";
    let schema = Schema::from_text(text, "").unwrap();
    let error = schema.values_match("opaque", "a", "a").unwrap_err();
    assert_eq!(error.result_code(), ResultCode::InappropriateMatching);
}

#[test]
fn test_superclasses_include_top() {
    let schema = core();
    let names: Vec<&str> = schema
        .superclasses("inetOrgPerson")
        .iter()
        .map(|c| c.name())
        .collect();
    for expected in ["inetOrgPerson", "organizationalPerson", "person", "top"] {
        assert!(names.contains(&expected), "{names:?}");
    }
    assert!(schema.is_subclass_of("inetOrgPerson", "person"));
    assert!(!schema.is_subclass_of("person", "inetOrgPerson"));
}

#[test]
fn test_forward_references_resolve() {
    let attributes = "( 1.1.2 NAME 'child' SUP parent )
                      ( 1.1.1 NAME 'parent' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )";
    let classes = "( 1.2.2 NAME 'leaf' SUP middle STRUCTURAL MUST child )
                   ( 1.2.1 NAME 'middle' SUP top ABSTRACT MAY parent )";
    let schema = Schema::from_text(attributes, classes).unwrap();
    assert_eq!(schema.attribute("child").unwrap().sup.as_deref(), Some("1.1.1"));
    assert_eq!(schema.object_class("leaf").unwrap().sup, vec!["1.2.1".to_string()]);
    assert_eq!(schema.equality_rule("child").unwrap().name(), "caseIgnoreMatch");
}

#[test]
fn test_bootstrap_failures() {
    assert!(matches!(
        Schema::from_text("( 1.1.2 NAME 'child' SUP missing )", ""),
        Err(SchemaError::UnknownSuperior { .. })
    ));
    assert!(matches!(
        Schema::from_text("( 1.1.1 NAME 'a' SUP b ) ( 1.1.2 NAME 'b' SUP a )", ""),
        Err(SchemaError::SuperiorCycle { .. })
    ));
    assert!(matches!(
        Schema::from_text("( 1.1.1 NAME 'a' ) ( 1.1.2 NAME 'A' )", ""),
        Err(SchemaError::DuplicateDefinition { .. })
    ));
    assert!(matches!(
        Schema::from_text("( 1.1.1 NAME 'a' ) ( 1.1.1 NAME 'b' )", ""),
        Err(SchemaError::DuplicateDefinition { .. })
    ));
    assert!(matches!(
        Schema::from_text("", "( 1.2.1 NAME 'x' SUP y ) ( 1.2.2 NAME 'y' SUP x )"),
        Err(SchemaError::SuperiorCycle { .. })
    ));
    assert!(matches!(
        Schema::from_text("", "( 1.2.1 NAME 'x' MUST nothing )"),
        Err(SchemaError::UnknownAttribute { .. })
    ));
}

#[test]
fn test_schema_serializes() {
    let schema = core();
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["attributeTypes"]["2.5.4.3"]["names"][0], "cn");
    assert_eq!(json["objectClasses"]["2.5.6.6"]["kind"], "structural");
}

#[test]
fn test_valid_entry() {
    let schema = core();
    let dn = Dn::parse(&schema, "cn=Test1,dc=georgiboy,dc=dev").unwrap();
    let entry = Entry::new(
        &schema,
        dn,
        EntryOptions::new("person").attribute("sn", ["Tester"]),
    )
    .unwrap();
    // cn comes from the RDN
    assert_eq!(entry.values(&schema, "cn").unwrap(), ["Test1".to_string()]);
}

#[test]
fn test_missing_required_attribute() {
    let schema = core();
    let dn = Dn::parse(&schema, "cn=Test1,dc=dev").unwrap();
    let error = validation_error(Entry::new(&schema, dn, EntryOptions::new("person")));
    assert_eq!(
        error,
        ValidationError::MissingRequiredAttribute {
            attribute: "sn".to_string(),
            object_class: "person".to_string(),
        }
    );
    assert_eq!(error.result_code(), ResultCode::ObjectClassViolation);
}

#[test]
fn test_attribute_not_allowed() {
    let schema = core();
    let dn = Dn::parse(&schema, "cn=Test1,dc=dev").unwrap();
    let options = EntryOptions::new("person")
        .attribute("sn", ["Tester"])
        .attribute("mail", ["test@example.com"]);
    let error = validation_error(Entry::new(&schema, dn.clone(), options));
    assert!(matches!(error, ValidationError::AttributeNotAllowed { ref attribute } if attribute == "mail"));

    // inetOrgPerson permits mail
    let options = EntryOptions::new("inetOrgPerson")
        .attribute("sn", ["Tester"])
        .attribute("mail", ["test@example.com"]);
    assert!(Entry::new(&schema, dn, options).is_ok());
}

#[test]
fn test_object_class_kinds() {
    let schema = core();
    let dn = Dn::parse(&schema, "dc=dev").unwrap();
    let error = validation_error(Entry::new(&schema, dn.clone(), EntryOptions::new("dcObject")));
    assert!(matches!(error, ValidationError::NotStructural { .. }));

    let error = validation_error(Entry::new(
        &schema,
        dn.clone(),
        EntryOptions::new("domain").auxiliary("person"),
    ));
    assert!(matches!(error, ValidationError::NotAuxiliary { .. }));

    let error = validation_error(Entry::new(&schema, dn, EntryOptions::new("nosuchClass")));
    assert!(matches!(error, ValidationError::UnknownObjectClass { .. }));
}

#[test]
fn test_auxiliary_class_requirements() {
    let schema = core();
    let dn = Dn::parse(&schema, "uid=tester,dc=dev").unwrap();
    let partial = EntryOptions::new("inetOrgPerson")
        .auxiliary("posixAccount")
        .attribute("sn", ["Tester"])
        .attribute("cn", ["Test"]);
    let error = validation_error(Entry::new(&schema, dn.clone(), partial.clone()));
    assert!(matches!(error, ValidationError::MissingRequiredAttribute { ref object_class, .. } if object_class == "posixAccount"));

    let complete = partial
        .attribute("uidNumber", ["1000"])
        .attribute("gidNumber", ["1000"])
        .attribute("homeDirectory", ["/home/tester"]);
    assert!(Entry::new(&schema, dn, complete).is_ok());
}

#[test]
fn test_value_constraints() {
    let schema = core();
    let dn = Dn::parse(&schema, "uid=tester,dc=dev").unwrap();
    let base = EntryOptions::new("inetOrgPerson")
        .auxiliary("posixAccount")
        .attribute("sn", ["Tester"])
        .attribute("cn", ["Test"])
        .attribute("gidNumber", ["1000"])
        .attribute("homeDirectory", ["/home/tester"]);

    let error = validation_error(Entry::new(
        &schema,
        dn.clone(),
        base.clone().attribute("uidNumber", ["one thousand"]),
    ));
    assert!(matches!(error, ValidationError::InvalidAttributeSyntax { .. }));
    assert_eq!(error.result_code(), ResultCode::InvalidAttributeSyntax);

    let error = validation_error(Entry::new(
        &schema,
        dn.clone(),
        base.clone().attribute("uidNumber", ["1000", "1001"]),
    ));
    assert!(matches!(error, ValidationError::SingleValueViolation { .. }));

    let error = validation_error(Entry::new(
        &schema,
        dn,
        base.attribute("uidNumber", ["1000"]).attribute("telephoneNumber", ["1".repeat(33)]),
    ));
    assert!(matches!(error, ValidationError::ValueTooLong { max: 32, .. }));
}

#[test]
fn test_unimplemented_syntax_is_unwilling() {
    let attributes = "( 1.1.1 NAME 'fax' SYNTAX 1.3.6.1.4.1.1466.115.121.1.23 )
                      ( 1.1.2 NAME 'label' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )";
    let classes = "( 1.2.1 NAME 'thing' SUP top STRUCTURAL MUST label MAY fax )";
    let schema = Schema::from_text(attributes, classes).unwrap();
    let dn = Dn::parse(&schema, "label=x").unwrap();
    let error = validation_error(Entry::new(&schema, dn, EntryOptions::new("thing").attribute("fax", ["x"])));
    assert!(matches!(error, ValidationError::UnimplementedSyntax { .. }));
    assert_eq!(error.result_code(), ResultCode::UnwillingToPerform);
}
