//! Tests for entry construction and copy-on-write mutation.

use super::*;
use crate::error::{DirectoryError, ResultCode};

fn core() -> Schema {
    Schema::core().expect("Failed to load core schema")
}

fn person(schema: &Schema) -> Entry {
    let dn = Dn::parse(schema, "cn=Test1,dc=georgiboy,dc=dev").unwrap();
    Entry::new(
        schema,
        dn,
        EntryOptions::new("inetOrgPerson")
            .attribute("cn", ["Test One"])
            .attribute("sn", ["Tester"]),
    )
    .unwrap()
}

#[test]
fn test_new_includes_rdn_values_once() {
    let schema = core();
    let dn = Dn::parse(&schema, "cn=Test1,dc=dev").unwrap();
    let entry = Entry::new(
        &schema,
        dn,
        EntryOptions::new("person")
            .attribute("cn", ["TEST1", "test1"])
            .attribute("sn", ["Tester"]),
    )
    .unwrap();
    // the RDN value matches an existing value under caseIgnoreMatch
    assert_eq!(entry.values(&schema, "cn").unwrap(), ["TEST1".to_string()]);
}

#[test]
fn test_object_classes_include_superclasses() {
    let schema = core();
    let entry = person(&schema);
    let classes = entry.object_classes(&schema);
    for expected in ["inetOrgPerson", "organizationalPerson", "person", "top"] {
        assert!(classes.contains(&expected), "{classes:?}");
    }
}

#[test]
fn test_contains_attr_val() {
    let schema = core();
    let entry = person(&schema);
    assert!(entry.contains_attr_val(&schema, "cn", "test one").unwrap());
    assert!(entry.contains_attr_val(&schema, "commonName", "  Test   One ").unwrap());
    assert!(!entry.contains_attr_val(&schema, "mail", "x").unwrap());
    assert!(matches!(
        entry.contains_attr_val(&schema, "bogus", "x"),
        Err(DirectoryError::Validation(ValidationError::UndefinedAttributeType { .. }))
    ));
}

#[test]
fn test_add_attr() {
    let schema = core();
    let mut entry = person(&schema);
    entry.add_attr(&schema, "mail", ["a@example.com", "b@example.com"]).unwrap();
    entry.add_attr(&schema, "mail", ["A@EXAMPLE.COM"]).unwrap();
    assert_eq!(entry.values(&schema, "mail").unwrap().len(), 2);
}

#[test]
fn test_add_attr_rejects_second_single_value() {
    let schema = core();
    let mut entry = person(&schema);
    entry.add_attr(&schema, "displayName", ["One"]).unwrap();
    let before = entry.clone();
    let error = entry.add_attr(&schema, "displayName", ["Two"]).unwrap_err();
    assert_eq!(error.result_code(), ResultCode::ConstraintViolation);
    assert_eq!(entry, before);
}

#[test]
fn test_add_attr_rejects_disallowed_attribute() {
    let schema = core();
    let mut entry = person(&schema);
    let error = entry.add_attr(&schema, "homeDirectory", ["/home/x"]).unwrap_err();
    assert_eq!(error.result_code(), ResultCode::ObjectClassViolation);
    assert!(!entry.has_attribute(&schema, "homeDirectory"));
}

#[test]
fn test_remove_values() {
    let schema = core();
    let mut entry = person(&schema);
    entry.add_attr(&schema, "mail", ["a@example.com", "b@example.com"]).unwrap();

    entry.remove_attr_val(&schema, "mail", "A@example.com").unwrap();
    assert_eq!(entry.values(&schema, "mail").unwrap(), ["b@example.com".to_string()]);

    let error = entry.remove_attr_val(&schema, "mail", "zzz@example.com").unwrap_err();
    assert!(matches!(error, DirectoryError::Validation(ValidationError::NoSuchValue { .. })));

    entry.remove_attr_vals(&schema, "mail", ["b@example.com"]).unwrap();
    assert!(!entry.has_attribute(&schema, "mail"));

    // removing a whole absent attribute is a no-op
    entry.remove_attr(&schema, "title").unwrap();
}

#[test]
fn test_unimplemented_equality_rule_values_round_trip() {
    let schema = core();
    let dn = Dn::parse(&schema, "cn=Staff,dc=georgiboy,dc=dev").unwrap();
    let mut group = Entry::new(
        &schema,
        dn,
        EntryOptions::new("groupOfUniqueNames").attribute("uniqueMember", ["cn=a,dc=dev", "cn=b,dc=dev"]),
    )
    .unwrap();

    // uniqueMemberMatch has no implementation, so values are compared literally
    group.add_attr(&schema, "uniqueMember", ["cn=b,dc=dev", "cn=c,dc=dev"]).unwrap();
    assert_eq!(group.values(&schema, "uniqueMember").unwrap().len(), 3);

    let group = group
        .modify(&schema, &[ChangeOperation::delete("uniqueMember", ["cn=b,dc=dev"])])
        .unwrap();
    assert_eq!(
        group.values(&schema, "uniqueMember").unwrap(),
        ["cn=a,dc=dev".to_string(), "cn=c,dc=dev".to_string()]
    );

    let error = group
        .modify(&schema, &[ChangeOperation::delete("uniqueMember", ["cn=z,dc=dev"])])
        .unwrap_err();
    assert!(matches!(error, DirectoryError::Validation(ValidationError::NoSuchValue { .. })));
}

#[test]
fn test_cannot_remove_naming_value() {
    let schema = core();
    let mut entry = person(&schema);
    let error = entry.remove_attr_val(&schema, "cn", "Test1").unwrap_err();
    assert_eq!(error.result_code(), ResultCode::NotAllowedOnRdn);
    assert!(entry.contains_attr_val(&schema, "cn", "Test1").unwrap());
}

#[test]
fn test_modify_is_all_or_nothing() {
    let schema = core();
    let entry = person(&schema);
    let error = entry
        .modify(
            &schema,
            &[
                ChangeOperation::replace("sn", ["Changed"]),
                ChangeOperation::add("uidNumber", ["1000"]),
            ],
        )
        .unwrap_err();
    assert_eq!(error.result_code(), ResultCode::ObjectClassViolation);
    assert_eq!(entry.values(&schema, "sn").unwrap(), ["Tester".to_string()]);
}

#[test]
fn test_modify_validates_once_at_end() {
    let schema = core();
    let entry = person(&schema);
    // sn is transiently absent between the two changes
    let modified = entry
        .modify(
            &schema,
            &[ChangeOperation::delete_all("sn"), ChangeOperation::add("sn", ["Again"])],
        )
        .unwrap();
    assert_eq!(modified.values(&schema, "sn").unwrap(), ["Again".to_string()]);
}

#[test]
fn test_add_with_no_values_is_rejected() {
    let schema = core();
    let entry = person(&schema);
    let error = entry
        .modify(&schema, &[ChangeOperation::add("mail", Vec::<String>::new())])
        .unwrap_err();
    assert!(matches!(error, DirectoryError::Validation(ValidationError::EmptyValues { .. })));
}

#[test]
fn test_no_user_modification() {
    let schema = core();
    let mut entry = person(&schema);
    let error = entry
        .add_attr(&schema, "createTimestamp", ["20240101000000Z"])
        .unwrap_err();
    assert!(matches!(
        error,
        DirectoryError::Validation(ValidationError::NoUserModification { .. })
    ));

    let dn = Dn::parse(&schema, "cn=x,dc=dev").unwrap();
    let options = EntryOptions::new("person")
        .attribute("sn", ["x"])
        .attribute("modifyTimestamp", ["20240101000000Z"]);
    assert!(Entry::new(&schema, dn, options).is_err());
}

#[test]
fn test_set_rdn() {
    let schema = core();
    let mut entry = person(&schema);
    let rdn = Rdn::parse(&schema, "cn=Test One").unwrap();
    entry.set_rdn(&schema, rdn, true).unwrap();
    assert_eq!(entry.dn().to_string(), "cn=Test One,dc=georgiboy,dc=dev");
    // the new value was already present; the old one is gone
    assert_eq!(entry.values(&schema, "cn").unwrap(), ["Test One".to_string()]);

    let rdn = Rdn::parse(&schema, "uid=tester+cn=Test One").unwrap();
    entry.set_rdn(&schema, rdn, true).unwrap();
    assert_eq!(entry.values(&schema, "uid").unwrap(), ["tester".to_string()]);
    assert_eq!(entry.values(&schema, "cn").unwrap(), ["Test One".to_string()]);
}

#[test]
fn test_change_operation_serialization() {
    let change = ChangeOperation::replace("sn", ["Tester"]);
    let json = serde_json::to_value(&change).unwrap();
    assert_eq!(json["operation"], "replace");
    assert_eq!(json["attribute"], "sn");
    let back: ChangeOperation = serde_json::from_value(json).unwrap();
    assert_eq!(back, change);
}
