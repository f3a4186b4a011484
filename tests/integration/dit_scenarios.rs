//! Tree behaviour over the sample directory.

use crate::common::{core_schema, dn, init_logging, scenario_dit, scenario_entries};
use ldap_dit::{ChangeOperation, DirectoryError, Filter, Rdn, ResultCode, SearchScope};

#[test]
fn test_every_inserted_entry_is_found_at_its_dn() {
    init_logging();
    let dit = scenario_dit();
    let schema = core_schema();
    for entry in scenario_entries(&schema) {
        let found = dit.get_entry(entry.dn()).unwrap();
        assert!(found.dn().matches(entry.dn(), &schema));
    }
}

#[test]
fn test_not_found_reports_exact_matched_prefix() {
    let dit = scenario_dit();
    let schema = core_schema();
    let cases = [
        ("dc=nowhere", ""),
        ("dc=nowhere,dc=dev", "dc=dev"),
        ("cn=Test9,ou=TestOu,dc=georgiboy,dc=dev", "ou=TestOu,dc=georgiboy,dc=dev"),
        ("cn=a,cn=b,cn=Test1,dc=georgiboy,dc=dev", "cn=Test1,dc=georgiboy,dc=dev"),
    ];
    for (requested, matched) in cases {
        let error = dit.get_entry(&dn(&schema, requested)).unwrap_err();
        match error {
            DirectoryError::NoSuchObject { dn, matched_dn } => {
                assert_eq!(dn, requested);
                assert_eq!(matched_dn, matched, "{requested}");
            }
            other => panic!("expected NoSuchObject for {requested}, got {other:?}"),
        }
    }
}

#[test]
fn test_delete_requires_leaf() {
    let mut dit = scenario_dit();
    let schema = core_schema();
    let ou = dn(&schema, "ou=TestOu,dc=georgiboy,dc=dev");
    let before = dit.len();
    assert!(matches!(dit.delete_entry(&ou), Err(DirectoryError::NodeNotLeaf { .. })));
    assert_eq!(dit.len(), before);

    for leaf in ["cn=Test2", "cn=Test3"] {
        dit.delete_entry(&dn(&schema, &format!("{leaf},ou=TestOu,dc=georgiboy,dc=dev")))
            .unwrap();
    }
    dit.delete_entry(&ou).unwrap();
    assert_eq!(dit.get_entry(&ou).unwrap_err().result_code(), ResultCode::NoSuchObject);
}

#[test]
fn test_failed_modify_is_invisible() {
    let mut dit = scenario_dit();
    let schema = core_schema();
    let name = dn(&schema, "cn=Test1,dc=georgiboy,dc=dev");
    let before = dit.get_entry(&name).unwrap().clone();

    let failing_lists = [
        vec![
            ChangeOperation::replace("sn", ["Changed"]),
            ChangeOperation::add("bogusAttribute", ["x"]),
        ],
        vec![
            ChangeOperation::add("description", ["added"]),
            ChangeOperation::delete_all("sn"),
        ],
        vec![
            ChangeOperation::add("mail", ["second@georgiboy.dev"]),
            ChangeOperation::delete("mail", ["never-there@georgiboy.dev"]),
        ],
    ];
    for changes in failing_lists {
        assert!(dit.modify_entry(&name, &changes).is_err());
        assert_eq!(dit.get_entry(&name).unwrap(), &before);
    }
}

#[test]
fn test_single_value_attribute_keeps_original() {
    let mut dit = scenario_dit();
    let schema = core_schema();
    let name = dn(&schema, "cn=Test1,dc=georgiboy,dc=dev");
    dit.modify_entry(&name, &[ChangeOperation::add("employeeNumber", ["42"])])
        .unwrap();
    let error = dit
        .modify_entry(&name, &[ChangeOperation::add("employeeNumber", ["43"])])
        .unwrap_err();
    assert_eq!(error.result_code(), ResultCode::ConstraintViolation);
    let entry = dit.get_entry(&name).unwrap();
    assert_eq!(entry.values(&schema, "employeeNumber").unwrap(), ["42".to_string()]);
}

#[test]
fn test_search_scope_scenario() {
    let dit = scenario_dit();
    let schema = core_schema();
    let tester = Filter::parse("(sn=Tester)").unwrap();

    let found = dit
        .search(&dn(&schema, "dc=georgiboy,dc=dev"), SearchScope::WholeSubtree, &tester)
        .unwrap();
    assert_eq!(found.len(), 3);

    let found = dit
        .search(&dn(&schema, "ou=TestOu,dc=georgiboy,dc=dev"), SearchScope::SingleLevel, &tester)
        .unwrap();
    let names: Vec<String> = found.iter().map(|e| e.dn().to_string()).collect();
    assert_eq!(
        names,
        ["cn=Test2,ou=TestOu,dc=georgiboy,dc=dev", "cn=Test3,ou=TestOu,dc=georgiboy,dc=dev"]
    );

    let base = dn(&schema, "cn=Test1,dc=georgiboy,dc=dev");
    let found = dit
        .search(&base, SearchScope::BaseObject, &Filter::parse("(cn=Test1)").unwrap())
        .unwrap();
    assert_eq!(found, [dit.get_entry(&base).unwrap().clone()]);
    let found = dit
        .search(&base, SearchScope::BaseObject, &Filter::parse("(cn=unknown)").unwrap())
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_compound_filters() {
    let dit = scenario_dit();
    let schema = core_schema();
    let base = dn(&schema, "dc=dev");
    let count = |text: &str| {
        dit.search(&base, SearchScope::WholeSubtree, &Filter::parse(text).unwrap())
            .unwrap()
            .len()
    };
    assert_eq!(count("(objectClass=person)"), 3);
    assert_eq!(count("(objectClass=inetOrgPerson)"), 1);
    assert_eq!(count("(&(objectClass=person)(!(cn=Test1)))"), 2);
    assert_eq!(count("(|(ou=TestOu)(dc=georgiboy))"), 2);
    assert_eq!(count("(mail=*)"), 1);
    assert_eq!(count("(cn=test*)"), 3);
    // undefined assertions never select anything, negated or not
    assert_eq!(count("(noSuchAttribute=x)"), 0);
    assert_eq!(count("(!(noSuchAttribute=x))"), 0);
}

#[test]
fn test_rename_and_move_scenario() {
    let mut dit = scenario_dit();
    let schema = core_schema();
    let old = dn(&schema, "cn=Test1,dc=georgiboy,dc=dev");
    let new_superior = dn(&schema, "ou=TestOu,dc=georgiboy,dc=dev");
    let rdn = Rdn::parse(&schema, "givenName=Test1Moved").unwrap();

    // cn=Test1 is the only cn value, so it has to stay unless another is added
    dit.modify_entry(&old, &[ChangeOperation::add("cn", ["Test One"])]).unwrap();
    dit.modify_entry_dn(&old, rdn, true, Some(&new_superior)).unwrap();

    let moved = dn(&schema, "givenName=Test1Moved,ou=TestOu,dc=georgiboy,dc=dev");
    let entry = dit.get_entry(&moved).unwrap();
    assert!(!entry.contains_attr_val(&schema, "cn", "Test1").unwrap());
    assert_eq!(dit.get_entry(&old).unwrap_err().result_code(), ResultCode::NoSuchObject);
}

#[test]
fn test_entries_render_as_ldif() {
    let dit = scenario_dit();
    let schema = core_schema();
    let entry = dit.get_entry(&dn(&schema, "cn=Test1,dc=georgiboy,dc=dev")).unwrap();
    let ldif = entry.to_ldif(&schema);
    assert!(ldif.starts_with("dn: cn=Test1,dc=georgiboy,dc=dev\n"));
    assert!(ldif.contains("objectClass: inetOrgPerson\n"));
    assert!(ldif.contains("sn: Tester\n"));
    assert!(ldif.contains("mail: test1@georgiboy.dev\n"));
}
