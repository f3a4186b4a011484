//! Property tests for DN escaping and schema tokenization.

use crate::common::core_schema;
use ldap_dit::schema::loader::{TokenKind, tokenize};
use ldap_dit::{Ava, Dn, Rdn};
use proptest::prelude::*;

proptest! {
    #[test]
    fn dn_display_parses_back_to_the_same_values(
        values in prop::collection::vec("[a-zA-Z0-9 ,+=#;<>\"\\\\]{1,16}", 1..4)
    ) {
        let schema = core_schema();
        let mut rdns = Vec::new();
        for value in &values {
            let ava = Ava::new(&schema, "cn", value.clone());
            prop_assume!(ava.is_ok());
            rdns.push(Rdn::new(vec![ava.unwrap()]).unwrap());
        }
        let original = Dn::from_rdns(rdns);

        let reparsed = Dn::parse(&schema, &original.to_string()).unwrap();
        prop_assert_eq!(reparsed.len(), original.len());
        for (a, b) in original.rdns().iter().zip(reparsed.rdns()) {
            prop_assert_eq!(&a.avas()[0].value, &b.avas()[0].value);
        }
    }

    #[test]
    fn numeric_oids_classify_as_numericoid(oid in "[0-9]{1,4}(\\.[0-9]{1,4}){0,6}") {
        let tokens = tokenize(&oid).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::NumericOid);
        prop_assert_eq!(&tokens[0].text, &oid);
    }

    #[test]
    fn descriptors_classify_by_quoting(descr in "[a-z][a-zA-Z0-9-]{0,12}") {
        let bare = tokenize(&descr).unwrap();
        prop_assert_eq!(bare[0].kind, TokenKind::Descr);

        let quoted = tokenize(&format!("'{descr}'")).unwrap();
        prop_assert_eq!(quoted[0].kind, TokenKind::QDescr);
        prop_assert_eq!(&quoted[0].text, &descr);
    }

    #[test]
    fn tokenizer_never_panics(text in "[ -~\n]{0,64}") {
        let _ = tokenize(&text);
    }
}
