//! Embedded core schema definitions.
//!
//! A working subset of RFC 4519, RFC 4524, RFC 2798 and RFC 2307 embedded as
//! static text, so a directory can start without external schema files. See
//! [`Schema::core`](super::Schema::core).

/// Attribute type definitions of the core schema.
pub fn core_attribute_types() -> &'static str {
    r#"# RFC 4512 / RFC 4519 base attributes
( 2.5.4.0 NAME 'objectClass'
  EQUALITY objectIdentifierMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.38
  X-ORIGIN 'RFC 4512' )
( 2.5.4.41 NAME 'name'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{32768}
  X-ORIGIN 'RFC 4519' )
( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.4 NAME ( 'sn' 'surname' ) SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.42 NAME 'givenName' SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.43 NAME 'initials' SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.12 NAME 'title' SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.10 NAME ( 'o' 'organizationName' ) SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.11 NAME ( 'ou' 'organizationalUnitName' ) SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.7 NAME ( 'l' 'localityName' ) SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.8 NAME ( 'st' 'stateOrProvinceName' ) SUP name X-ORIGIN 'RFC 4519' )
( 2.5.4.6 NAME ( 'c' 'countryName' ) SUP name
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.11
  SINGLE-VALUE
  X-ORIGIN 'RFC 4519' )
( 0.9.2342.19200300.100.1.25 NAME ( 'dc' 'domainComponent' )
  EQUALITY caseIgnoreIA5Match
  SUBSTR caseIgnoreIA5SubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.26
  SINGLE-VALUE
  X-ORIGIN 'RFC 4519' )
( 0.9.2342.19200300.100.1.1 NAME ( 'uid' 'userid' )
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{256}
  X-ORIGIN 'RFC 4519' )
( 0.9.2342.19200300.100.1.3 NAME ( 'mail' 'rfc822Mailbox' )
  EQUALITY caseIgnoreIA5Match
  SUBSTR caseIgnoreIA5SubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.26{256}
  X-ORIGIN 'RFC 4524' )
( 2.5.4.13 NAME 'description'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{1024}
  X-ORIGIN 'RFC 4519' )
( 2.5.4.20 NAME 'telephoneNumber'
  EQUALITY telephoneNumberMatch
  SUBSTR telephoneNumberSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.50{32}
  X-ORIGIN 'RFC 4519' )
( 2.5.4.35 NAME 'userPassword'
  EQUALITY octetStringMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.40{128}
  X-ORIGIN 'RFC 4519' )
( 2.5.4.49 NAME 'distinguishedName'
  EQUALITY distinguishedNameMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.12
  X-ORIGIN 'RFC 4519' )
( 2.5.4.34 NAME 'seeAlso' SUP distinguishedName X-ORIGIN 'RFC 4519' )
( 2.5.4.31 NAME 'member' SUP distinguishedName X-ORIGIN 'RFC 4519' )
( 2.5.4.32 NAME 'owner' SUP distinguishedName X-ORIGIN 'RFC 4519' )
( 2.5.4.50 NAME 'uniqueMember'
  EQUALITY uniqueMemberMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.34
  X-ORIGIN 'RFC 4519' )
( 2.5.4.9 NAME ( 'street' 'streetAddress' )
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{128}
  X-ORIGIN 'RFC 4519' )
( 2.5.4.17 NAME 'postalCode'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{40}
  X-ORIGIN 'RFC 4519' )
( 2.5.4.16 NAME 'postalAddress'
  EQUALITY caseIgnoreListMatch
  SUBSTR caseIgnoreListSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.41
  X-ORIGIN 'RFC 4519' )
( 2.5.4.15 NAME 'businessCategory'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{128}
  X-ORIGIN 'RFC 4519' )

# RFC 2798 inetOrgPerson attributes
( 2.16.840.1.113730.3.1.241 NAME 'displayName'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15
  SINGLE-VALUE
  X-ORIGIN 'RFC 2798' )
( 2.16.840.1.113730.3.1.3 NAME 'employeeNumber'
  EQUALITY caseIgnoreMatch
  SUBSTR caseIgnoreSubstringsMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.15
  SINGLE-VALUE
  X-ORIGIN 'RFC 2798' )

# RFC 2307 posixAccount attributes
( 1.3.6.1.1.1.1.0 NAME 'uidNumber'
  DESC 'An integer uniquely identifying a user in an administrative domain'
  EQUALITY integerMatch
  ORDERING integerOrderingMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.27
  SINGLE-VALUE )
( 1.3.6.1.1.1.1.1 NAME 'gidNumber'
  DESC 'An integer uniquely identifying a group in an administrative domain'
  EQUALITY integerMatch
  ORDERING integerOrderingMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.27
  SINGLE-VALUE )
( 1.3.6.1.1.1.1.3 NAME 'homeDirectory'
  DESC 'The absolute path to the home directory'
  EQUALITY caseExactIA5Match
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.26
  SINGLE-VALUE )
( 1.3.6.1.1.1.1.4 NAME 'loginShell'
  DESC 'The path to the login shell'
  EQUALITY caseExactIA5Match
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.26
  SINGLE-VALUE )

# RFC 4512 operational attributes
( 2.5.18.1 NAME 'createTimestamp'
  EQUALITY generalizedTimeMatch
  ORDERING generalizedTimeOrderingMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.24
  SINGLE-VALUE NO-USER-MODIFICATION
  USAGE directoryOperation )
( 2.5.18.2 NAME 'modifyTimestamp'
  EQUALITY generalizedTimeMatch
  ORDERING generalizedTimeOrderingMatch
  SYNTAX 1.3.6.1.4.1.1466.115.121.1.24
  SINGLE-VALUE NO-USER-MODIFICATION
  USAGE directoryOperation )
"#
}

/// Object class definitions of the core schema.
///
/// The `top` definition is present for completeness; the built-in root
/// class always takes its place.
pub fn core_object_classes() -> &'static str {
    r#"( 2.5.6.0 NAME 'top' ABSTRACT MUST objectClass X-ORIGIN 'RFC 4512' )
( 2.5.6.2 NAME 'country' SUP top STRUCTURAL
  MUST c
  MAY description
  X-ORIGIN 'RFC 4519' )
( 2.5.6.3 NAME 'locality' SUP top STRUCTURAL
  MAY ( street $ seeAlso $ st $ l $ description )
  X-ORIGIN 'RFC 4519' )
( 2.5.6.4 NAME 'organization' SUP top STRUCTURAL
  MUST o
  MAY ( userPassword $ seeAlso $ businessCategory $ postalCode $
        postalAddress $ telephoneNumber $ street $ st $ l $ description )
  X-ORIGIN 'RFC 4519' )
( 2.5.6.5 NAME 'organizationalUnit' SUP top STRUCTURAL
  MUST ou
  MAY ( userPassword $ seeAlso $ businessCategory $ postalCode $
        postalAddress $ telephoneNumber $ street $ st $ l $ description )
  X-ORIGIN 'RFC 4519' )
( 2.5.6.6 NAME 'person' SUP top STRUCTURAL
  MUST ( sn $ cn )
  MAY ( userPassword $ telephoneNumber $ seeAlso $ description )
  X-ORIGIN 'RFC 4519' )
( 2.5.6.7 NAME 'organizationalPerson' SUP person STRUCTURAL
  MAY ( title $ ou $ postalCode $ postalAddress $ street $ st $ l $ telephoneNumber )
  X-ORIGIN 'RFC 4519' )
( 2.16.840.1.113730.3.2.2 NAME 'inetOrgPerson' SUP organizationalPerson STRUCTURAL
  MAY ( businessCategory $ displayName $ employeeNumber $ givenName $
        initials $ mail $ o $ uid )
  X-ORIGIN 'RFC 2798' )
( 2.5.6.9 NAME 'groupOfNames' SUP top STRUCTURAL
  MUST ( member $ cn )
  MAY ( businessCategory $ seeAlso $ owner $ ou $ o $ description )
  X-ORIGIN 'RFC 4519' )
( 2.5.6.17 NAME 'groupOfUniqueNames' SUP top STRUCTURAL
  MUST ( uniqueMember $ cn )
  MAY ( businessCategory $ seeAlso $ owner $ ou $ o $ description )
  X-ORIGIN 'RFC 4519' )
( 2.5.6.11 NAME 'applicationProcess' SUP top STRUCTURAL
  MUST cn
  MAY ( seeAlso $ ou $ l $ description )
  X-ORIGIN 'RFC 4519' )
( 1.3.6.1.4.1.1466.344 NAME 'dcObject' SUP top AUXILIARY
  MUST dc
  X-ORIGIN 'RFC 4519' )
( 0.9.2342.19200300.100.4.13 NAME 'domain' SUP top STRUCTURAL
  MUST dc
  MAY ( userPassword $ telephoneNumber $ seeAlso $ businessCategory $
        description $ o $ l $ st $ street $ postalCode $ postalAddress )
  X-ORIGIN 'RFC 4524' )
( 0.9.2342.19200300.100.4.19 NAME 'simpleSecurityObject' SUP top AUXILIARY
  MUST userPassword
  X-ORIGIN 'RFC 4524' )
( 1.3.6.1.1.1.2.0 NAME 'posixAccount' SUP top AUXILIARY
  DESC 'Abstraction of an account with POSIX attributes'
  MUST ( cn $ uid $ uidNumber $ gidNumber $ homeDirectory )
  MAY ( userPassword $ loginShell $ description )
  X-ORIGIN 'RFC 2307' )
"#
}
