//! Error types for directory operations.
//!
//! This module provides the error taxonomy of the directory core. Every
//! request-time failure is a [`DirectoryError`] which knows the LDAP
//! [`ResultCode`] it maps to and, where meaningful, the matched-DN prefix.
//! Schema bootstrap failures are [`SchemaError`]s and entry validation
//! failures are [`ValidationError`]s; both convert into [`DirectoryError`].
//!
//! The protocol layer does not consume these enums directly: it receives an
//! [`LdapError`], the flattened `{resultCode, matchedDN, diagnosticMessage}`
//! triple of RFC 4511.

use serde::Serialize;
use std::fmt;

/// LDAP result codes as defined in RFC 4511 Appendix A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
#[repr(u32)]
pub enum ResultCode {
    Success = 0,
    OperationsError = 1,
    ProtocolError = 2,
    TimeLimitExceeded = 3,
    SizeLimitExceeded = 4,
    CompareFalse = 5,
    CompareTrue = 6,
    AuthMethodNotSupported = 7,
    StrongerAuthRequired = 8,
    Referral = 10,
    AdminLimitExceeded = 11,
    UnavailableCriticalExtension = 12,
    ConfidentialityRequired = 13,
    SaslBindInProgress = 14,
    NoSuchAttribute = 16,
    UndefinedAttributeType = 17,
    InappropriateMatching = 18,
    ConstraintViolation = 19,
    AttributeOrValueExists = 20,
    InvalidAttributeSyntax = 21,
    NoSuchObject = 32,
    AliasProblem = 33,
    InvalidDnSyntax = 34,
    AliasDereferencingProblem = 36,
    InappropriateAuthentication = 48,
    InvalidCredentials = 49,
    InsufficientAccessRights = 50,
    Busy = 51,
    Unavailable = 52,
    UnwillingToPerform = 53,
    LoopDetect = 54,
    NamingViolation = 64,
    ObjectClassViolation = 65,
    NotAllowedOnNonLeaf = 66,
    NotAllowedOnRdn = 67,
    EntryAlreadyExists = 68,
    ObjectClassModsProhibited = 69,
    AffectsMultipleDsas = 71,
    Other = 80,
}

impl ResultCode {
    /// Numeric value carried on the wire.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// The camelCase name used by RFC 4511.
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::OperationsError => "operationsError",
            ResultCode::ProtocolError => "protocolError",
            ResultCode::TimeLimitExceeded => "timeLimitExceeded",
            ResultCode::SizeLimitExceeded => "sizeLimitExceeded",
            ResultCode::CompareFalse => "compareFalse",
            ResultCode::CompareTrue => "compareTrue",
            ResultCode::AuthMethodNotSupported => "authMethodNotSupported",
            ResultCode::StrongerAuthRequired => "strongerAuthRequired",
            ResultCode::Referral => "referral",
            ResultCode::AdminLimitExceeded => "adminLimitExceeded",
            ResultCode::UnavailableCriticalExtension => "unavailableCriticalExtension",
            ResultCode::ConfidentialityRequired => "confidentialityRequired",
            ResultCode::SaslBindInProgress => "saslBindInProgress",
            ResultCode::NoSuchAttribute => "noSuchAttribute",
            ResultCode::UndefinedAttributeType => "undefinedAttributeType",
            ResultCode::InappropriateMatching => "inappropriateMatching",
            ResultCode::ConstraintViolation => "constraintViolation",
            ResultCode::AttributeOrValueExists => "attributeOrValueExists",
            ResultCode::InvalidAttributeSyntax => "invalidAttributeSyntax",
            ResultCode::NoSuchObject => "noSuchObject",
            ResultCode::AliasProblem => "aliasProblem",
            ResultCode::InvalidDnSyntax => "invalidDNSyntax",
            ResultCode::AliasDereferencingProblem => "aliasDereferencingProblem",
            ResultCode::InappropriateAuthentication => "inappropriateAuthentication",
            ResultCode::InvalidCredentials => "invalidCredentials",
            ResultCode::InsufficientAccessRights => "insufficientAccessRights",
            ResultCode::Busy => "busy",
            ResultCode::Unavailable => "unavailable",
            ResultCode::UnwillingToPerform => "unwillingToPerform",
            ResultCode::LoopDetect => "loopDetect",
            ResultCode::NamingViolation => "namingViolation",
            ResultCode::ObjectClassViolation => "objectClassViolation",
            ResultCode::NotAllowedOnNonLeaf => "notAllowedOnNonLeaf",
            ResultCode::NotAllowedOnRdn => "notAllowedOnRDN",
            ResultCode::EntryAlreadyExists => "entryAlreadyExists",
            ResultCode::ObjectClassModsProhibited => "objectClassModsProhibited",
            ResultCode::AffectsMultipleDsas => "affectsMultipleDSAs",
            ResultCode::Other => "other",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Main error type for directory operations.
///
/// Each variant maps onto exactly one [`ResultCode`]; see
/// [`DirectoryError::result_code`].
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Lookup failed part-way down the tree.
    ///
    /// `matched_dn` is the longest prefix of `dn` that resolved.
    #[error("No such object: '{dn}' (matched '{matched_dn}')")]
    NoSuchObject { dn: String, matched_dn: String },

    /// Delete attempted on an entry that still has subordinates
    #[error("Entry '{dn}' is not a leaf")]
    NodeNotLeaf { dn: String },

    /// Search scope outside the four defined values
    #[error("Unknown search scope {scope}")]
    UnknownScope { scope: i64 },

    /// An entry with the same RDN already exists under the parent
    #[error("Entry '{dn}' already exists")]
    EntryAlreadyExists { dn: String },

    /// Malformed distinguished name text
    #[error("Invalid DN syntax '{dn}': {details}")]
    InvalidDnSyntax { dn: String, details: String },

    /// Malformed filter text
    #[error("Invalid filter '{filter}': {details}")]
    InvalidFilter { filter: String, details: String },

    /// Entry content does not satisfy the schema
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Comparison requested on an attribute with no rule of that kind
    #[error("Attribute '{attribute}' has no {kind} matching rule")]
    InappropriateMatching { attribute: String, kind: String },

    /// The request is well-formed but the directory will not carry it out
    #[error("Unwilling to perform: {message}")]
    UnwillingToPerform { message: String },

    /// A search produced more entries than the configured limit
    #[error("Size limit of {limit} entries exceeded")]
    SizeLimitExceeded { limit: usize },

    /// The scheduler has been shut down
    #[error("Directory is not accepting requests")]
    Unavailable,

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// Schema bootstrap failure
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Internal failures such as a lost reply channel
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Validation errors raised when an entry does not conform to the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Attribute name or OID not present in the schema
    #[error("Undefined attribute type '{attribute}'")]
    UndefinedAttributeType { attribute: String },

    /// Object class name or OID not present in the schema
    #[error("Unknown object class '{object_class}'")]
    UnknownObjectClass { object_class: String },

    /// Structural slot filled by a non-structural class
    #[error("Object class '{object_class}' is not structural")]
    NotStructural { object_class: String },

    /// Auxiliary slot filled by a non-auxiliary class
    #[error("Object class '{object_class}' is not auxiliary")]
    NotAuxiliary { object_class: String },

    /// A MUST attribute of one of the entry's classes is absent
    #[error("Attribute '{attribute}' required by object class '{object_class}' is missing")]
    MissingRequiredAttribute {
        attribute: String,
        object_class: String,
    },

    /// Attribute is in no MUST or MAY list of the entry's classes
    #[error("Attribute '{attribute}' is not allowed by the entry's object classes")]
    AttributeNotAllowed { attribute: String },

    /// More than one value for a SINGLE-VALUE attribute
    #[error("Attribute '{attribute}' is single-valued")]
    SingleValueViolation { attribute: String },

    /// Attribute absent where it was expected
    #[error("No such attribute '{attribute}'")]
    NoSuchAttribute { attribute: String },

    /// Value absent where it was expected
    #[error("Attribute '{attribute}' has no value '{value}'")]
    NoSuchValue { attribute: String, value: String },

    /// Value rejected by the attribute's syntax
    #[error("Value '{value}' of attribute '{attribute}' is invalid for syntax {syntax}")]
    InvalidAttributeSyntax {
        attribute: String,
        value: String,
        syntax: String,
    },

    /// Value longer than the attribute's declared bound
    #[error("Value of attribute '{attribute}' exceeds {max} characters")]
    ValueTooLong { attribute: String, max: u32 },

    /// Change would remove a naming value
    #[error("Attribute '{attribute}' value '{value}' is part of the RDN")]
    NotAllowedOnRdn { attribute: String, value: String },

    /// User change of an attribute maintained by the directory
    #[error("Attribute '{attribute}' is not user-modifiable")]
    NoUserModification { attribute: String },

    /// Attribute syntax has no validator
    #[error("Syntax {syntax} of attribute '{attribute}' is not implemented")]
    UnimplementedSyntax { attribute: String, syntax: String },

    /// Add operation with nothing to add
    #[error("No values supplied for attribute '{attribute}'")]
    EmptyValues { attribute: String },
}

/// Errors raised while loading and resolving a textual schema.
///
/// All of these are fatal to bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Token stream does not match the definition grammar
    #[error("Parse error on line {line}: {message} (found {token} '{text}')")]
    Parse {
        message: String,
        token: String,
        text: String,
        line: usize,
    },

    /// Input ended with open parentheses or closed one never opened
    #[error("Unbalanced parentheses near line {line}")]
    UnbalancedParentheses { line: usize },

    /// Keyword outside the clause set of the definition kind
    #[error("Unknown keyword '{keyword}' on line {line}")]
    UnknownKeyword { keyword: String, line: usize },

    /// Definition without a leading numeric OID
    #[error("Definition is missing its numeric OID")]
    MissingOid,

    /// Two definitions share an OID or a name
    #[error("Duplicate definition of '{name}'")]
    DuplicateDefinition { name: String },

    /// SUP names nothing defined in the batch
    #[error("Definition {definition} references unknown superior '{superior}'")]
    UnknownSuperior {
        definition: String,
        superior: String,
    },

    /// EQUALITY, ORDERING or SUBSTR names no catalogued rule
    #[error("Definition {definition} references unknown matching rule '{rule}'")]
    UnknownMatchingRule { definition: String, rule: String },

    /// Rule catalogued, but of a different kind than the clause
    #[error("Definition {definition} uses '{rule}' where a {expected} rule is required")]
    WrongRuleKind {
        definition: String,
        rule: String,
        expected: String,
    },

    /// SYNTAX names no catalogued syntax
    #[error("Definition {definition} references unknown syntax '{syntax}'")]
    UnknownSyntax { definition: String, syntax: String },

    /// MUST or MAY names no attribute type
    #[error("Object class {definition} references unknown attribute '{attribute}'")]
    UnknownAttribute {
        definition: String,
        attribute: String,
    },

    /// SUP chain loops back on itself
    #[error("Superior chain of {definition} is cyclic")]
    SuperiorCycle { definition: String },

    /// Reading schema text failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The wire-facing failure triple handed to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{result_code}: {diagnostic_message}")]
pub struct LdapError {
    pub result_code: ResultCode,
    #[serde(rename = "matchedDN")]
    pub matched_dn: String,
    pub diagnostic_message: String,
}

impl ValidationError {
    /// The result code this validation failure is reported with.
    pub fn result_code(&self) -> ResultCode {
        match self {
            ValidationError::UndefinedAttributeType { .. } => ResultCode::UndefinedAttributeType,
            ValidationError::UnknownObjectClass { .. }
            | ValidationError::NotStructural { .. }
            | ValidationError::NotAuxiliary { .. }
            | ValidationError::MissingRequiredAttribute { .. }
            | ValidationError::AttributeNotAllowed { .. } => ResultCode::ObjectClassViolation,
            ValidationError::SingleValueViolation { .. }
            | ValidationError::ValueTooLong { .. }
            | ValidationError::NoUserModification { .. } => ResultCode::ConstraintViolation,
            ValidationError::NoSuchAttribute { .. } | ValidationError::NoSuchValue { .. } => {
                ResultCode::NoSuchAttribute
            }
            ValidationError::InvalidAttributeSyntax { .. } => ResultCode::InvalidAttributeSyntax,
            ValidationError::NotAllowedOnRdn { .. } => ResultCode::NotAllowedOnRdn,
            ValidationError::UnimplementedSyntax { .. } => ResultCode::UnwillingToPerform,
            ValidationError::EmptyValues { .. } => ResultCode::ProtocolError,
        }
    }

    /// Create an undefined attribute type error
    pub fn undefined_attribute(attribute: impl Into<String>) -> Self {
        Self::UndefinedAttributeType {
            attribute: attribute.into(),
        }
    }

    /// Create an unknown object class error
    pub fn unknown_object_class(object_class: impl Into<String>) -> Self {
        Self::UnknownObjectClass {
            object_class: object_class.into(),
        }
    }
}

impl DirectoryError {
    /// The result code this error is reported with.
    pub fn result_code(&self) -> ResultCode {
        match self {
            DirectoryError::NoSuchObject { .. } => ResultCode::NoSuchObject,
            DirectoryError::NodeNotLeaf { .. } => ResultCode::NotAllowedOnNonLeaf,
            DirectoryError::UnknownScope { .. } => ResultCode::ProtocolError,
            DirectoryError::EntryAlreadyExists { .. } => ResultCode::EntryAlreadyExists,
            DirectoryError::InvalidDnSyntax { .. } => ResultCode::InvalidDnSyntax,
            DirectoryError::InvalidFilter { .. } => ResultCode::ProtocolError,
            DirectoryError::Validation(e) => e.result_code(),
            DirectoryError::InappropriateMatching { .. } => ResultCode::InappropriateMatching,
            DirectoryError::UnwillingToPerform { .. } => ResultCode::UnwillingToPerform,
            DirectoryError::SizeLimitExceeded { .. } => ResultCode::SizeLimitExceeded,
            DirectoryError::Unavailable => ResultCode::Unavailable,
            DirectoryError::Configuration { .. } | DirectoryError::Schema(_) => ResultCode::Other,
            DirectoryError::Internal { .. } => ResultCode::OperationsError,
        }
    }

    /// The matched-DN prefix, empty unless the error carries one.
    pub fn matched_dn(&self) -> &str {
        match self {
            DirectoryError::NoSuchObject { matched_dn, .. } => matched_dn,
            _ => "",
        }
    }

    /// Create a no-such-object error
    pub fn no_such_object(dn: impl Into<String>, matched_dn: impl Into<String>) -> Self {
        Self::NoSuchObject {
            dn: dn.into(),
            matched_dn: matched_dn.into(),
        }
    }

    /// Create an invalid DN syntax error
    pub fn invalid_dn(dn: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidDnSyntax {
            dn: dn.into(),
            details: details.into(),
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(filter: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.into(),
            details: details.into(),
        }
    }

    /// Create an inappropriate matching error
    pub fn inappropriate_matching(attribute: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::InappropriateMatching {
            attribute: attribute.into(),
            kind: kind.into(),
        }
    }

    /// Create an unwilling-to-perform error
    pub fn unwilling(message: impl Into<String>) -> Self {
        Self::UnwillingToPerform {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<&DirectoryError> for LdapError {
    fn from(error: &DirectoryError) -> Self {
        Self {
            result_code: error.result_code(),
            matched_dn: error.matched_dn().to_string(),
            diagnostic_message: error.to_string(),
        }
    }
}

impl From<DirectoryError> for LdapError {
    fn from(error: DirectoryError) -> Self {
        Self::from(&error)
    }
}

// Result type aliases for convenience
pub type DirectoryResult<T> = Result<T, DirectoryError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type SchemaResult<T> = Result<T, SchemaError>;
