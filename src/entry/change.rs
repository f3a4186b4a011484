//! Modification requests applied by `ModifyEntry`.

use serde::{Deserialize, Serialize};

/// A single change to one attribute of an entry (RFC 4511 §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ChangeOperation {
    /// Add values, keeping the existing ones
    Add { attribute: String, values: Vec<String> },
    /// Remove the named values, or the whole attribute when none are named
    Delete { attribute: String, values: Vec<String> },
    /// Remove every existing value, then add the given ones
    Replace { attribute: String, values: Vec<String> },
}

fn collect<I, V>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl ChangeOperation {
    pub fn add<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::Add {
            attribute: attribute.into(),
            values: collect(values),
        }
    }

    pub fn delete<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::Delete {
            attribute: attribute.into(),
            values: collect(values),
        }
    }

    /// Delete the attribute with all its values.
    pub fn delete_all(attribute: impl Into<String>) -> Self {
        Self::Delete {
            attribute: attribute.into(),
            values: Vec::new(),
        }
    }

    pub fn replace<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::Replace {
            attribute: attribute.into(),
            values: collect(values),
        }
    }

    /// The attribute name or OID this change targets.
    pub fn attribute(&self) -> &str {
        match self {
            Self::Add { attribute, .. } | Self::Delete { attribute, .. } | Self::Replace { attribute, .. } => {
                attribute
            }
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            Self::Add { values, .. } | Self::Delete { values, .. } | Self::Replace { values, .. } => values,
        }
    }
}
