//! The request boundary for the protocol layer.
//!
//! A [`DirectoryOperation`] carries names and filters as text, the way a
//! decoded request delivers them. [`DirectoryServer::execute`] normalises
//! them against the schema, runs the operation through the scheduler and
//! reports any failure as an [`LdapError`].

use super::core::DirectoryServer;
use crate::dit::{Filter, SearchScope};
use crate::dn::Rdn;
use crate::entry::{ChangeOperation, Entry, EntryOptions};
use crate::error::{DirectoryResult, LdapError};

/// A directory request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOperation {
    Get {
        dn: String,
    },
    Add {
        dn: String,
        options: EntryOptions,
    },
    Modify {
        dn: String,
        changes: Vec<ChangeOperation>,
    },
    ModifyDn {
        dn: String,
        new_rdn: String,
        delete_old_rdn: bool,
        new_superior: Option<String>,
    },
    Delete {
        dn: String,
    },
    /// `scope` is the protocol value, validated on execution.
    Search {
        base: String,
        scope: i64,
        filter: String,
    },
    Compare {
        dn: String,
        attribute: String,
        value: String,
    },
}

impl DirectoryOperation {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DirectoryOperation::Get { .. } => "get",
            DirectoryOperation::Add { .. } => "add",
            DirectoryOperation::Modify { .. } => "modify",
            DirectoryOperation::ModifyDn { .. } => "modifyDN",
            DirectoryOperation::Delete { .. } => "delete",
            DirectoryOperation::Search { .. } => "search",
            DirectoryOperation::Compare { .. } => "compare",
        }
    }
}

/// The successful result of a [`DirectoryOperation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Result of `Get`
    Entry(Entry),
    /// Result of `Search`
    Entries(Vec<Entry>),
    /// Result of `Compare`
    Compared(bool),
    /// Add, modify, rename and delete carry no data
    Done,
}

impl DirectoryServer {
    /// Execute a request on behalf of the protocol layer.
    ///
    /// # Errors
    ///
    /// Every failure is reported as an [`LdapError`] carrying the result
    /// code, the matched DN where one applies, and a diagnostic message.
    pub async fn execute(&self, operation: DirectoryOperation) -> Result<OperationOutcome, LdapError> {
        let name = operation.name();
        self.dispatch(operation).await.map_err(|error| {
            log::debug!("{name} failed: {error}");
            LdapError::from(error)
        })
    }

    async fn dispatch(&self, operation: DirectoryOperation) -> DirectoryResult<OperationOutcome> {
        match operation {
            DirectoryOperation::Get { dn } => {
                let dn = self.parse_dn(&dn)?;
                Ok(OperationOutcome::Entry(self.get_entry(&dn).await?))
            }
            DirectoryOperation::Add { dn, options } => {
                let dn = self.parse_dn(&dn)?;
                let entry = Entry::new(self.schema(), dn.clone(), options)?;
                self.insert_entry(&dn, entry).await?;
                Ok(OperationOutcome::Done)
            }
            DirectoryOperation::Modify { dn, changes } => {
                let dn = self.parse_dn(&dn)?;
                self.modify_entry(&dn, changes).await?;
                Ok(OperationOutcome::Done)
            }
            DirectoryOperation::ModifyDn {
                dn,
                new_rdn,
                delete_old_rdn,
                new_superior,
            } => {
                let dn = self.parse_dn(&dn)?;
                let new_rdn = Rdn::parse(self.schema(), &new_rdn)?;
                let new_superior = new_superior.map(|text| self.parse_dn(&text)).transpose()?;
                self.modify_entry_dn(&dn, new_rdn, delete_old_rdn, new_superior)
                    .await?;
                Ok(OperationOutcome::Done)
            }
            DirectoryOperation::Delete { dn } => {
                let dn = self.parse_dn(&dn)?;
                self.delete_entry(&dn).await?;
                Ok(OperationOutcome::Done)
            }
            DirectoryOperation::Search { base, scope, filter } => {
                let base = self.parse_dn(&base)?;
                let scope = SearchScope::try_from(scope)?;
                let filter = Filter::parse(&filter)?;
                Ok(OperationOutcome::Entries(self.search(&base, scope, filter).await?))
            }
            DirectoryOperation::Compare { dn, attribute, value } => {
                let dn = self.parse_dn(&dn)?;
                Ok(OperationOutcome::Compared(
                    self.compare(&dn, &attribute, &value).await?,
                ))
            }
        }
    }
}
