//! Scoped search over the tree.

use super::{Dit, Filter, ROOT};
use crate::dn::Dn;
use crate::entry::Entry;
use crate::error::{DirectoryError, DirectoryResult};
use serde::{Deserialize, Serialize};

/// How far below the base a search reaches (RFC 4511 §4.5.1.2).
///
/// Discriminants are the protocol values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchScope {
    /// Only the base entry
    BaseObject = 0,
    /// Direct children of the base
    SingleLevel = 1,
    /// The base and all its descendants
    WholeSubtree = 2,
    /// All descendants, the base excluded
    SubordinateSubtree = 3,
}

impl TryFrom<i64> for SearchScope {
    type Error = DirectoryError;

    fn try_from(scope: i64) -> Result<Self, Self::Error> {
        match scope {
            0 => Ok(SearchScope::BaseObject),
            1 => Ok(SearchScope::SingleLevel),
            2 => Ok(SearchScope::WholeSubtree),
            3 => Ok(SearchScope::SubordinateSubtree),
            _ => Err(DirectoryError::UnknownScope { scope }),
        }
    }
}

impl Dit {
    /// Entries within `scope` of `base` matching `filter`, in depth-first
    /// pre-order. The root anchor is never returned.
    ///
    /// # Errors
    ///
    /// `NoSuchObject` if the base does not exist.
    pub fn search(&self, base: &Dn, scope: SearchScope, filter: &Filter) -> DirectoryResult<Vec<Entry>> {
        self.search_limited(base, scope, filter, 0)
    }

    /// Like [`search`](Self::search), failing once more than `size_limit`
    /// entries match. A limit of 0 means unlimited.
    ///
    /// # Errors
    ///
    /// * `NoSuchObject` if the base does not exist
    /// * `SizeLimitExceeded` if too many entries match
    pub fn search_limited(
        &self,
        base: &Dn,
        scope: SearchScope,
        filter: &Filter,
        size_limit: usize,
    ) -> DirectoryResult<Vec<Entry>> {
        let base_index = self.locate(base)?;
        let candidates = match scope {
            SearchScope::BaseObject => vec![base_index],
            SearchScope::SingleLevel => self.node(base_index)?.children.clone(),
            SearchScope::WholeSubtree => self.subtree(base_index, true)?,
            SearchScope::SubordinateSubtree => self.subtree(base_index, false)?,
        };

        let mut results = Vec::new();
        for index in candidates {
            if index == ROOT {
                continue;
            }
            let entry = &self.node(index)?.entry;
            if filter.matches(entry, &self.schema) {
                if size_limit > 0 && results.len() == size_limit {
                    return Err(DirectoryError::SizeLimitExceeded { limit: size_limit });
                }
                results.push(entry.clone());
            }
        }
        log::trace!(
            "Search from '{base}' ({scope:?}, {filter}) returned {} entries",
            results.len()
        );
        Ok(results)
    }

    /// Indexes below `index` in depth-first pre-order.
    fn subtree(&self, index: usize, include_base: bool) -> DirectoryResult<Vec<usize>> {
        let mut order = Vec::new();
        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            if current != index || include_base {
                order.push(current);
            }
            pending.extend(self.node(current)?.children.iter().rev());
        }
        Ok(order)
    }
}
