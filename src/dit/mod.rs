//! The directory information tree.
//!
//! This module provides the in-memory tree of entries. Nodes live in an arena
//! and refer to their parent and children by index, so no node is ever
//! aliased mutably and entries handed out are plain values.
//!
//! # Features
//!
//! * Lookup by DN with matched-prefix reporting on failure
//! * Copy-on-write modification: a failed change list leaves the entry untouched
//! * Rename and move with descendant DNs rebased
//! * Leaf-only deletion
//! * Scoped search with three-valued filters
//!
//! # Example Usage
//!
//! ```rust
//! use ldap_dit::{Dit, Dn, Entry, EntryOptions, Filter, Schema, SearchScope};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::core()?);
//! let mut dit = Dit::new(schema.clone());
//!
//! let dn = Dn::parse(&schema, "dc=dev")?;
//! dit.insert_entry(&dn, Entry::new(&schema, dn.clone(), EntryOptions::new("domain"))?)?;
//!
//! let found = dit.search(&Dn::root(), SearchScope::WholeSubtree, &Filter::parse("(dc=dev)")?)?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

mod filter;
mod search;


pub use filter::Filter;
pub use search::SearchScope;

use crate::dn::{Dn, Rdn};
use crate::entry::{ChangeOperation, Entry};
use crate::error::{DirectoryError, DirectoryResult, ValidationError};
use crate::schema::Schema;
use chrono::Utc;
use std::sync::Arc;

const ROOT: usize = 0;
const CREATE_TIMESTAMP: &str = "createTimestamp";
const MODIFY_TIMESTAMP: &str = "modifyTimestamp";

#[derive(Debug, Clone)]
struct DitNode {
    entry: Entry,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// In-memory directory tree.
///
/// The tree is not synchronized; concurrent access goes through the
/// [`DirectoryServer`](crate::DirectoryServer) scheduler, whose worker task
/// owns the only `Dit`.
#[derive(Debug, Clone)]
pub struct Dit {
    schema: Arc<Schema>,
    nodes: Vec<Option<DitNode>>,
    free: Vec<usize>,
}

impl Dit {
    /// Create an empty tree holding only the root anchor.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            nodes: vec![Some(DitNode {
                entry: Entry::root(),
                parent: None,
                children: Vec::new(),
            })],
            free: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of entries, the root anchor excluded.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, index: usize) -> DirectoryResult<&DitNode> {
        self.nodes
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| DirectoryError::internal(format!("dangling node index {index}")))
    }

    fn node_mut(&mut self, index: usize) -> DirectoryResult<&mut DitNode> {
        self.nodes
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or_else(|| DirectoryError::internal(format!("dangling node index {index}")))
    }

    /// The child of `parent` whose RDN matches `rdn`.
    fn find_child(&self, parent: usize, rdn: &Rdn) -> DirectoryResult<Option<usize>> {
        for &child in &self.node(parent)?.children {
            let entry = &self.node(child)?.entry;
            if entry.dn().rdn().is_some_and(|r| r.matches(rdn, &self.schema)) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Descend from the root one RDN at a time.
    fn locate(&self, dn: &Dn) -> DirectoryResult<usize> {
        let mut current = ROOT;
        for (depth, rdn) in dn.rdns().iter().enumerate() {
            match self.find_child(current, rdn)? {
                Some(child) => current = child,
                None => {
                    return Err(DirectoryError::no_such_object(
                        dn.to_string(),
                        dn.prefix(depth).to_string(),
                    ));
                }
            }
        }
        Ok(current)
    }

    /// Look up the entry named `dn`.
    ///
    /// The empty DN names the root anchor.
    ///
    /// # Errors
    ///
    /// `NoSuchObject` carrying the longest prefix of `dn` that resolved.
    pub fn get_entry(&self, dn: &Dn) -> DirectoryResult<&Entry> {
        let index = self.locate(dn)?;
        Ok(&self.node(index)?.entry)
    }

    /// Attach `entry` under the parent of `dn`.
    ///
    /// The entry is renamed to `dn` if it carries another name, and the
    /// naming values of `dn` are added to it. `createTimestamp` and
    /// `modifyTimestamp` are stamped when the schema defines them.
    ///
    /// # Errors
    ///
    /// * `NoSuchObject` if the parent does not exist
    /// * `EntryAlreadyExists` if a sibling already has the same RDN, or `dn`
    ///   is the root
    /// * validation errors if adding the naming values breaks the schema
    pub fn insert_entry(&mut self, dn: &Dn, entry: Entry) -> DirectoryResult<()> {
        let Some(rdn) = dn.rdn() else {
            return Err(DirectoryError::EntryAlreadyExists { dn: String::new() });
        };
        let parent = self.locate(&dn.parent())?;
        if self.find_child(parent, rdn)?.is_some() {
            return Err(DirectoryError::EntryAlreadyExists { dn: dn.to_string() });
        }

        let mut entry = if entry.dn() == dn {
            entry
        } else {
            entry.placed_at(&self.schema, dn.clone())?
        };
        let now = timestamp();
        self.stamp(&mut entry, CREATE_TIMESTAMP, &now);
        self.stamp(&mut entry, MODIFY_TIMESTAMP, &now);

        let node = DitNode {
            entry,
            parent: Some(parent),
            children: Vec::new(),
        };
        let index = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.node_mut(parent)?.children.push(index);
        log::debug!("Inserted entry '{dn}'");
        Ok(())
    }

    /// Apply a change list to the entry named `dn`.
    ///
    /// Changes are applied to a copy which is validated once and then swapped
    /// in; on any failure the stored entry is unchanged.
    ///
    /// # Errors
    ///
    /// * `NoSuchObject` if the entry does not exist
    /// * `UnwillingToPerform` for the root
    /// * any error from [`Entry::modify`]
    pub fn modify_entry(&mut self, dn: &Dn, changes: &[ChangeOperation]) -> DirectoryResult<()> {
        let index = self.locate(dn)?;
        if index == ROOT {
            return Err(DirectoryError::unwilling("the root entry cannot be modified"));
        }
        let mut modified = self.node(index)?.entry.modify(&self.schema, changes)?;
        self.stamp(&mut modified, MODIFY_TIMESTAMP, &timestamp());
        self.node_mut(index)?.entry = modified;
        log::debug!("Modified entry '{dn}' with {} change(s)", changes.len());
        Ok(())
    }

    /// Rename the entry named `dn` and optionally move it under `new_superior`.
    ///
    /// Descendants keep their RDNs and have their DNs rebased.
    ///
    /// # Errors
    ///
    /// * `NoSuchObject` if the entry or the new superior does not exist
    /// * `UnwillingToPerform` for the root, or a move beneath the entry itself
    /// * `EntryAlreadyExists` if the target name is taken
    /// * validation errors from renaming the entry
    pub fn modify_entry_dn(
        &mut self,
        dn: &Dn,
        new_rdn: Rdn,
        delete_old_rdn: bool,
        new_superior: Option<&Dn>,
    ) -> DirectoryResult<()> {
        let index = self.locate(dn)?;
        if index == ROOT {
            return Err(DirectoryError::unwilling("the root entry cannot be renamed"));
        }
        let old_parent = self
            .node(index)?
            .parent
            .ok_or_else(|| DirectoryError::internal("entry without parent"))?;
        let new_parent = match new_superior {
            Some(superior) => self.locate(superior)?,
            None => old_parent,
        };
        if self.is_descendant_or_self(new_parent, index)? {
            return Err(DirectoryError::unwilling(format!(
                "cannot move '{dn}' beneath itself"
            )));
        }
        if let Some(existing) = self.find_child(new_parent, &new_rdn)? {
            if existing != index {
                let parent_dn = self.node(new_parent)?.entry.dn().clone();
                return Err(DirectoryError::EntryAlreadyExists {
                    dn: parent_dn.child(new_rdn).to_string(),
                });
            }
        }

        let renamed = self.node(index)?.entry.renamed(&self.schema, new_rdn.clone(), delete_old_rdn)?;
        let new_dn = self.node(new_parent)?.entry.dn().child(new_rdn);
        let mut renamed = renamed.relocated(new_dn.clone());
        self.stamp(&mut renamed, MODIFY_TIMESTAMP, &timestamp());

        if new_parent != old_parent {
            self.node_mut(old_parent)?.children.retain(|&child| child != index);
            self.node_mut(new_parent)?.children.push(index);
        }
        let node = self.node_mut(index)?;
        node.entry = renamed;
        node.parent = Some(new_parent);
        self.rebase_children(index)?;
        log::debug!("Renamed entry '{dn}' to '{new_dn}'");
        Ok(())
    }

    fn is_descendant_or_self(&self, candidate: usize, ancestor: usize) -> DirectoryResult<bool> {
        let mut current = Some(candidate);
        while let Some(index) = current {
            if index == ancestor {
                return Ok(true);
            }
            current = self.node(index)?.parent;
        }
        Ok(false)
    }

    /// Recompute the DNs below `index` from its (already updated) DN.
    fn rebase_children(&mut self, index: usize) -> DirectoryResult<()> {
        let mut pending = vec![index];
        while let Some(parent) = pending.pop() {
            let node = self.node(parent)?;
            let parent_dn = node.entry.dn().clone();
            let children = node.children.clone();
            for child in children {
                let entry = &self.node(child)?.entry;
                let Some(rdn) = entry.dn().rdn().cloned() else {
                    continue;
                };
                let moved = entry.relocated(parent_dn.child(rdn));
                self.node_mut(child)?.entry = moved;
                pending.push(child);
            }
        }
        Ok(())
    }

    /// Remove the leaf entry named `dn`.
    ///
    /// # Errors
    ///
    /// * `NoSuchObject` if the entry does not exist
    /// * `NodeNotLeaf` if it still has subordinates
    /// * `UnwillingToPerform` for the root
    pub fn delete_entry(&mut self, dn: &Dn) -> DirectoryResult<()> {
        let index = self.locate(dn)?;
        if index == ROOT {
            return Err(DirectoryError::unwilling("the root entry cannot be deleted"));
        }
        let node = self.node(index)?;
        if !node.children.is_empty() {
            return Err(DirectoryError::NodeNotLeaf { dn: dn.to_string() });
        }
        if let Some(parent) = node.parent {
            self.node_mut(parent)?.children.retain(|&child| child != index);
        }
        self.nodes[index] = None;
        self.free.push(index);
        log::debug!("Deleted entry '{dn}'");
        Ok(())
    }

    /// Whether the entry's attribute holds a value equal to `value`.
    ///
    /// `objectClass` is compared against the entry's class set, superclasses
    /// included.
    ///
    /// # Errors
    ///
    /// * `NoSuchObject` if the entry does not exist
    /// * `UndefinedAttributeType` if the attribute is unknown
    /// * `NoSuchAttribute` if the entry has no values for it
    /// * `InappropriateMatching` if the attribute has no equality rule
    pub fn compare(&self, dn: &Dn, attribute: &str, value: &str) -> DirectoryResult<bool> {
        let entry = self.get_entry(dn)?;
        let at = self.schema.require_attribute(attribute)?;
        if at.oid == "2.5.4.0" {
            let Some(class) = self.schema.object_class(value) else {
                return Ok(false);
            };
            return Ok(std::iter::once(entry.structural_class())
                .chain(entry.auxiliary_classes())
                .any(|held| self.schema.is_subclass_of(held, &class.oid)));
        }
        if !entry.has_attribute(&self.schema, &at.oid) {
            return Err(ValidationError::NoSuchAttribute {
                attribute: at.name().to_string(),
            }
            .into());
        }
        entry.contains_attr_val(&self.schema, &at.oid, value)
    }

    /// Set an operational attribute if the schema defines it.
    fn stamp(&self, entry: &mut Entry, name: &str, value: &str) {
        if let Some(attribute) = self.schema.attribute(name) {
            entry.stamp(&attribute.oid, value.to_string());
        }
    }
}

/// The current time in Generalized Time form.
fn timestamp() -> String {
    Utc::now().format("%Y%m%d%H%M%SZ").to_string()
}
