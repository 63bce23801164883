//! Delegation stores.

use super::Delegation;
use ipld_core::cid::Cid;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use warrant_common::SharedCell;

/// An in-memory store of delegations keyed by CID.
///
/// Cloning the store shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct DelegationStore {
    delegations: Arc<SharedCell<HashMap<Cid, Arc<Delegation>>>>,
}

impl DelegationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a delegation and every proof attached to it, transitively.
    /// Returns the CID of `delegation`.
    pub fn insert(&self, delegation: impl Into<Arc<Delegation>>) -> Cid {
        let delegation = delegation.into();
        let cid = *delegation.cid();
        let mut pending = vec![delegation];
        let mut delegations = self.delegations.write();
        while let Some(next) = pending.pop() {
            pending.extend(next.blocks().values().cloned());
            delegations.insert(*next.cid(), next);
        }
        cid
    }

    /// Retrieves a delegation by its CID.
    ///
    /// # Errors
    ///
    /// Returns [`Missing`] when no delegation with that CID was inserted.
    pub fn get(&self, cid: &Cid) -> Result<Arc<Delegation>, Missing> {
        self.delegations
            .read()
            .get(cid)
            .cloned()
            .ok_or(Missing(*cid))
    }

    /// Retrieves several delegations, failing on the first missing one.
    ///
    /// # Errors
    ///
    /// Returns [`Missing`] for the first CID that is not in the store.
    pub fn get_all(&self, cids: &[Cid]) -> Result<Vec<Arc<Delegation>>, Missing> {
        let delegations = self.delegations.read();
        cids.iter()
            .map(|cid| delegations.get(cid).cloned().ok_or(Missing(*cid)))
            .collect()
    }

    /// Whether a delegation with this CID is stored.
    #[must_use]
    pub fn contains(&self, cid: &Cid) -> bool {
        self.delegations.read().contains_key(cid)
    }

    /// Number of stored delegations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delegations.read().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delegations.read().is_empty()
    }
}

/// Error for when a delegation is missing from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("delegation with cid {0} is missing")]
pub struct Missing(pub Cid);
