//! Proofs cited by a delegation.

use crate::delegation::Delegation;
use ipld_core::cid::Cid;
use std::sync::Arc;

/// A delegation cited as proof: either attached inline or only linked by CID.
///
/// A [`Proof::Link`] has to be resolved before it can back a claim.
#[derive(Debug, Clone, PartialEq)]
pub enum Proof {
    /// Content address of a delegation that was not attached.
    Link(Cid),
    /// An attached delegation.
    Delegation(Arc<Delegation>),
}

impl Proof {
    /// The CID of the cited delegation.
    #[must_use]
    pub fn link(&self) -> Cid {
        match self {
            Self::Link(cid) => *cid,
            Self::Delegation(delegation) => *delegation.cid(),
        }
    }

    /// The delegation, if attached.
    #[must_use]
    pub fn delegation(&self) -> Option<&Arc<Delegation>> {
        match self {
            Self::Link(_) => None,
            Self::Delegation(delegation) => Some(delegation),
        }
    }
}

impl From<Cid> for Proof {
    fn from(cid: Cid) -> Self {
        Self::Link(cid)
    }
}

impl From<Delegation> for Proof {
    fn from(delegation: Delegation) -> Self {
        Self::Delegation(Arc::new(delegation))
    }
}

impl From<Arc<Delegation>> for Proof {
    fn from(delegation: Arc<Delegation>) -> Self {
        Self::Delegation(delegation)
    }
}

impl From<&Arc<Delegation>> for Proof {
    fn from(delegation: &Arc<Delegation>) -> Self {
        Self::Delegation(delegation.clone())
    }
}
