//! Parsed capabilities and where they came from.

use std::{fmt, sync::Arc};
use warrant_delegation::{Capability, Caveats, Delegation};

/// A capability whose resource and caveats were read by a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCapability<W = String, N = Caveats> {
    /// Ability, always concrete.
    pub can: String,
    /// Resource as read by the descriptor.
    pub with: W,
    /// Caveats as read by the descriptor.
    pub nb: N,
}

impl<W: fmt::Display, N> fmt::Display for ParsedCapability<W, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.can, self.with)
    }
}

/// One capability of a delegation, by position.
///
/// Keeping the delegation around lets every match know who issued what it
/// matched and which proofs to follow next.
#[derive(Debug, Clone)]
pub struct Source {
    delegation: Arc<Delegation>,
    index: usize,
}

impl Source {
    /// One source per capability of `delegation`, in order.
    pub fn all(delegation: &Arc<Delegation>) -> impl Iterator<Item = Source> + '_ {
        (0..delegation.capabilities().len()).map(move |index| Source {
            delegation: delegation.clone(),
            index,
        })
    }

    /// The raw capability.
    #[must_use]
    pub fn capability(&self) -> &Capability {
        // `index` is always in range, see `Source::all`.
        &self.delegation.capabilities()[self.index]
    }

    /// The delegation carrying the capability.
    #[must_use]
    pub fn delegation(&self) -> &Arc<Delegation> {
        &self.delegation
    }

    /// Position of the capability within its delegation.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.delegation.cid() == other.delegation.cid()
    }
}
