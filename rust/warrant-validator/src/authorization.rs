//! Successful validations.

use crate::select::{DynMatch, Match, Matched};
use std::{fmt, iter, sync::Arc};
use warrant_delegation::{Capability, Delegation};
use warrant_principal::Did;

/// Proof that a capability is authorized: the match, and the
/// authorization of the proof match it was derived from. Matches that
/// needed no proof have no `proofs`.
pub struct Authorization<M: ?Sized = dyn Match> {
    matched: Arc<M>,
    proofs: Vec<Authorization>,
}

impl<M: Match + ?Sized> Authorization<M> {
    pub(crate) fn new(matched: Arc<M>, proofs: Vec<Authorization>) -> Self {
        Self { matched, proofs }
    }

    /// The authorized match.
    pub fn matched(&self) -> &Arc<M> {
        &self.matched
    }

    /// Authorizations of the matches this one was derived from.
    pub fn proofs(&self) -> &[Authorization] {
        &self.proofs
    }

    /// Raw capabilities of the match.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.matched.capabilities()
    }

    /// Delegation the match came from.
    pub fn delegation(&self) -> &Arc<Delegation> {
        self.matched.delegation()
    }

    /// Issuer of [`Authorization::delegation`].
    pub fn issuer(&self) -> &Did {
        self.delegation().issuer()
    }

    /// Audience of [`Authorization::delegation`].
    pub fn audience(&self) -> &Did {
        self.delegation().audience()
    }

    /// Delegations from this one to the root, following the first proof
    /// at every hop.
    pub fn chain(&self) -> impl Iterator<Item = &Arc<Delegation>> {
        iter::once(self.delegation()).chain(
            iter::successors(self.proofs.first(), |proof| proof.proofs.first())
                .map(Authorization::delegation),
        )
    }
}

impl<M: Matched> Authorization<M> {
    /// The authorized, parsed capability.
    pub fn capability(&self) -> &M::Value {
        self.matched.value()
    }

    pub(crate) fn erase(&self) -> Authorization {
        Authorization {
            matched: self.matched.clone() as DynMatch,
            proofs: self.proofs.clone(),
        }
    }
}

impl<M: ?Sized> Clone for Authorization<M> {
    fn clone(&self) -> Self {
        Self {
            matched: self.matched.clone(),
            proofs: self.proofs.clone(),
        }
    }
}

impl<M: fmt::Debug + ?Sized> fmt::Debug for Authorization<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("matched", &self.matched)
            .field("proofs", &self.proofs)
            .finish()
    }
}
