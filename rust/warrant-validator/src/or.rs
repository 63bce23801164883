//! Alternatives: either of two selectors.

use crate::{
    capability::Source,
    context::CanIssue,
    select::{DynMatch, Match, Matched, Select, Selector},
};
use std::sync::Arc;
use warrant_delegation::{Capability, Delegation};

/// Matches whatever either member matches. Built by [`Selector::or`].
#[derive(Debug, Clone)]
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<L, R> Or<L, R> {
    pub(crate) fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L, R> Selector for Or<L, R>
where
    L: Selector,
    R: Selector<Value = L::Value>,
{
    type Value = L::Value;
    type Match = OrMatch<L::Match, R::Match>;

    fn select(&self, sources: &[Source]) -> Select<Self::Match> {
        self.left
            .select(sources)
            .map(OrMatch::Left)
            .concat(self.right.select(sources).map(OrMatch::Right))
    }
}

/// A match of one side of an [`Or`].
#[derive(Debug, Clone)]
pub enum OrMatch<L, R> {
    /// Matched by the left member.
    Left(L),
    /// Matched by the right member.
    Right(R),
}

impl<L: Match, R: Match> OrMatch<L, R> {
    fn inner(&self) -> &dyn Match {
        match self {
            Self::Left(left) => left,
            Self::Right(right) => right,
        }
    }
}

impl<L: Match, R: Match> Match for OrMatch<L, R> {
    fn capabilities(&self) -> Vec<Capability> {
        self.inner().capabilities()
    }

    fn sources(&self) -> Vec<Source> {
        self.inner().sources()
    }

    fn delegation(&self) -> &Arc<Delegation> {
        self.inner().delegation()
    }

    fn select(&self, sources: &[Source]) -> Select<DynMatch> {
        self.inner().select(sources)
    }

    fn prune(&self, can_issue: &dyn CanIssue) -> Option<DynMatch> {
        self.inner().prune(can_issue)
    }
}

impl<L, R> Matched for OrMatch<L, R>
where
    L: Matched,
    R: Matched<Value = L::Value>,
{
    type Value = L::Value;

    fn value(&self) -> &Self::Value {
        match self {
            Self::Left(left) => left.value(),
            Self::Right(right) => right.value(),
        }
    }
}
