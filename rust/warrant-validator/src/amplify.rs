//! Amplification: several capabilities that only count together.

use crate::{
    capability::Source,
    context::CanIssue,
    select::{DynMatch, Match, Matched, Select, Selector, intersection},
};
use std::{iter, sync::Arc};
use warrant_delegation::{Capability, Delegation};

/// Matches pairs of capabilities, one per member. Built by
/// [`Selector::and`]; chain it for wider groups.
#[derive(Debug, Clone)]
pub struct Amplify<L, R> {
    left: L,
    right: R,
}

impl<L, R> Amplify<L, R> {
    pub(crate) fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L: Selector, R: Selector> Selector for Amplify<L, R> {
    type Value = (L::Value, R::Value);
    type Match = Amplified<L::Match, R::Match>;

    fn select(&self, sources: &[Source]) -> Select<Self::Match> {
        let left = self.left.select(sources);
        let right = self.right.select(sources);
        let mut matches = Vec::with_capacity(left.matches.len() * right.matches.len());
        for l in &left.matches {
            for r in &right.matches {
                matches.push(Amplified {
                    value: (l.value().clone(), r.value().clone()),
                    left: l.clone(),
                    right: r.clone(),
                });
            }
        }
        Select {
            matches,
            errors: left.errors.into_iter().chain(right.errors).collect(),
            unknown: intersection(left.unknown, &right.unknown),
        }
    }
}

/// One match per member of an [`Amplify`].
#[derive(Debug, Clone)]
pub struct Amplified<L: Matched, R: Matched> {
    value: (L::Value, R::Value),
    left: L,
    right: R,
}

impl<L: Matched, R: Matched> Amplified<L, R> {
    fn group(&self) -> Group {
        Group {
            head: Arc::new(self.left.clone()),
            tail: vec![Arc::new(self.right.clone())],
        }
    }
}

impl<L: Matched, R: Matched> Match for Amplified<L, R> {
    fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = self.left.capabilities();
        capabilities.extend(self.right.capabilities());
        capabilities
    }

    fn sources(&self) -> Vec<Source> {
        let mut sources = self.left.sources();
        sources.extend(self.right.sources());
        sources
    }

    fn delegation(&self) -> &Arc<Delegation> {
        self.left.delegation()
    }

    fn select(&self, sources: &[Source]) -> Select<DynMatch> {
        self.group().select(sources)
    }

    fn prune(&self, can_issue: &dyn CanIssue) -> Option<DynMatch> {
        self.group().prune(can_issue)
    }
}

impl<L: Matched, R: Matched> Matched for Amplified<L, R> {
    type Value = (L::Value, R::Value);

    fn value(&self) -> &Self::Value {
        &self.value
    }
}

/// The members of an amplified match still waiting for proof. Never
/// empty.
#[derive(Debug, Clone)]
pub struct Group {
    head: DynMatch,
    tail: Vec<DynMatch>,
}

impl Group {
    fn new(members: Vec<DynMatch>) -> Option<Self> {
        let mut members = members.into_iter();
        let head = members.next()?;
        Some(Self {
            head,
            tail: members.collect(),
        })
    }

    /// Members in order.
    pub fn members(&self) -> impl Iterator<Item = &DynMatch> {
        iter::once(&self.head).chain(&self.tail)
    }
}

impl Match for Group {
    fn capabilities(&self) -> Vec<Capability> {
        self.members().flat_map(|member| member.capabilities()).collect()
    }

    fn sources(&self) -> Vec<Source> {
        self.members().flat_map(|member| member.sources()).collect()
    }

    fn delegation(&self) -> &Arc<Delegation> {
        self.head.delegation()
    }

    /// Every combination of one proving match per member.
    ///
    /// `sources` pools the proofs of every member's delegation. A member
    /// only selects among the ones addressed to its own issuer.
    fn select(&self, sources: &[Source]) -> Select<DynMatch> {
        let mut combinations: Vec<Vec<DynMatch>> = vec![Vec::new()];
        let mut errors = Vec::new();
        let mut unknown: Option<Vec<Capability>> = None;
        for member in self.members() {
            let issuer = member.delegation().issuer();
            let own = sources
                .iter()
                .filter(|source| source.delegation().audience() == issuer)
                .cloned()
                .collect::<Vec<_>>();
            let selection = member.select(&own);
            errors.extend(selection.errors);
            unknown = Some(match unknown {
                None => selection.unknown,
                Some(known) => intersection(known, &selection.unknown),
            });
            combinations = combinations
                .into_iter()
                .flat_map(|prefix| {
                    selection.matches.iter().map(move |m| {
                        let mut next = prefix.clone();
                        next.push(m.clone());
                        next
                    })
                })
                .collect();
        }
        Select {
            matches: combinations
                .into_iter()
                .filter_map(Group::new)
                .map(|group| Arc::new(group) as DynMatch)
                .collect(),
            errors,
            unknown: unknown.unwrap_or_default(),
        }
    }

    /// Members `can_issue` accepts are dropped; the rest still need proof.
    fn prune(&self, can_issue: &dyn CanIssue) -> Option<DynMatch> {
        let remaining = self
            .members()
            .filter_map(|member| member.prune(can_issue))
            .collect();
        Group::new(remaining).map(|group| Arc::new(group) as DynMatch)
    }
}
