//! Selecting capabilities out of delegations.
//!
//! A [`Selector`] looks at a set of [`Source`]s and reports what it could
//! use ([`Select::matches`]), what it recognized but rejected
//! ([`Select::errors`]) and what it did not recognize at all
//! ([`Select::unknown`]). Every [`Match`] is itself able to select, from
//! the capabilities of its delegation's proofs, the matches that prove it.
//! Walking that relation upwards is how a chain gets validated.

use crate::{
    amplify::Amplify,
    capability::{ParsedCapability, Source},
    context::CanIssue,
    derive::Derive,
    descriptor::Descriptor,
    error::{Failure, Problem},
    or::Or,
};
use std::{fmt, sync::Arc};
use warrant_common::{ConditionalSend, ConditionalSync};
use warrant_delegation::{Capability, Delegation};

/// A type-erased [`Match`].
pub type DynMatch = Arc<dyn Match>;

/// Bounds every parsed resource, caveat set and match value satisfies.
pub trait ParsedValue: Clone + fmt::Debug + ConditionalSend + ConditionalSync + 'static {}

impl<T> ParsedValue for T where T: Clone + fmt::Debug + ConditionalSend + ConditionalSync + 'static {}

/// Outcome of selecting over a set of sources.
#[derive(Debug)]
pub struct Select<M> {
    /// Usable matches, in source order.
    pub matches: Vec<M>,
    /// Recognized but rejected candidates.
    pub errors: Vec<Failure>,
    /// Candidates that were not recognized.
    pub unknown: Vec<Capability>,
}

impl<M> Default for Select<M> {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            errors: Vec::new(),
            unknown: Vec::new(),
        }
    }
}

impl<M> Select<M> {
    /// Transforms every match, keeping errors and unknowns.
    pub fn map<T>(self, f: impl FnMut(M) -> T) -> Select<T> {
        Select {
            matches: self.matches.into_iter().map(f).collect(),
            errors: self.errors,
            unknown: self.unknown,
        }
    }

    /// Concatenates `other` after `self`.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.matches.extend(other.matches);
        self.errors.extend(other.errors);
        self.unknown.extend(other.unknown);
        self
    }

    /// Every leftover candidate as a [`Failure`]: errors first, then
    /// unknowns.
    pub fn into_failures(self) -> Vec<Failure> {
        let unknown = self
            .unknown
            .into_iter()
            .map(|capability| Failure::UnknownCapability { capability });
        self.errors.into_iter().chain(unknown).collect()
    }
}

impl<M: Match + 'static> Select<M> {
    /// Erases the match type.
    pub fn erase(self) -> Select<DynMatch> {
        self.map(|m| Arc::new(m) as DynMatch)
    }
}

/// Capabilities known to both lists, in the order of `left`.
pub(crate) fn intersection(left: Vec<Capability>, right: &[Capability]) -> Vec<Capability> {
    left.into_iter()
        .filter(|capability| right.contains(capability))
        .collect()
}

/// Something a selector found in a set of sources.
pub trait Match: fmt::Debug + ConditionalSend + ConditionalSync + 'static {
    /// The raw capabilities this match stands for, already resolved
    /// against whatever they prove.
    fn capabilities(&self) -> Vec<Capability>;

    /// The sources this match was built from.
    fn sources(&self) -> Vec<Source>;

    /// Delegation of the first source.
    fn delegation(&self) -> &Arc<Delegation>;

    /// Select, among `sources`, the matches that prove this one.
    fn select(&self, sources: &[Source]) -> Select<DynMatch>;

    /// Drop whatever `can_issue` accepts as self-issued. `None` means
    /// nothing is left to prove.
    fn prune(&self, can_issue: &dyn CanIssue) -> Option<DynMatch>;
}

/// A [`Match`] with a typed value, as produced by a [`Selector`].
pub trait Matched: Match + Clone {
    /// The parsed value.
    type Value: ParsedValue;

    /// The parsed value of this match.
    fn value(&self) -> &Self::Value;
}

/// Selects typed matches out of raw sources.
///
/// [`Descriptor`] is the basic selector; [`Selector::or`],
/// [`Selector::and`] and [`Selector::derive`] compose them.
pub trait Selector: ConditionalSend + ConditionalSync + 'static {
    /// What a match parses to.
    type Value: ParsedValue;

    /// The matches this selector yields.
    type Match: Matched<Value = Self::Value>;

    /// Match every source this selector can parse.
    fn select(&self, sources: &[Source]) -> Select<Self::Match>;

    /// Either of two selectors of the same value.
    fn or<R>(self, other: R) -> Or<Self, R>
    where
        Self: Sized,
        R: Selector<Value = Self::Value>,
    {
        Or::new(self, other)
    }

    /// Both selectors at once, each matched by a separate capability.
    fn and<R>(self, other: R) -> Amplify<Self, R>
    where
        Self: Sized,
        R: Selector,
    {
        Amplify::new(self, other)
    }

    /// A capability `to` that may also be proven by what `self` selects,
    /// as long as `derives` accepts it.
    fn derive<W, N, F>(self, to: Descriptor<W, N>, derives: F) -> Derive<W, N, Self>
    where
        Self: Sized,
        W: ParsedValue,
        N: ParsedValue,
        F: Fn(&ParsedCapability<W, N>, &Self::Value) -> Result<(), Problem>
            + ConditionalSend
            + ConditionalSync
            + 'static,
    {
        Derive::new(to, self, derives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_intersects_in_left_order() {
        let a = Capability::new("a/x", "did:key:zAlice");
        let b = Capability::new("b/x", "did:key:zAlice");
        let c = Capability::new("c/x", "did:key:zAlice");
        assert_eq!(
            intersection(vec![a.clone(), b.clone(), c.clone()], &[c.clone(), a.clone()]),
            vec![a, c]
        );
    }

    #[test]
    fn it_lists_errors_before_unknowns() {
        let select = Select::<()> {
            matches: vec![],
            errors: vec![Failure::MalformedCapability {
                capability: Capability::new("b/x", "did:key:zAlice"),
                cause: warrant_schema::SchemaError::message("bad"),
            }],
            unknown: vec![Capability::new("a/x", "did:key:zAlice")],
        };
        let names = select
            .into_failures()
            .iter()
            .map(Failure::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["MalformedCapability", "UnknownCapability"]);
    }
}
