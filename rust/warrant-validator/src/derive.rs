//! Derivation: a capability provable by a different kind of capability.

use crate::{
    capability::{ParsedCapability, Source},
    context::CanIssue,
    derives::Derives,
    descriptor::{Descriptor, DirectMatch},
    error::{Failure, Problem},
    select::{DynMatch, Match, Matched, ParsedValue, Select, Selector, intersection},
};
use std::{fmt, sync::Arc};
use warrant_common::{ConditionalSend, ConditionalSync};
use warrant_delegation::{Capability, Delegation};

/// Selects `to` capabilities, which may be proven either by `to`
/// capabilities or by whatever `from` selects. Built by
/// [`Selector::derive`].
///
/// ```
/// use warrant_schema::did;
/// use warrant_validator::{Selector, capability, derives};
///
/// let verify = capability("account/verify", did()).build();
/// let register = verify.derive(
///     capability("account/register", did()).build(),
///     |claimed, verified| derives::equal_with(claimed, verified),
/// );
/// # let _ = register;
/// ```
pub struct Derive<W, N, F: Selector> {
    to: Descriptor<W, N>,
    from: Arc<F>,
    derives: Arc<dyn Derives<ParsedCapability<W, N>, F::Value>>,
}

impl<W, N, F: Selector> Derive<W, N, F> {
    pub(crate) fn new<D>(to: Descriptor<W, N>, from: F, derives: D) -> Self
    where
        D: Fn(&ParsedCapability<W, N>, &F::Value) -> Result<(), Problem>
            + ConditionalSend
            + ConditionalSync
            + 'static,
    {
        Self {
            to,
            from: Arc::new(from),
            derives: Arc::new(derives),
        }
    }
}

impl<W, N, F: Selector> fmt::Debug for Derive<W, N, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derive").field("to", &self.to).finish_non_exhaustive()
    }
}

impl<W: ParsedValue, N: ParsedValue, F: Selector> Selector for Derive<W, N, F> {
    type Value = ParsedCapability<W, N>;
    type Match = DerivedMatch<W, N, F>;

    fn select(&self, sources: &[Source]) -> Select<Self::Match> {
        self.to.select(sources).map(|selected| DerivedMatch {
            selected,
            from: self.from.clone(),
            derives: self.derives.clone(),
        })
    }
}

/// A `to` capability of a [`Derive`].
pub struct DerivedMatch<W, N, F: Selector> {
    selected: DirectMatch<W, N>,
    from: Arc<F>,
    derives: Arc<dyn Derives<ParsedCapability<W, N>, F::Value>>,
}

impl<W: Clone, N: Clone, F: Selector> Clone for DerivedMatch<W, N, F> {
    fn clone(&self) -> Self {
        Self {
            selected: self.selected.clone(),
            from: self.from.clone(),
            derives: self.derives.clone(),
        }
    }
}

impl<W: fmt::Debug, N: fmt::Debug, F: Selector> fmt::Debug for DerivedMatch<W, N, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedMatch")
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl<W: ParsedValue, N: ParsedValue, F: Selector> Match for DerivedMatch<W, N, F> {
    fn capabilities(&self) -> Vec<Capability> {
        self.selected.capabilities()
    }

    fn sources(&self) -> Vec<Source> {
        self.selected.sources()
    }

    fn delegation(&self) -> &Arc<Delegation> {
        self.selected.delegation()
    }

    /// Proofs of the same kind stay derived matches; proofs selected by
    /// `from` continue as themselves once the rule accepts them.
    fn select(&self, sources: &[Source]) -> Select<DynMatch> {
        let direct = self.selected.select_direct(sources);
        let derived = self.from.select(sources);

        let mut selection: Select<DynMatch> = Select {
            matches: Vec::new(),
            errors: Vec::new(),
            unknown: intersection(direct.unknown, &derived.unknown),
        };
        for selected in direct.matches {
            selection.matches.push(Arc::new(Self {
                selected,
                from: self.from.clone(),
                derives: self.derives.clone(),
            }) as DynMatch);
        }
        for candidate in derived.matches {
            match (self.derives)(self.selected.value(), candidate.value()) {
                Ok(()) => selection.matches.push(Arc::new(candidate) as DynMatch),
                Err(cause) => selection.errors.push(Failure::EscalatedCapability {
                    claimed: self.selected.capability().clone(),
                    delegated: candidate.capabilities(),
                    cause,
                }),
            }
        }
        selection.errors.extend(direct.errors);
        selection.errors.extend(derived.errors);
        selection
    }

    fn prune(&self, can_issue: &dyn CanIssue) -> Option<DynMatch> {
        if can_issue(
            self.selected.capability(),
            self.selected.source().delegation().issuer(),
        ) {
            None
        } else {
            Some(Arc::new(self.clone()) as DynMatch)
        }
    }
}

impl<W: ParsedValue, N: ParsedValue, F: Selector> Matched for DerivedMatch<W, N, F> {
    type Value = ParsedCapability<W, N>;

    fn value(&self) -> &Self::Value {
        self.selected.value()
    }
}
