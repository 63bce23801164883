//! Capability descriptors: the basic [`Selector`].

use crate::{
    capability::{ParsedCapability, Source},
    context::CanIssue,
    derives::{Derives, default_derives},
    error::{Failure, Problem},
    pattern::matches,
    resolve::resolve_capability,
    select::{DynMatch, Match, Matched, ParsedValue, Select, Selector},
};
use std::{fmt, sync::Arc};
use warrant_common::{ConditionalSend, ConditionalSync};
use warrant_delegation::{Capability, Caveats, Delegation};
use warrant_schema::{Reader, Schema, SchemaError};

type DeriveRule<W, N> = Arc<dyn Derives<ParsedCapability<W, N>, ParsedCapability<W, N>>>;

/// Describes one kind of capability: its ability, how to read its resource
/// and caveats, and when a delegated instance covers a claimed one.
///
/// ```
/// use warrant_schema::{Schema, did};
/// use warrant_validator::{capability, derives};
///
/// let store_add = capability("store/add", did())
///     .caveats(Schema::structure([
///         ("size", Schema::integer().optional()),
///         ("link", Schema::link().optional()),
///     ]))
///     .derives(|claimed, delegated| {
///         derives::equal_with(claimed, delegated)?;
///         derives::equal_caveat(claimed, delegated, "link")?;
///         derives::within_limit(claimed, delegated, "size")
///     });
/// assert_eq!(store_add.can(), "store/add");
/// ```
pub struct Descriptor<W, N = Caveats> {
    can: String,
    with: Arc<dyn Reader<W, str>>,
    nb: Arc<dyn Reader<N, Caveats>>,
    derives: DeriveRule<W, N>,
}

/// Starts describing a capability. Caveats are accepted as they are until
/// [`DescriptorBuilder::caveats`] or [`DescriptorBuilder::nb`] says
/// otherwise.
pub fn capability<W>(
    can: impl Into<String>,
    with: impl Reader<W, str> + 'static,
) -> DescriptorBuilder<W, Caveats> {
    DescriptorBuilder {
        can: can.into(),
        with: Arc::new(with),
        nb: Arc::new(Schema::Unknown),
    }
}

/// A [`Descriptor`] missing its derivation rule.
pub struct DescriptorBuilder<W, N> {
    can: String,
    with: Arc<dyn Reader<W, str>>,
    nb: Arc<dyn Reader<N, Caveats>>,
}

impl<W, N> DescriptorBuilder<W, N> {
    /// Validate caveats with `schema`.
    #[must_use]
    pub fn caveats(self, schema: Schema) -> DescriptorBuilder<W, Caveats> {
        DescriptorBuilder {
            can: self.can,
            with: self.with,
            nb: Arc::new(schema),
        }
    }

    /// Read caveats with a custom reader, e.g. [`warrant_schema::decode`].
    #[must_use]
    pub fn nb<T>(self, reader: impl Reader<T, Caveats> + 'static) -> DescriptorBuilder<W, T> {
        DescriptorBuilder {
            can: self.can,
            with: self.with,
            nb: Arc::new(reader),
        }
    }

    /// Finish with a custom derivation rule.
    pub fn derives<F>(self, derives: F) -> Descriptor<W, N>
    where
        F: Fn(&ParsedCapability<W, N>, &ParsedCapability<W, N>) -> Result<(), Problem>
            + ConditionalSend
            + ConditionalSync
            + 'static,
    {
        Descriptor {
            can: self.can,
            with: self.with,
            nb: self.nb,
            derives: Arc::new(derives),
        }
    }
}

impl<W: fmt::Display + 'static> DescriptorBuilder<W, Caveats> {
    /// Finish with [`default_derives`].
    pub fn build(self) -> Descriptor<W, Caveats> {
        self.derives(default_derives::<W>)
    }
}

impl<W, N> Descriptor<W, N> {
    /// The ability pattern this descriptor recognizes.
    #[must_use]
    pub fn can(&self) -> &str {
        &self.can
    }

    /// Parses a raw capability of this kind.
    ///
    /// # Errors
    ///
    /// [`Failure::UnknownCapability`] when the ability is not this
    /// descriptor's, [`Failure::MalformedCapability`] when the resource or
    /// caveats do not read.
    pub fn parse(&self, capability: &Capability) -> Result<ParsedCapability<W, N>, Failure> {
        if !matches(&self.can, &capability.can) {
            return Err(Failure::UnknownCapability {
                capability: capability.clone(),
            });
        }
        self.read(capability)
            .map_err(|cause| Failure::MalformedCapability {
                capability: capability.clone(),
                cause,
            })
    }

    fn read(&self, capability: &Capability) -> Result<ParsedCapability<W, N>, SchemaError> {
        Ok(ParsedCapability {
            can: capability.can.clone(),
            with: self
                .with
                .read(&capability.with)
                .map_err(|cause| cause.at_field("with"))?,
            nb: self
                .nb
                .read(&capability.nb)
                .map_err(|cause| cause.at_field("nb"))?,
        })
    }
}

impl<W, N> Clone for Descriptor<W, N> {
    fn clone(&self) -> Self {
        Self {
            can: self.can.clone(),
            with: self.with.clone(),
            nb: self.nb.clone(),
            derives: self.derives.clone(),
        }
    }
}

impl<W, N> fmt::Debug for Descriptor<W, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor").field("can", &self.can).finish()
    }
}

impl<W: ParsedValue, N: ParsedValue> Selector for Descriptor<W, N> {
    type Value = ParsedCapability<W, N>;
    type Match = DirectMatch<W, N>;

    fn select(&self, sources: &[Source]) -> Select<Self::Match> {
        let mut selection = Select::default();
        for source in sources {
            match self.parse(source.capability()) {
                Ok(value) => selection.matches.push(DirectMatch {
                    descriptor: self.clone(),
                    value,
                    capability: source.capability().clone(),
                    source: source.clone(),
                }),
                Err(Failure::UnknownCapability { capability }) => {
                    selection.unknown.push(capability);
                }
                Err(failure) => selection.errors.push(failure),
            }
        }
        selection
    }
}

/// A single capability matched by a [`Descriptor`].
#[derive(Debug, Clone)]
pub struct DirectMatch<W, N> {
    descriptor: Descriptor<W, N>,
    value: ParsedCapability<W, N>,
    capability: Capability,
    source: Source,
}

impl<W: ParsedValue, N: ParsedValue> DirectMatch<W, N> {
    /// The raw capability, resolved against what it proves.
    #[must_use]
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The source this match was built from.
    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Selects the sources that cover this match with the same kind of
    /// capability.
    pub fn select_direct(&self, sources: &[Source]) -> Select<Self> {
        let mut selection = Select::default();
        for source in sources {
            let Some(resolved) = resolve_capability(source.capability(), &self.capability) else {
                selection.unknown.push(source.capability().clone());
                continue;
            };
            let value = match self.descriptor.read(&resolved) {
                Ok(value) => value,
                Err(cause) => {
                    selection.errors.push(Failure::MalformedCapability {
                        capability: source.capability().clone(),
                        cause,
                    });
                    continue;
                }
            };
            match (self.descriptor.derives)(&self.value, &value) {
                Ok(()) => selection.matches.push(Self {
                    descriptor: self.descriptor.clone(),
                    value,
                    capability: resolved,
                    source: source.clone(),
                }),
                Err(cause) => selection.errors.push(Failure::EscalatedCapability {
                    claimed: self.capability.clone(),
                    delegated: vec![resolved],
                    cause,
                }),
            }
        }
        selection
    }
}

impl<W: ParsedValue, N: ParsedValue> Match for DirectMatch<W, N> {
    fn capabilities(&self) -> Vec<Capability> {
        vec![self.capability.clone()]
    }

    fn sources(&self) -> Vec<Source> {
        vec![self.source.clone()]
    }

    fn delegation(&self) -> &Arc<Delegation> {
        self.source.delegation()
    }

    fn select(&self, sources: &[Source]) -> Select<DynMatch> {
        self.select_direct(sources).erase()
    }

    fn prune(&self, can_issue: &dyn CanIssue) -> Option<DynMatch> {
        if can_issue(&self.capability, self.source.delegation().issuer()) {
            None
        } else {
            Some(Arc::new(self.clone()) as DynMatch)
        }
    }
}

impl<W: ParsedValue, N: ParsedValue> Matched for DirectMatch<W, N> {
    type Value = ParsedCapability<W, N>;

    fn value(&self) -> &Self::Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use warrant_principal::Did;
    use warrant_schema::did;

    fn store_add() -> Descriptor<Did, Caveats> {
        capability("store/add", did())
            .caveats(Schema::structure([("size", Schema::integer().optional())]))
            .build()
    }

    #[test]
    fn it_parses_matching_capabilities() {
        let parsed = store_add()
            .parse(&Capability::new("store/add", "did:key:zAlice").with_caveat("size", 5))
            .unwrap();
        assert_eq!(parsed.can, "store/add");
        assert_eq!(parsed.with, "did:key:zAlice");
        assert_eq!(parsed.nb.get("size"), Some(&5.into()));
    }

    #[test]
    fn it_reports_other_abilities_as_unknown() {
        let result = store_add().parse(&Capability::new("store/list", "did:key:zAlice"));
        assert!(matches!(result, Err(Failure::UnknownCapability { .. })));
    }

    #[test]
    fn it_reports_bad_resources_as_malformed() {
        let result = store_add().parse(&Capability::new("store/add", "mailto:alice@web.mail"));
        let Err(Failure::MalformedCapability { cause, .. }) = result else {
            panic!("expected a malformed capability, got {result:?}");
        };
        assert!(matches!(cause, SchemaError::Field { ref at, .. } if at == "with"));
    }

    #[test]
    fn it_reports_bad_caveats_as_malformed() {
        let result = store_add()
            .parse(&Capability::new("store/add", "did:key:zAlice").with_caveat("size", "big"));
        let Err(Failure::MalformedCapability { cause, .. }) = result else {
            panic!("expected a malformed capability, got {result:?}");
        };
        assert!(matches!(cause, SchemaError::Field { ref at, .. } if at == "nb"));
    }

    #[test]
    fn it_drops_undeclared_caveats() {
        let parsed = store_add()
            .parse(
                &Capability::new("store/add", "did:key:zAlice")
                    .with_caveat("size", 5)
                    .with_caveat("color", "red"),
            )
            .unwrap();
        assert_eq!(parsed.nb.len(), 1);
    }
}
