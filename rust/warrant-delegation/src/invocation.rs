//! Invocations: delegations that carry exactly one capability.

use crate::{capability::Capability, delegation::Delegation, error::DelegationError};
use std::{ops::Deref, sync::Arc};

/// A request to exercise one capability now.
///
/// Structurally this is a [`Delegation`] with exactly one capability,
/// addressed to the service that is asked to perform it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation(Arc<Delegation>);

impl Invocation {
    /// The single capability being invoked.
    #[must_use]
    pub fn capability(&self) -> &Capability {
        // `TryFrom` only admits delegations with exactly one capability.
        &self.0.capabilities()[0]
    }

    /// The underlying delegation.
    #[must_use]
    pub fn delegation(&self) -> &Arc<Delegation> {
        &self.0
    }
}

impl Deref for Invocation {
    type Target = Delegation;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Arc<Delegation>> for Invocation {
    type Error = DelegationError;

    fn try_from(delegation: Arc<Delegation>) -> Result<Self, Self::Error> {
        match delegation.capabilities().len() {
            1 => Ok(Self(delegation)),
            count => Err(DelegationError::NotAnInvocation(count)),
        }
    }
}

impl TryFrom<Delegation> for Invocation {
    type Error = DelegationError;

    fn try_from(delegation: Delegation) -> Result<Self, Self::Error> {
        Self::try_from(Arc::new(delegation))
    }
}
