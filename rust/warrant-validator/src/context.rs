//! Everything `access` needs besides the invocation.

use crate::{
    authorization::Authorization,
    error::Problem,
    resolver::{ProofCache, ProofResolver},
};
use std::{fmt, sync::Arc};
use warrant_common::{ConditionalSend, ConditionalSync, time::unix_now};
use warrant_delegation::{Capability, Timestamp};
use warrant_principal::{Did, Principal};

/// Decides whether `issuer` may grant a capability without proof.
pub trait CanIssue: Fn(&Capability, &Did) -> bool + ConditionalSend + ConditionalSync {}

impl<F> CanIssue for F where F: Fn(&Capability, &Did) -> bool + ConditionalSend + ConditionalSync {}

/// Final say over a complete authorization, e.g. to reject chains through
/// revoked delegations.
pub trait ValidateAuthorization:
    Fn(&Authorization) -> Result<(), Problem> + ConditionalSend + ConditionalSync
{
}

impl<F> ValidateAuthorization for F where
    F: Fn(&Authorization) -> Result<(), Problem> + ConditionalSend + ConditionalSync
{
}

fn accept_all(_: &Authorization) -> Result<(), Problem> {
    Ok(())
}

/// The default [`CanIssue`]: a principal owns the resource named by its
/// own DID.
#[must_use]
pub fn is_resource_owner(capability: &Capability, issuer: &Did) -> bool {
    capability.with == issuer.as_str()
}

/// Configuration for [`access`](crate::access).
///
/// ```
/// use warrant_credentials::Ed25519KeyResolver;
/// use warrant_schema::did;
/// use warrant_validator::{ValidationContext, capability};
///
/// let context = ValidationContext::new(
///     capability("store/add", did()).build(),
///     Ed25519KeyResolver,
/// )
/// .at(1_700_000_000);
/// assert_eq!(context.now(), 1_700_000_000);
/// ```
pub struct ValidationContext<S, R> {
    capability: S,
    principal: R,
    authority: Option<Did>,
    proofs: ProofCache,
    can_issue: Arc<dyn CanIssue>,
    validate_authorization: Arc<dyn ValidateAuthorization>,
    time: Option<Timestamp>,
}

impl<S, R> ValidationContext<S, R> {
    /// Authorize `capability`, verifying issuers with `principal`.
    pub fn new(capability: S, principal: R) -> Self {
        Self {
            capability,
            principal,
            authority: None,
            proofs: ProofCache::default(),
            can_issue: Arc::new(is_resource_owner),
            validate_authorization: Arc::new(accept_all),
            time: None,
        }
    }

    /// Only accept invocations addressed to `authority`.
    #[must_use]
    pub fn with_authority(mut self, authority: impl Principal) -> Self {
        self.authority = Some(authority.did());
        self
    }

    /// Resolve linked proofs that are not attached inline.
    #[must_use]
    pub fn with_proof_resolver(mut self, resolver: impl ProofResolver + 'static) -> Self {
        self.proofs = ProofCache::new(resolver);
        self
    }

    /// Replace [`is_resource_owner`] as the self-issuance rule.
    #[must_use]
    pub fn with_can_issue<F>(mut self, can_issue: F) -> Self
    where
        F: Fn(&Capability, &Did) -> bool + ConditionalSend + ConditionalSync + 'static,
    {
        self.can_issue = Arc::new(can_issue);
        self
    }

    /// Run `validate` on every authorization found before accepting it. A
    /// rejected authorization is reported as [`Failure::Revoked`] and the
    /// next candidate is tried.
    ///
    /// [`Failure::Revoked`]: crate::Failure::Revoked
    #[must_use]
    pub fn with_authorization_validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Authorization) -> Result<(), Problem> + ConditionalSend + ConditionalSync + 'static,
    {
        self.validate_authorization = Arc::new(validate);
        self
    }

    /// Validate as of `time` (seconds since the UNIX epoch) instead of now.
    #[must_use]
    pub fn at(mut self, time: Timestamp) -> Self {
        self.time = Some(time);
        self
    }

    /// The selector being authorized.
    pub fn capability(&self) -> &S {
        &self.capability
    }

    /// The DID resolver.
    pub fn principal(&self) -> &R {
        &self.principal
    }

    /// The required invocation audience, if any.
    pub fn authority(&self) -> Option<&Did> {
        self.authority.as_ref()
    }

    /// The proof cache.
    pub fn proofs(&self) -> &ProofCache {
        &self.proofs
    }

    /// The self-issuance rule.
    pub fn can_issue(&self) -> &dyn CanIssue {
        self.can_issue.as_ref()
    }

    /// Apply the authorization validator to `authorization`.
    pub fn validate_authorization(&self, authorization: &Authorization) -> Result<(), Problem> {
        (self.validate_authorization)(authorization)
    }

    /// The validation time.
    pub fn now(&self) -> Timestamp {
        self.time.unwrap_or_else(unix_now)
    }
}

impl<S: fmt::Debug, R> fmt::Debug for ValidationContext<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("capability", &self.capability)
            .field("authority", &self.authority)
            .field("proofs", &self.proofs)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
