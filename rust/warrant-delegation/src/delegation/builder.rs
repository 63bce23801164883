//! Builder for [`Delegation`]s.

use super::{Delegation, DelegationPayload};
use crate::{
    capability::{Capability, Caveats},
    error::DelegationError,
    invocation::Invocation,
    proof::Proof,
    time::Timestamp,
};
use warrant_principal::{Did, Principal, Signer};

/// Accumulates the fields of a delegation until it is signed.
///
/// The issuer is the signer handed to [`DelegationBuilder::sign`].
#[derive(Debug, Clone, Default)]
pub struct DelegationBuilder {
    audience: Option<Did>,
    capabilities: Vec<Capability>,
    proofs: Vec<Proof>,
    expiration: Option<Timestamp>,
    not_before: Option<Timestamp>,
    facts: Vec<Caveats>,
    nonce: Option<String>,
}

impl DelegationBuilder {
    /// Creates a blank builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the audience.
    #[must_use]
    pub fn audience(mut self, audience: impl Principal) -> Self {
        self.audience = Some(audience.did());
        self
    }

    /// Adds a delegated capability.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Adds several delegated capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Cites a proof. Delegations are attached inline, CIDs are only linked.
    #[must_use]
    pub fn proof(mut self, proof: impl Into<Proof>) -> Self {
        self.proofs.push(proof.into());
        self
    }

    /// Cites several proofs.
    #[must_use]
    pub fn proofs<P: Into<Proof>>(mut self, proofs: impl IntoIterator<Item = P>) -> Self {
        self.proofs.extend(proofs.into_iter().map(Into::into));
        self
    }

    /// Sets the expiration (seconds since the UNIX epoch).
    #[must_use]
    pub fn expiration(mut self, expiration: Timestamp) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Sets the not-before bound (seconds since the UNIX epoch).
    #[must_use]
    pub fn not_before(mut self, not_before: Timestamp) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Adds a fact.
    #[must_use]
    pub fn fact(mut self, fact: Caveats) -> Self {
        self.facts.push(fact);
        self
    }

    /// Sets the nonce.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sign the delegation as `issuer`.
    ///
    /// # Errors
    ///
    /// Returns [`DelegationError::Incomplete`] when no audience was set, or
    /// an encoding/signing error.
    pub async fn sign<S: Signer>(self, issuer: &S) -> Result<Delegation, DelegationError> {
        let audience = self.audience.ok_or(DelegationError::Incomplete("audience"))?;
        let payload = DelegationPayload {
            issuer: issuer.did(),
            audience,
            capabilities: self.capabilities,
            proofs: self.proofs.iter().map(Proof::link).collect(),
            expiration: self.expiration,
            not_before: self.not_before,
            facts: self.facts,
            nonce: self.nonce,
        };
        let signature = issuer.sign(&payload.encode()?).await?;
        let attached = self
            .proofs
            .into_iter()
            .filter_map(|proof| proof.delegation().cloned());
        let delegation = Delegation::seal(payload, signature, attached)?;
        tracing::trace!(cid = %delegation.cid(), issuer = %delegation.issuer(), "signed delegation");
        Ok(delegation)
    }

    /// Sign as `issuer` and wrap the result as an [`Invocation`].
    ///
    /// # Errors
    ///
    /// Same as [`DelegationBuilder::sign`], plus
    /// [`DelegationError::NotAnInvocation`] unless exactly one capability
    /// was added.
    pub async fn invoke<S: Signer>(self, issuer: &S) -> Result<Invocation, DelegationError> {
        if self.capabilities.len() != 1 {
            return Err(DelegationError::NotAnInvocation(self.capabilities.len()));
        }
        Invocation::try_from(self.sign(issuer).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warrant_credentials::Ed25519Signer;

    #[tokio::test]
    async fn it_requires_an_audience() {
        let alice = Ed25519Signer::import([1u8; 32]).await.unwrap();
        let result = DelegationBuilder::new()
            .capability(Capability::new("store/add", alice.did().as_str()))
            .sign(&alice)
            .await;
        assert!(matches!(result, Err(DelegationError::Incomplete("audience"))));
    }

    #[tokio::test]
    async fn it_refuses_to_invoke_several_capabilities() {
        let alice = Ed25519Signer::import([1u8; 32]).await.unwrap();
        let result = DelegationBuilder::new()
            .audience(&alice)
            .capability(Capability::new("store/add", alice.did().as_str()))
            .capability(Capability::new("store/list", alice.did().as_str()))
            .invoke(&alice)
            .await;
        assert!(matches!(result, Err(DelegationError::NotAnInvocation(2))));
    }
}
