//! Ed25519 DID key resolver.

use super::{error::Ed25519ResolveError, verifier::Ed25519Verifier};
use warrant_principal::{Did, Resolver};

/// Resolves `did:key` strings to Ed25519 verifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyResolver;

impl Resolver for Ed25519KeyResolver {
    type Verifier = Ed25519Verifier;
    type Error = Ed25519ResolveError;

    async fn resolve(&self, did: &Did) -> Result<Ed25519Verifier, Self::Error> {
        Ok(did.as_str().parse()?)
    }
}
