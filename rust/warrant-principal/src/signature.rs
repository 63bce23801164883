//! Signing and verification contracts.
//!
//! Signatures are opaque bytes here; which algorithm produced them is a
//! property of the principal that signed, and only its [`Verifier`] needs
//! to know.

use std::future::Future;

use crate::principal::Principal;
use warrant_common::ConditionalSend;

pub use ::signature::Error;

/// Produces a cryptographic signature over a payload.
pub trait Signer: Principal {
    /// Sign `payload` and return the raw signature bytes.
    fn sign(&self, payload: &[u8]) -> impl Future<Output = Result<Vec<u8>, Error>> + ConditionalSend;
}

/// Verifies that a cryptographic signature is valid for a given payload.
pub trait Verifier: Principal {
    /// Verify that `signature` is valid for `payload`.
    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), Error>> + ConditionalSend;
}
