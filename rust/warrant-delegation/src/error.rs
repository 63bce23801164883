//! Errors raised while issuing, encoding or decoding delegations.

use thiserror::Error;

/// Errors from building, encoding or decoding a [`crate::Delegation`].
#[derive(Debug, Error)]
pub enum DelegationError {
    /// DAG-CBOR encoding failed.
    #[error("failed to encode delegation: {0}")]
    Encode(String),

    /// DAG-CBOR decoding failed.
    #[error("failed to decode delegation: {0}")]
    Decode(String),

    /// The content hash could not be wrapped into a multihash.
    #[error("failed to hash delegation: {0}")]
    Hash(String),

    /// The issuer failed to sign the payload.
    #[error("failed to sign delegation: {0}")]
    Sign(#[from] signature::Error),

    /// A required builder field was never set.
    #[error("delegation is missing its {0}")]
    Incomplete(&'static str),

    /// An exported archive contained no blocks.
    #[error("archive contains no delegation")]
    EmptyArchive,

    /// An invocation must carry exactly one capability.
    #[error("invocation must carry exactly one capability, found {0}")]
    NotAnInvocation(usize),
}

/// Errors from [`crate::Delegation::verify_signature`].
#[derive(Debug, Error)]
pub enum SignatureVerificationError<E: std::error::Error> {
    /// The payload could not be re-encoded for verification.
    #[error("failed to encode payload: {0}")]
    Encoding(#[from] DelegationError),

    /// The issuer DID could not be resolved to a verifier.
    #[error("failed to resolve issuer: {0}")]
    Resolution(E),

    /// The signature does not match the payload.
    #[error("signature verification failed: {0}")]
    Verification(signature::Error),
}
