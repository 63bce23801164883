//! Concrete principals for warrant.
//!
//! Provides an Ed25519 `did:key` [`Ed25519Signer`] that issues
//! delegations, the matching [`Ed25519Verifier`], and an
//! [`Ed25519KeyResolver`] that turns `did:key` strings back into
//! verifiers.

#![warn(missing_docs)]

pub mod ed25519;

pub use ed25519::{Ed25519KeyResolver, Ed25519Signer, Ed25519Verifier};
