//! Principals: DID-identified parties that sign and verify payloads.
//!
//! The validator never touches key material directly. It consumes the
//! contracts defined here:
//!
//! - [`Signer`] produces a signature over a payload.
//! - [`Verifier`] checks a signature against a payload.
//! - [`Resolver`] turns an issuer or audience [`Did`] into a [`Verifier`].
//!
//! Concrete key types live in `warrant-credentials`.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod did;
pub mod principal;
pub mod resolver;
pub mod signature;

pub use did::*;
pub use principal::*;
pub use resolver::*;
pub use signature::*;
