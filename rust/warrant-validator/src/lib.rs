//! Capability validation.
//!
//! This crate decides whether an [`Invocation`] is authorized: whether the
//! capability it invokes is backed by an unbroken chain of delegations
//! reaching a principal that may issue it outright.
//!
//! # Quick Example
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use warrant_credentials::{Ed25519KeyResolver, Ed25519Signer};
//! use warrant_delegation::{Capability, Delegation};
//! use warrant_principal::Principal;
//! use warrant_schema::{Schema, did};
//! use warrant_validator::{ValidationContext, access, capability, derives};
//!
//! let alice = Ed25519Signer::import([1u8; 32]).await?;
//! let bob = Ed25519Signer::import([2u8; 32]).await?;
//! let service = Ed25519Signer::import([3u8; 32]).await?;
//!
//! // Alice lets Bob store up to 100 bytes in her space.
//! let proof = Delegation::builder()
//!     .audience(&bob)
//!     .capability(Capability::new("store/*", alice.did().as_str()).with_caveat("size", 100))
//!     .sign(&alice)
//!     .await?;
//!
//! // Bob asks the service to store 50.
//! let invocation = Delegation::builder()
//!     .audience(&service)
//!     .capability(Capability::new("store/add", alice.did().as_str()).with_caveat("size", 50))
//!     .proof(proof)
//!     .invoke(&bob)
//!     .await?;
//!
//! let store_add = capability("store/add", did())
//!     .caveats(Schema::structure([("size", Schema::integer().optional())]))
//!     .derives(|claimed, delegated| {
//!         derives::equal_with(claimed, delegated)?;
//!         derives::within_limit(claimed, delegated, "size")
//!     });
//!
//! let context = ValidationContext::new(store_add, Ed25519KeyResolver).with_authority(&service);
//! let authorization = access(&invocation, &context).await?;
//! assert_eq!(authorization.capability().with, alice.did());
//! # Ok(())
//! # }
//! ```
//!
//! # Core Concepts
//!
//! ## Descriptors
//!
//! A [`Descriptor`] describes one kind of capability: the ability it
//! answers to, a [`Reader`](warrant_schema::Reader) for its resource, one
//! for its caveats, and a derivation rule deciding when a delegated
//! instance covers a claimed one. Descriptors are [`Selector`]s and
//! compose with [`Selector::or`], [`Selector::and`] (amplification) and
//! [`Selector::derive`].
//!
//! ## Matches
//!
//! Selecting over a set of [`Source`]s yields a [`Select`]: the [`Match`]es
//! found, the candidates rejected with a [`Failure`], and the ones not
//! recognized at all. A match in turn selects, among the capabilities of
//! its delegation's proofs, the matches that prove it. Delegated patterns
//! (`store/*`, `ucan:*`) are resolved against the claim first, see
//! [`resolve`].
//!
//! ## Access
//!
//! [`access`] walks that relation from the invocation towards the root,
//! checking at every hop that the proof is addressed to whoever cites it,
//! is within its time bounds and carries a valid signature. The first
//! complete path is returned as an [`Authorization`]; otherwise every
//! rejected candidate ends up in [`Failure::Unauthorized`].
//!
//! [`Invocation`]: warrant_delegation::Invocation

#![warn(missing_docs)]

mod access;
mod amplify;
mod authorization;
mod capability;
mod context;
mod derive;
pub mod derives;
mod descriptor;
mod error;
mod or;
pub mod pattern;
pub mod resolve;
mod resolver;
mod select;

pub use access::access;
pub use amplify::{Amplified, Amplify, Group};
pub use authorization::Authorization;
pub use capability::{ParsedCapability, Source};
pub use context::{CanIssue, ValidateAuthorization, ValidationContext, is_resource_owner};
pub use derive::{Derive, DerivedMatch};
pub use descriptor::{Descriptor, DescriptorBuilder, DirectMatch, capability};
pub use error::{Failure, Problem};
pub use or::{Or, OrMatch};
pub use resolver::{ProofCache, ProofResolver, UnavailableProof};
pub use select::{DynMatch, Match, Matched, ParsedValue, Select, Selector};
