//! Capability delegations.
//!
//! A [`Delegation`] is a signed statement that an issuer grants a set of
//! [`Capability`] values to an audience, optionally citing other
//! delegations as proofs. Delegations are encoded as DAG-CBOR and
//! addressed by the CIDv1 of their encoding, which is what proofs link to.
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use warrant_credentials::Ed25519Signer;
//! use warrant_delegation::{Capability, Delegation};
//! use warrant_principal::Principal;
//!
//! let alice = Ed25519Signer::import([1u8; 32]).await?;
//! let bob = Ed25519Signer::import([2u8; 32]).await?;
//!
//! let delegation = Delegation::builder()
//!     .audience(&bob)
//!     .capability(Capability::new("store/*", alice.did().as_str()).with_caveat("size", 100))
//!     .sign(&alice)
//!     .await?;
//!
//! println!("{}", delegation.cid());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod capability;
mod codec;
pub mod delegation;
pub mod error;
pub mod invocation;
pub mod proof;
pub mod time;

pub use capability::*;
pub use delegation::{Delegation, DelegationPayload, builder::DelegationBuilder, store::*};
pub use error::*;
pub use invocation::Invocation;
pub use ipld_core::{cid::Cid, ipld::Ipld};
pub use proof::Proof;
pub use time::*;
