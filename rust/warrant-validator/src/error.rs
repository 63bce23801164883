//! Why a capability could not be authorized.

use ipld_core::cid::Cid;
use thiserror::Error;
use warrant_delegation::{Capability, Timestamp};
use warrant_principal::Did;
use warrant_schema::SchemaError;

/// A derivation rule's explanation of why a delegated capability does not
/// cover the claimed one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Problem(pub String);

impl Problem {
    /// Creates a problem with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Every way a claim can fail.
///
/// Leaf variants describe a single rejected candidate; [`Failure::InvalidClaim`]
/// and [`Failure::Unauthorized`] aggregate the failures of everything that
/// was tried, so the rendered message is a tree of reasons.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Failure {
    /// A candidate capability is not the kind the selector is looking for.
    #[error("Capability {capability} is not a known kind of capability")]
    UnknownCapability {
        /// The unrecognized capability.
        capability: Capability,
    },

    /// A candidate has the right ability but its resource or caveats do not
    /// conform to the descriptor.
    #[error("Encountered malformed '{}' capability: {capability}\n{}", .capability.can, indent(.cause))]
    MalformedCapability {
        /// The malformed capability.
        capability: Capability,
        /// What the descriptor rejected.
        cause: SchemaError,
    },

    /// A delegated capability is narrower than what is claimed.
    #[error("Constraint violation: {cause}\n  claimed: {claimed}\n  delegated: {}", list(.delegated))]
    EscalatedCapability {
        /// The claimed capability.
        claimed: Capability,
        /// The delegated capabilities it was checked against.
        delegated: Vec<Capability>,
        /// Why the derivation rule rejected it.
        cause: Problem,
    },

    /// A proof is addressed to someone other than the issuer citing it, or
    /// an invocation to someone other than this service.
    #[error("Delegation {delegation} is addressed to {audience} instead of {expected}")]
    InvalidAudience {
        /// The delegation with the wrong audience.
        delegation: Cid,
        /// Its audience.
        audience: Did,
        /// The audience it should have.
        expected: Did,
    },

    /// A delegation's expiration has passed.
    #[error("Delegation {delegation} has expired on {expiration}")]
    Expired {
        /// The expired delegation.
        delegation: Cid,
        /// Its expiration.
        expiration: Timestamp,
    },

    /// A delegation is not valid yet.
    #[error("Delegation {delegation} is not valid before {not_before}")]
    NotValidBefore {
        /// The premature delegation.
        delegation: Cid,
        /// Its not-before bound.
        not_before: Timestamp,
    },

    /// A cited proof could not be found.
    #[error("Linked proof {link} is not included and could not be resolved{}", .cause.as_ref().map(|cause| format!(": {cause}")).unwrap_or_default())]
    UnavailableProof {
        /// The cited CID.
        link: Cid,
        /// What the resolver reported, if one was consulted.
        cause: Option<String>,
    },

    /// A delegation's signature does not verify against its issuer.
    #[error("Signature of delegation {delegation} is not valid for issuer {issuer}")]
    InvalidSignature {
        /// The delegation with the bad signature.
        delegation: Cid,
        /// Its claimed issuer.
        issuer: Did,
    },

    /// The principal resolver does not know how to verify this DID.
    #[error("Unable to resolve principal {did}: {cause}")]
    UnresolvablePrincipal {
        /// The DID that could not be resolved.
        did: Did,
        /// What the resolver reported.
        cause: String,
    },

    /// Nothing among the proofs of a delegation even resembles what it
    /// claims, and its issuer may not issue it outright.
    #[error("Capability {} can not be (self) issued by {issuer} and no delegated capability was found", list(.claim))]
    UnprovenCapability {
        /// The capabilities that needed backing.
        claim: Vec<Capability>,
        /// The issuer that would have had to issue them.
        issuer: Did,
    },

    /// The authorization validator rejected an otherwise complete chain.
    #[error("Authorization through delegation {delegation} was rejected: {cause}")]
    Revoked {
        /// The invocation's delegation.
        delegation: Cid,
        /// What the authorization validator reported.
        cause: Problem,
    },

    /// No proof of a delegation could back the capabilities it claims.
    #[error("Capability {} is not authorized because:\n{}", list(.claim), indent_all(.causes))]
    InvalidClaim {
        /// The capabilities that needed backing.
        claim: Vec<Capability>,
        /// One entry per rejected candidate.
        causes: Vec<Failure>,
    },

    /// The invoked capability is not authorized.
    #[error("Claim {capability} is not authorized\n{}", indent_all(.causes))]
    Unauthorized {
        /// The invoked capability.
        capability: Capability,
        /// One entry per rejected candidate.
        causes: Vec<Failure>,
    },
}

impl Failure {
    /// Short kind tag, stable across message changes.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnknownCapability { .. } => "UnknownCapability",
            Self::MalformedCapability { .. } => "MalformedCapability",
            Self::EscalatedCapability { .. } => "EscalatedCapability",
            Self::InvalidAudience { .. } => "InvalidAudience",
            Self::Expired { .. } => "Expired",
            Self::NotValidBefore { .. } => "NotValidBefore",
            Self::UnavailableProof { .. } => "UnavailableProof",
            Self::InvalidSignature { .. } => "InvalidSignature",
            Self::UnresolvablePrincipal { .. } => "UnresolvablePrincipal",
            Self::UnprovenCapability { .. } => "UnprovenCapability",
            Self::Revoked { .. } => "Revoked",
            Self::InvalidClaim { .. } => "InvalidClaim",
            Self::Unauthorized { .. } => "Unauthorized",
        }
    }

    /// Human-readable, indented rendering of this failure and its causes.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Nested failures, empty for leaves.
    #[must_use]
    pub fn causes(&self) -> &[Failure] {
        match self {
            Self::InvalidClaim { causes, .. } | Self::Unauthorized { causes, .. } => causes,
            _ => &[],
        }
    }

    /// Whether this failure aborts the whole validation instead of only
    /// the branch it occurred on.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnresolvablePrincipal { .. })
    }

    /// Depth-first walk over this failure and everything under it.
    pub fn walk(&self) -> impl Iterator<Item = &Failure> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let next = pending.pop()?;
            pending.extend(next.causes().iter().rev());
            Some(next)
        })
    }
}

fn list(capabilities: &[Capability]) -> String {
    match capabilities {
        [single] => single.to_string(),
        many => format!(
            "[{}]",
            many.iter()
                .map(Capability::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn indent(error: &impl ToString) -> String {
    error
        .to_string()
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_all(failures: &[Failure]) -> String {
    failures
        .iter()
        .map(|failure| {
            failure
                .to_string()
                .lines()
                .enumerate()
                .map(|(index, line)| {
                    if index == 0 {
                        format!("  - {line}")
                    } else {
                        format!("    {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
