//! Validating an invocation against its delegation chain.
//!
//! The walk is depth-first: every match of the claimed capability is tried
//! in order, and a match that can not be issued by its own issuer is
//! proven by recursively authorizing what it selects among the proofs of
//! its delegation. Proofs of one hop are resolved and verified
//! concurrently; their outcomes are merged in citation order.

use crate::{
    authorization::Authorization,
    capability::Source,
    context::ValidationContext,
    error::Failure,
    select::{DynMatch, Select, Selector},
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, instrument, trace};
use warrant_common::{BoxedFuture, boxed, join_ordered};
use warrant_delegation::{
    Delegation, Invocation, Proof, SignatureVerificationError, TimeError, Timestamp,
};
use warrant_principal::Resolver;

/// Authorize `invocation` against `context`.
///
/// # Errors
///
/// Fatal failures are returned as they are: an invalid invocation
/// signature, an invocation addressed to someone other than the
/// configured authority, a malformed invoked capability, or an issuer DID
/// the principal resolver can not handle. Everything else is collected
/// into [`Failure::Unauthorized`], one cause per rejected candidate.
#[instrument(
    level = "debug",
    skip_all,
    fields(invocation = %invocation.cid(), can = %invocation.capability().can)
)]
pub async fn access<S, R>(
    invocation: &Invocation,
    context: &ValidationContext<S, R>,
) -> Result<Authorization<S::Match>, Failure>
where
    S: Selector,
    R: Resolver,
{
    let delegation = invocation.delegation();
    verify_signature(delegation, context).await?;

    if let Some(authority) = context.authority() {
        if delegation.audience() != authority {
            return Err(Failure::InvalidAudience {
                delegation: *delegation.cid(),
                audience: delegation.audience().clone(),
                expected: authority.clone(),
            });
        }
    }

    let unauthorized = |causes| Failure::Unauthorized {
        capability: invocation.capability().clone(),
        causes,
    };

    if let Err(failure) = validate_time(delegation, context.now()) {
        debug!(%failure, "invocation is out of its time bounds");
        return Err(unauthorized(vec![failure]));
    }

    let sources = Source::all(delegation).collect::<Vec<_>>();
    let selection = context.capability().select(&sources);
    if selection.matches.is_empty() {
        if let Some(malformed) = selection
            .errors
            .iter()
            .find(|failure| matches!(failure, Failure::MalformedCapability { .. }))
        {
            return Err(malformed.clone());
        }
    }

    let Select {
        matches,
        errors,
        unknown,
    } = selection;
    let mut causes = Select::<()> {
        matches: Vec::new(),
        errors,
        unknown,
    }
    .into_failures();

    for matched in matches {
        let matched = Arc::new(matched);
        match prove(matched.clone() as DynMatch, context).await? {
            Outcome::Proven(proofs) => {
                let authorization = Authorization::new(matched, proofs);
                if let Err(cause) = context.validate_authorization(&authorization.erase()) {
                    debug!(%cause, "authorization rejected");
                    causes.push(Failure::Revoked {
                        delegation: *delegation.cid(),
                        cause,
                    });
                    continue;
                }
                debug!(issuer = %delegation.issuer(), "invocation authorized");
                return Ok(authorization);
            }
            Outcome::Failed(Failure::InvalidClaim { causes: inner, .. }) => causes.extend(inner),
            Outcome::Failed(failure) => causes.push(failure),
        }
    }

    debug!(causes = causes.len(), "invocation is not authorized");
    Err(unauthorized(causes))
}

enum Outcome {
    Proven(Vec<Authorization>),
    Failed(Failure),
}

/// Prove `matched`, unless its issuer may issue it outright.
async fn prove<S, R>(
    matched: DynMatch,
    context: &ValidationContext<S, R>,
) -> Result<Outcome, Failure>
where
    S: Selector,
    R: Resolver,
{
    let Some(remaining) = matched.prune(context.can_issue()) else {
        trace!(issuer = %matched.delegation().issuer(), "self-issued");
        return Ok(Outcome::Proven(Vec::new()));
    };
    match authorize(remaining, context).await {
        Ok(proof) => Ok(Outcome::Proven(vec![proof])),
        Err(failure) if failure.is_fatal() => Err(failure),
        Err(failure) => Ok(Outcome::Failed(failure)),
    }
}

/// Find a proof match for `claim` among the proofs of its delegations and
/// prove that in turn.
fn authorize<'a, S, R>(
    claim: DynMatch,
    context: &'a ValidationContext<S, R>,
) -> BoxedFuture<'a, Result<Authorization, Failure>>
where
    S: Selector,
    R: Resolver,
{
    boxed(async move {
        let Resolved {
            sources,
            mut failures,
        } = resolve_proofs(claim.sources(), context).await?;

        let Select {
            matches,
            errors,
            unknown,
        } = claim.select(&sources);
        failures.extend(
            Select::<()> {
                matches: Vec::new(),
                errors,
                unknown,
            }
            .into_failures(),
        );
        if matches.is_empty() && failures.is_empty() {
            failures.push(Failure::UnprovenCapability {
                claim: claim.capabilities(),
                issuer: claim.delegation().issuer().clone(),
            });
        }

        for matched in matches {
            match prove(matched.clone(), context).await? {
                Outcome::Proven(proofs) => {
                    debug!(
                        delegation = %matched.delegation().cid(),
                        issuer = %matched.delegation().issuer(),
                        "proof accepted"
                    );
                    return Ok(Authorization::new(matched, proofs));
                }
                Outcome::Failed(failure) => {
                    debug!(
                        delegation = %matched.delegation().cid(),
                        %failure,
                        "proof rejected"
                    );
                    failures.push(failure);
                }
            }
        }

        Err(Failure::InvalidClaim {
            claim: claim.capabilities(),
            causes: failures,
        })
    })
}

struct Resolved {
    sources: Vec<Source>,
    failures: Vec<Failure>,
}

/// Resolve and check the proofs of every delegation a claim was selected
/// from.
async fn resolve_proofs<S, R>(
    claimed: Vec<Source>,
    context: &ValidationContext<S, R>,
) -> Result<Resolved, Failure>
where
    S: Selector,
    R: Resolver,
{
    let mut seen = HashSet::new();
    let citing = claimed
        .into_iter()
        .map(|source| source.delegation().clone())
        .filter(|delegation| seen.insert(*delegation.cid()))
        .collect::<Vec<_>>();

    let links = citing
        .iter()
        .flat_map(|delegation| delegation.proofs())
        .filter_map(|proof| match proof {
            Proof::Link(link) => Some(link),
            Proof::Delegation(_) => None,
        })
        .collect::<Vec<_>>();
    let resolved = context.proofs().resolve_all(&links).await;

    let mut cited = HashSet::new();
    let mut candidates = Vec::new();
    for delegation in &citing {
        for proof in delegation.proofs() {
            if !cited.insert((delegation.issuer().clone(), proof.link())) {
                continue;
            }
            let proof = match proof {
                Proof::Delegation(proof) => Ok(proof),
                Proof::Link(link) => resolved.get(&link).cloned().unwrap_or_else(|| {
                    Err(Failure::UnavailableProof { link, cause: None })
                }),
            };
            candidates.push(proof.map(|proof| (delegation.clone(), proof)));
        }
    }

    let mut checks = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        checks.push(check_candidate(candidate, context));
    }
    let checked = join_ordered(checks).await;

    let mut sources = Vec::new();
    let mut failures = Vec::new();
    for check in checked {
        match check {
            Ok(proof) => sources.extend(Source::all(&proof)),
            Err(failure) if failure.is_fatal() => return Err(failure),
            Err(failure) => {
                trace!(%failure, "proof dismissed");
                failures.push(failure);
            }
        }
    }
    Ok(Resolved { sources, failures })
}

async fn check_candidate<S, R>(
    candidate: Result<(Arc<Delegation>, Arc<Delegation>), Failure>,
    context: &ValidationContext<S, R>,
) -> Result<Arc<Delegation>, Failure>
where
    S: Selector,
    R: Resolver,
{
    let (delegation, proof) = candidate?;
    validate_proof(&delegation, &proof, context).await?;
    Ok(proof)
}

/// Chain continuity, time bounds and signature of a proof cited by
/// `delegation`.
async fn validate_proof<S, R>(
    delegation: &Delegation,
    proof: &Delegation,
    context: &ValidationContext<S, R>,
) -> Result<(), Failure>
where
    S: Selector,
    R: Resolver,
{
    if proof.audience() != delegation.issuer() {
        return Err(Failure::InvalidAudience {
            delegation: *proof.cid(),
            audience: proof.audience().clone(),
            expected: delegation.issuer().clone(),
        });
    }
    validate_time(proof, context.now())?;
    verify_signature(proof, context).await
}

fn validate_time(delegation: &Delegation, now: Timestamp) -> Result<(), Failure> {
    delegation.validate_time(now).map_err(|error| match error {
        TimeError::Expired { expiration } => Failure::Expired {
            delegation: *delegation.cid(),
            expiration,
        },
        TimeError::NotValidBefore { not_before } => Failure::NotValidBefore {
            delegation: *delegation.cid(),
            not_before,
        },
    })
}

async fn verify_signature<S, R>(
    delegation: &Delegation,
    context: &ValidationContext<S, R>,
) -> Result<(), Failure>
where
    R: Resolver,
{
    delegation
        .verify_signature(context.principal())
        .await
        .map_err(|error| match error {
            SignatureVerificationError::Resolution(cause) => Failure::UnresolvablePrincipal {
                did: delegation.issuer().clone(),
                cause: cause.to_string(),
            },
            SignatureVerificationError::Encoding(_)
            | SignatureVerificationError::Verification(_) => Failure::InvalidSignature {
                delegation: *delegation.cid(),
                issuer: delegation.issuer().clone(),
            },
        })
}
