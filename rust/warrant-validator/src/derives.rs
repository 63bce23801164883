//! Derivation rules: does a delegated capability cover a claimed one?
//!
//! A rule receives the claimed capability and the delegated one (already
//! resolved against the claim) and either accepts or explains itself with
//! a [`Problem`]. The helpers here cover the common checks and compose
//! with `?`:
//!
//! ```
//! use warrant_validator::{ParsedCapability, Problem, derives};
//! use warrant_delegation::Caveats;
//!
//! fn store_add(
//!     claimed: &ParsedCapability<String, Caveats>,
//!     delegated: &ParsedCapability<String, Caveats>,
//! ) -> Result<(), Problem> {
//!     derives::equal_with(claimed, delegated)?;
//!     derives::equal_caveat(claimed, delegated, "link")?;
//!     derives::within_limit(claimed, delegated, "size")
//! }
//! ```

use crate::{capability::ParsedCapability, error::Problem, pattern::matches};
use ipld_core::ipld::Ipld;
use std::fmt::Display;
use warrant_common::{ConditionalSend, ConditionalSync};
use warrant_delegation::{Caveats, DisplayIpld};

/// A derivation rule: accepts `delegated` as proof of `claimed`, or
/// explains why not.
pub trait Derives<C, D>: Fn(&C, &D) -> Result<(), Problem> + ConditionalSend + ConditionalSync {}

impl<C, D, F> Derives<C, D> for F where
    F: Fn(&C, &D) -> Result<(), Problem> + ConditionalSend + ConditionalSync
{
}

/// Caveat value meaning "no constraint".
pub const UNCONSTRAINED: &str = "*";

fn is_unconstrained(value: &Ipld) -> bool {
    matches!(value, Ipld::String(value) if value == UNCONSTRAINED)
}

/// The rule used when a descriptor declares none: the claimed resource
/// must be within the delegated one (see [`resource_within`]) and
/// every caveat the delegation sets must be set to the same value by the
/// claim.
///
/// # Errors
///
/// Returns a [`Problem`] naming the first mismatch.
pub fn default_derives<W: Display>(
    claimed: &ParsedCapability<W, Caveats>,
    delegated: &ParsedCapability<W, Caveats>,
) -> Result<(), Problem> {
    resource_within(claimed, delegated)?;
    for key in delegated.nb.keys() {
        equal_caveat(claimed, delegated, key)?;
    }
    Ok(())
}

/// Resources must be equal.
///
/// # Errors
///
/// Returns a [`Problem`] when they differ.
pub fn equal_with<W: Display, N, M>(
    claimed: &ParsedCapability<W, N>,
    delegated: &ParsedCapability<W, M>,
) -> Result<(), Problem> {
    let (claimed, delegated) = (claimed.with.to_string(), delegated.with.to_string());
    if claimed == delegated {
        Ok(())
    } else {
        Err(Problem::new(format!("Can not derive {claimed} from {delegated}")))
    }
}

/// The claimed resource must be contained by the delegated one: equal,
/// covered by a segment pattern (see [`matches`]), or below it when the
/// delegated resource ends in `/`.
///
/// # Errors
///
/// Returns a [`Problem`] when the claimed resource is outside.
pub fn resource_within<W: Display, N, M>(
    claimed: &ParsedCapability<W, N>,
    delegated: &ParsedCapability<W, M>,
) -> Result<(), Problem> {
    let (claimed, delegated) = (claimed.with.to_string(), delegated.with.to_string());
    let contained = matches(&delegated, &claimed)
        || (delegated.ends_with('/') && claimed.starts_with(&delegated));
    if contained {
        Ok(())
    } else {
        Err(Problem::new(format!(
            "Resource {claimed} does not match delegated {delegated}"
        )))
    }
}

/// When the delegation sets caveat `key` (to anything but `"*"`), the
/// claim must set it to the same value.
///
/// # Errors
///
/// Returns a [`Problem`] when the values differ.
pub fn equal_caveat<W>(
    claimed: &ParsedCapability<W, Caveats>,
    delegated: &ParsedCapability<W, Caveats>,
    key: &str,
) -> Result<(), Problem> {
    let Some(expected) = delegated.nb.get(key).filter(|value| !is_unconstrained(value)) else {
        return Ok(());
    };
    match claimed.nb.get(key) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(Problem::new(format!(
            "{key}: {} violates {}",
            DisplayIpld(actual),
            DisplayIpld(expected)
        ))),
        None => Err(Problem::new(format!(
            "{key}: undefined violates {}",
            DisplayIpld(expected)
        ))),
    }
}

/// When the delegation sets numeric caveat `key`, the claim must set it to
/// a value no greater.
///
/// # Errors
///
/// Returns a [`Problem`] when the claim exceeds the limit, leaves it
/// unbounded, or either side is not a number.
pub fn within_limit<W>(
    claimed: &ParsedCapability<W, Caveats>,
    delegated: &ParsedCapability<W, Caveats>,
    key: &str,
) -> Result<(), Problem> {
    let Some(limit) = delegated.nb.get(key).filter(|value| !is_unconstrained(value)) else {
        return Ok(());
    };
    let Some(actual) = claimed.nb.get(key) else {
        return Err(Problem::new(format!(
            "{key}: unbounded violates limit {}",
            DisplayIpld(limit)
        )));
    };
    match exceeds(actual, limit) {
        Some(false) => Ok(()),
        Some(true) => Err(Problem::new(format!(
            "{key}: {} violates limit {}",
            DisplayIpld(actual),
            DisplayIpld(limit)
        ))),
        None => Err(Problem::new(format!(
            "{key}: can not compare {} with limit {}",
            DisplayIpld(actual),
            DisplayIpld(limit)
        ))),
    }
}

#[allow(clippy::cast_precision_loss)]
fn exceeds(actual: &Ipld, limit: &Ipld) -> Option<bool> {
    match (actual, limit) {
        (Ipld::Integer(actual), Ipld::Integer(limit)) => Some(actual > limit),
        (Ipld::Integer(actual), Ipld::Float(limit)) => Some(*actual as f64 > *limit),
        (Ipld::Float(actual), Ipld::Integer(limit)) => Some(*actual > *limit as f64),
        (Ipld::Float(actual), Ipld::Float(limit)) => Some(actual > limit),
        _ => None,
    }
}
