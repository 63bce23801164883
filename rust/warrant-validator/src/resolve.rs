//! Resolving a delegated capability against the capability it should prove.

use crate::pattern::matches;
use warrant_delegation::Capability;

/// Resource that stands for every resource the issuer holds.
pub const ANY_RESOURCE: &str = "ucan:*";

/// The claimed ability if the delegated `pattern` covers it.
#[must_use]
pub fn resolve_ability<'a>(pattern: &str, claimed: &'a str) -> Option<&'a str> {
    matches(pattern, claimed).then_some(claimed)
}

/// The resource a delegated capability stands for when proving `claimed`.
///
/// `ucan:*` and segment patterns (`file:///home/*`) resolve to the claimed
/// resource. A `/`-terminated delegated resource containing the claimed one
/// is kept as is, for derivation to compare. Anything else, including
/// `did:key:z6*`, is a different resource and yields `None`.
#[must_use]
pub fn resolve_resource<'a>(delegated: &'a str, claimed: &'a str) -> Option<&'a str> {
    if delegated == ANY_RESOURCE || matches(delegated, claimed) {
        Some(claimed)
    } else if delegated.ends_with('/') && claimed.starts_with(delegated) {
        Some(delegated)
    } else {
        None
    }
}

/// Resolve `delegated` into the shape of `claimed`.
///
/// Returns `None` when the delegated ability or resource does not cover
/// the claimed one. Otherwise patterns are replaced by the claimed values and the
/// caveats are the claimed ones overridden by the delegated ones, so
/// whatever the delegation leaves open is carried up unchanged.
#[must_use]
pub fn resolve_capability(delegated: &Capability, claimed: &Capability) -> Option<Capability> {
    let can = resolve_ability(&delegated.can, &claimed.can)?;
    let with = resolve_resource(&delegated.with, &claimed.with)?;
    let mut nb = claimed.nb.clone();
    nb.extend(
        delegated
            .nb
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    Some(Capability {
        can: can.to_string(),
        with: with.to_string(),
        nb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_resolves_patterns_to_the_claim() {
        let delegated = Capability::new("store/*", "did:key:zAlice").with_caveat("size", 100);
        let claimed = Capability::new("store/add", "did:key:zAlice").with_caveat("size", 50);
        assert_eq!(
            resolve_capability(&delegated, &claimed),
            Some(Capability::new("store/add", "did:key:zAlice").with_caveat("size", 100))
        );
    }

    #[test]
    fn it_inherits_unconstrained_caveats_from_the_claim() {
        let delegated = Capability::new("store/add", "did:key:zAlice");
        let claimed = Capability::new("store/add", "did:key:zAlice")
            .with_caveat("size", 50)
            .with_caveat("link", "bafy");
        assert_eq!(resolve_capability(&delegated, &claimed), Some(claimed));
    }

    #[test]
    fn it_resolves_any_resource() {
        let delegated = Capability::new("*", ANY_RESOURCE);
        let claimed = Capability::new("store/add", "did:key:zAlice");
        assert_eq!(resolve_capability(&delegated, &claimed), Some(claimed));
    }

    #[test]
    fn it_rejects_unrelated_resources() {
        let delegated = Capability::new("store/add", "did:key:zBob");
        let claimed = Capability::new("store/add", "did:key:zAlice");
        assert_eq!(resolve_capability(&delegated, &claimed), None);
    }

    #[test]
    fn it_does_not_expand_partial_segment_resources() {
        assert_eq!(resolve_resource("did:key:z6*", "did:key:z6MkAlice"), None);
        assert_eq!(
            resolve_resource("file:///home/*", "file:///home/alice"),
            Some("file:///home/alice")
        );
    }

    #[test]
    fn it_keeps_containing_directories_for_derivation() {
        assert_eq!(
            resolve_resource("file:///home/alice/", "file:///home/alice/public"),
            Some("file:///home/alice/")
        );
        assert_eq!(resolve_resource("file:///home/alice/", "file:///home/bob/"), None);
    }

    #[test]
    fn it_rejects_uncovered_abilities() {
        let delegated = Capability::new("dev/p*", "did:key:zAlice");
        let claimed = Capability::new("dev/ping", "did:key:zAlice");
        assert_eq!(resolve_capability(&delegated, &claimed), None);
    }
}
