//! Ability and resource patterns.
//!
//! A pattern is either `*`, a literal, or a literal whose last
//! `/`-delimited segment is exactly `*`. Partial segments are literal:
//! `dev/p*` only matches the string `dev/p*`.

/// Whether `value` is covered by `pattern`.
///
/// ```
/// use warrant_validator::pattern::matches;
///
/// assert!(matches("store/*", "store/add"));
/// assert!(matches("*", "store/add"));
/// assert!(!matches("dev/p*", "dev/ping"));
/// assert!(!matches("store/*", "storeX"));
/// ```
#[must_use]
pub fn matches(pattern: &str, value: &str) -> bool {
    if pattern.is_empty() || value.is_empty() {
        return false;
    }
    if pattern == "*" || pattern == value {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(prefix) => value
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| !rest.is_empty()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_matches_literals() {
        assert!(matches("store/add", "store/add"));
        assert!(!matches("store/add", "store/list"));
    }

    #[test]
    fn it_matches_everything_with_a_lone_star() {
        assert!(matches("*", "store/add"));
        assert!(matches("*", "did:key:zAlice"));
    }

    #[test]
    fn it_matches_whole_trailing_segments() {
        assert!(matches("store/*", "store/add"));
        assert!(matches("store/*", "store/list"));
        assert!(matches("store/*", "store/shard/add"));
        assert!(matches("file:///home/alice/*", "file:///home/alice/public"));
    }

    #[test]
    fn it_respects_delimiters() {
        assert!(!matches("store/*", "storeX"));
        assert!(!matches("store/*", "store"));
        assert!(!matches("store/*", "store/"));
        assert!(!matches("store/*", "storage/add"));
    }

    #[test]
    fn it_does_not_treat_partial_segments_as_wildcards() {
        assert!(!matches("dev/p*", "dev/ping"));
        assert!(!matches("store/ad*", "store/add"));
        assert!(!matches("did:key:z6*", "did:key:z6MkAlice"));
        assert!(matches("dev/p*", "dev/p*"));
    }

    #[test]
    fn it_never_matches_empty_input() {
        assert!(!matches("", "store/add"));
        assert!(!matches("store/*", ""));
        assert!(!matches("", ""));
        assert!(!matches("*", ""));
    }
}
