//! DID (Decentralized Identifier) types.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A [Decentralized Identifier][spec] string.
///
/// Wraps a raw DID string like `did:key:z6Mk...` or `did:web:example.com`.
/// Use [`method()`][Did::method] to inspect the DID method at runtime.
///
/// [spec]: https://www.w3.org/TR/did-core/
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Did(String);

impl Did {
    /// Get the raw DID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the DID method name (e.g. `"key"` for `did:key:...`,
    /// `"web"` for `did:web:...`).
    #[must_use]
    pub fn method(&self) -> &str {
        self.parts().0
    }

    /// Returns the method-specific identifier (everything after the method).
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.parts().1
    }

    fn parts(&self) -> (&str, &str) {
        // `FromStr` guarantees the `did:` prefix and a second `:`.
        let rest = &self.0["did:".len()..];
        rest.split_once(':').unwrap_or((rest, ""))
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&Did> for Did {
    fn from(did: &Did) -> Self {
        did.clone()
    }
}

impl PartialEq<str> for Did {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Did {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error when parsing a DID string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid DID: {0}")]
pub struct DidParseError(pub String);

impl FromStr for Did {
    type Err = DidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix("did:") else {
            return Err(DidParseError(format!("expected did: prefix, got: {s}")));
        };
        match rest.split_once(':') {
            Some((method, identifier)) if !method.is_empty() && !identifier.is_empty() => {
                Ok(Did(s.to_string()))
            }
            _ => Err(DidParseError(format!(
                "expected did:method:identifier, got: {s}"
            ))),
        }
    }
}

impl TryFrom<String> for Did {
    type Error = DidParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&str> for Did {
    type Error = DidParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Did {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Creates a [`Did`] from a string literal, validated at compile time.
///
/// The `"did:"` prefix is added automatically, pass `"method:identifier"`.
///
/// ```
/// use warrant_principal::did;
///
/// let d = did!("web:web3.storage");
/// assert_eq!(d.method(), "web");
/// assert_eq!(d.identifier(), "web3.storage");
/// ```
///
/// Invalid literals fail at compile time:
/// ```compile_fail
/// use warrant_principal::did;
/// let _bad = did!("nocolon");
/// ```
#[macro_export]
macro_rules! did {
    ($s:literal) => {{
        const _: () = {
            let b = $s.as_bytes();
            let mut i = 0;
            let mut found_colon = false;
            while i < b.len() {
                if b[i] == b':' {
                    assert!(i > 0, "DID method must not be empty");
                    assert!(i + 1 < b.len(), "DID identifier must not be empty");
                    found_colon = true;
                    break;
                }
                i += 1;
            }
            assert!(found_colon, "expected \"method:identifier\"");
        };
        #[allow(clippy::expect_used)]
        format!("did:{}", $s)
            .parse::<$crate::did::Did>()
            // The const block above validated the format
            .expect("invalid did literal")
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_method_and_identifier() {
        let did: Did = "did:key:z6MkAlice".parse().unwrap();
        assert_eq!(did.method(), "key");
        assert_eq!(did.identifier(), "z6MkAlice");
    }

    #[test]
    fn it_keeps_colons_in_identifier() {
        let did: Did = "did:web:example.com:user:alice".parse().unwrap();
        assert_eq!(did.method(), "web");
        assert_eq!(did.identifier(), "example.com:user:alice");
    }

    #[test]
    fn it_rejects_malformed_dids() {
        assert!("key:z6Mk".parse::<Did>().is_err());
        assert!("did:key".parse::<Did>().is_err());
        assert!("did::z6Mk".parse::<Did>().is_err());
        assert!("did:key:".parse::<Did>().is_err());
    }

    #[test]
    fn it_serializes_as_string() {
        let did = did!("web:web3.storage");
        let json = serde_json::to_string(&did).unwrap();
        assert_eq!(json, "\"did:web:web3.storage\"");
        let back: Did = serde_json::from_str(&json).unwrap();
        assert_eq!(back, did);
    }

    #[test]
    fn it_rejects_invalid_json() {
        assert!(serde_json::from_str::<Did>("\"mailto:alice@web.mail\"").is_err());
    }
}
