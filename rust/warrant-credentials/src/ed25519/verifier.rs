//! Ed25519 DID principal and verifier.

use super::{DID_KEY_PREFIX, ED25519_PUB, error::Ed25519DidFromStrError};
use base58::ToBase58;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use warrant_principal::{Did, Principal, Verifier};

/// An `Ed25519` `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Verifier(pub ed25519_dalek::VerifyingKey);

impl From<ed25519_dalek::VerifyingKey> for Ed25519Verifier {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        Ed25519Verifier(key)
    }
}

impl From<&ed25519_dalek::SigningKey> for Ed25519Verifier {
    fn from(key: &ed25519_dalek::SigningKey) -> Self {
        Ed25519Verifier(key.verifying_key())
    }
}

impl std::fmt::Display for Ed25519Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut raw_bytes = Vec::with_capacity(34);
        raw_bytes.extend_from_slice(&ED25519_PUB);
        raw_bytes.extend_from_slice(self.0.as_bytes());
        let b58 = ToBase58::to_base58(raw_bytes.as_slice());
        write!(f, "{DID_KEY_PREFIX}{b58}")
    }
}

impl FromStr for Ed25519Verifier {
    type Err = Ed25519DidFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let identifier = s
            .strip_prefix("did:key:")
            .ok_or(Ed25519DidFromStrError::InvalidDidHeader)?;
        let b58 = identifier
            .strip_prefix('z')
            .ok_or(Ed25519DidFromStrError::MissingBase58Prefix)?;
        let key_bytes = base58::FromBase58::from_base58(b58)
            .map_err(|_| Ed25519DidFromStrError::InvalidBase58)?;
        let raw_arr = <[u8; 34]>::try_from(key_bytes.as_slice())
            .map_err(|_| Ed25519DidFromStrError::InvalidKey)?;
        let (header, key) = raw_arr.split_at(2);
        if header != ED25519_PUB {
            return Err(Ed25519DidFromStrError::UnsupportedCodec);
        }
        let key_arr: [u8; 32] = key
            .try_into()
            .map_err(|_| Ed25519DidFromStrError::InvalidKey)?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(&key_arr)
            .map_err(|_| Ed25519DidFromStrError::InvalidKey)?;
        Ok(Ed25519Verifier(key))
    }
}

impl Verifier for Ed25519Verifier {
    async fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), signature::Error> {
        let signature = ed25519_dalek::Signature::from_slice(signature)?;
        self.0.verify_strict(payload, &signature)
    }
}

impl Principal for Ed25519Verifier {
    fn did(&self) -> Did {
        #[allow(clippy::expect_used)]
        self.to_string()
            .parse()
            // Display always renders did:key:z...
            .expect("valid DID string")
    }
}

impl Serialize for Ed25519Verifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ed25519Verifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_verifier(seed: u8) -> Ed25519Verifier {
        Ed25519Verifier::from(&ed25519_dalek::SigningKey::from_bytes(&[seed; 32]))
    }

    #[test]
    fn ed25519_did_display_roundtrip() {
        let principal = test_verifier(0);
        let did_string = principal.to_string();
        assert!(did_string.starts_with("did:key:z6Mk"));
        let parsed: Ed25519Verifier = did_string.parse().unwrap();
        assert_eq!(parsed, principal);
    }

    #[test]
    fn ed25519_did_from_str_invalid_header() {
        let result: Result<Ed25519Verifier, _> = "not:a:did".parse();
        assert_eq!(result, Err(Ed25519DidFromStrError::InvalidDidHeader));
    }

    #[test]
    fn ed25519_did_from_str_missing_prefix() {
        let result: Result<Ed25519Verifier, _> = "did:key:abc".parse();
        assert_eq!(result, Err(Ed25519DidFromStrError::MissingBase58Prefix));
    }

    #[test]
    fn ed25519_did_rejects_other_codecs() {
        let mut raw = vec![0x12, 0x00];
        raw.extend_from_slice(&[7u8; 32]);
        let did = format!("did:key:z{}", ToBase58::to_base58(raw.as_slice()));
        let result: Result<Ed25519Verifier, _> = did.parse();
        assert_eq!(result, Err(Ed25519DidFromStrError::UnsupportedCodec));
    }

    #[test]
    fn ed25519_did_serde_roundtrip() {
        let principal = test_verifier(3);
        let json = serde_json::to_string(&principal).unwrap();
        let back: Ed25519Verifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, principal);
    }
}
