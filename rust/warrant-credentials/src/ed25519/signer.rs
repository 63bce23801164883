//! Ed25519 signer implementation.

use super::{error::Ed25519KeyError, verifier::Ed25519Verifier};
use serde::Serialize;
use warrant_principal::{Did, Principal, Signer};

/// An `Ed25519` `did:key` signer.
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    did: Ed25519Verifier,
    signer: ed25519_dalek::SigningKey,
}

impl From<ed25519_dalek::SigningKey> for Ed25519Signer {
    fn from(signer: ed25519_dalek::SigningKey) -> Self {
        let did = Ed25519Verifier::from(&signer);
        Self { did, signer }
    }
}

impl Ed25519Signer {
    /// Generate a new Ed25519 keypair from `getrandom` entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails.
    #[allow(clippy::unused_async)]
    pub async fn generate() -> Result<Self, Ed25519KeyError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed)?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed).into())
    }

    /// Import a keypair from its 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed has the wrong length.
    #[allow(clippy::unused_async)]
    pub async fn import(seed: impl AsRef<[u8]>) -> Result<Self, Ed25519KeyError> {
        let seed = seed.as_ref();
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| Ed25519KeyError::InvalidSeedLength(seed.len()))?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed).into())
    }

    /// Export the 32-byte seed.
    #[must_use]
    pub fn export(&self) -> [u8; 32] {
        self.signer.to_bytes()
    }

    /// Get the associated Ed25519 DID (verifier).
    #[must_use]
    pub const fn ed25519_did(&self) -> &Ed25519Verifier {
        &self.did
    }
}

impl std::fmt::Display for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.did)
    }
}

impl Signer for Ed25519Signer {
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, signature::Error> {
        use ed25519_dalek::Signer as _;
        let signature = self.signer.try_sign(payload)?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl Principal for Ed25519Signer {
    fn did(&self) -> Did {
        self.did.did()
    }
}

impl Serialize for Ed25519Signer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.did.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;
    use warrant_principal::Verifier;

    async fn test_signer(seed: u8) -> Ed25519Signer {
        Ed25519Signer::import([seed; 32]).await.unwrap()
    }

    #[tokio::test]
    async fn ed25519_did_round_trip() {
        let signer = test_signer(0).await;
        let did_string = signer.ed25519_did().to_string();
        let parsed: Ed25519Verifier = did_string.parse().unwrap();
        assert_eq!(parsed, *signer.ed25519_did());
        assert_eq!(signer.did().as_str(), did_string);
    }

    #[tokio::test]
    async fn ed25519_signer_produces_valid_signature() -> TestResult {
        let signer = test_signer(42).await;
        let msg = b"test message for async signing";

        let signature = signer.sign(msg).await?;
        assert_eq!(signature.len(), 64);

        signer.ed25519_did().verify(msg, &signature).await?;
        Ok(())
    }

    #[tokio::test]
    async fn ed25519_signer_wrong_message_fails_verification() -> TestResult {
        let signer = test_signer(99).await;
        let signature = signer.sign(b"original message").await?;

        assert!(
            signer
                .ed25519_did()
                .verify(b"tampered message", &signature)
                .await
                .is_err(),
            "Verification should fail for wrong message"
        );
        Ok(())
    }

    #[tokio::test]
    async fn different_signers_produce_different_signatures() -> TestResult {
        let signer1 = test_signer(1).await;
        let signer2 = test_signer(2).await;
        let msg = b"same message";

        let sig1 = signer1.sign(msg).await?;
        let sig2 = signer2.sign(msg).await?;
        assert_ne!(sig1, sig2);

        assert!(signer2.ed25519_did().verify(msg, &sig1).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_short_seeds() {
        let result = Ed25519Signer::import([0u8; 16]).await;
        assert!(matches!(result, Err(Ed25519KeyError::InvalidSeedLength(16))));
    }

    #[tokio::test]
    async fn it_exports_the_imported_seed() -> TestResult {
        let signer = Ed25519Signer::import([5u8; 32]).await?;
        assert_eq!(signer.export(), [5u8; 32]);
        let generated = Ed25519Signer::generate().await?;
        assert_ne!(generated.did(), signer.did());
        Ok(())
    }
}
